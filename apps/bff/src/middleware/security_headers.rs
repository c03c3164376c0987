//! # セキュリティヘッダーミドルウェア
//!
//! - `/api/*` のレスポンスに `Cache-Control: no-store` を付ける（[`no_cache`]）
//! - 全レスポンスに `Content-Security-Policy: frame-ancestors ...` を付け、
//!   自分自身と GrowthLab のオリジンからしか iframe 埋め込みできないようにする
//!   （[`frame_ancestors`]）

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};
use startup_resources_domain::embed::ParentOrigins;

/// API レスポンスに `Cache-Control: no-store` を付与する
pub async fn no_cache(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// `frame-ancestors` ミドルウェアの状態
#[derive(Clone)]
pub struct FrameAncestorsState {
    policy: HeaderValue,
}

impl FrameAncestorsState {
    /// 許可オリジンから CSP ヘッダー値を組み立てる
    ///
    /// オリジンは URL として正規化済みなのでヘッダー値として不正になることはないが、
    /// 万一失敗した場合は `'self'` のみに絞る。
    pub fn new(origins: &ParentOrigins) -> Arc<Self> {
        let policy = HeaderValue::from_str(&origins.frame_ancestors_directive())
            .unwrap_or_else(|_| HeaderValue::from_static("frame-ancestors 'self'"));
        Arc::new(Self { policy })
    }
}

/// 全レスポンスに `Content-Security-Policy: frame-ancestors` を付与する
pub async fn frame_ancestors(
    State(state): State<Arc<FrameAncestorsState>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CONTENT_SECURITY_POLICY, state.policy.clone());
    response
}
