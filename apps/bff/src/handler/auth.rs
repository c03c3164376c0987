//! # 認証ハンドラ
//!
//! BFF はセッションを持たず、トークンの検証は上流 Platform API に委ねる。
//!
//! ## エンドポイント
//!
//! - `GET /api/auth/verify` - トークン検証の中継（トークン必須）
//! - `GET /api/auth/context` - ハンドラ向け認証コンテキスト（トークン任意）

use std::sync::Arc;

use axum::{
    Extension,
    Json,
    extract::{RawQuery, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use startup_resources_domain::{
    auth::{AuthContext, BearerToken},
    user::User,
};
use startup_resources_shared::{ErrorResponse, event_log::event, log_business_event};

use crate::{
    client::PlatformAuthClient,
    error::log_and_convert_platform_error,
    middleware::{detect_embed_mode, extract_token},
};

/// 認証ハンドラの共有状態
pub struct AuthState {
    pub auth_client: Arc<dyn PlatformAuthClient>,
}

/// GET /api/auth/verify
///
/// 上流の検証結果をステータスごとそのまま返す。クエリ文字列もそのまま転送する。
#[utoipa::path(
   get,
   path = "/api/auth/verify",
   tag = "auth",
   security(("bearer_auth" = [])),
   responses(
      (status = 200, description = "上流の検証結果（中継）"),
      (status = 401, description = "トークンなし、または上流が拒否", body = ErrorResponse),
      (status = 500, description = "上流と通信できない", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn verify(
    State(state): State<Arc<AuthState>>,
    Extension(token): Extension<BearerToken>,
    RawQuery(query): RawQuery,
) -> Response {
    match state.auth_client.verify_token(query.as_deref(), &token).await {
        Ok(upstream) => {
            log_business_event!(
                event.category = event::category::AUTH,
                event.action = event::action::TOKEN_VERIFIED,
                event.result = event::result::SUCCESS,
                "トークン検証に成功"
            );
            upstream.into_response()
        }
        Err(e) => {
            if let Some(status) = e.upstream_status() {
                log_business_event!(
                    event.category = event::category::AUTH,
                    event.action = event::action::TOKEN_REJECTED,
                    event.result = event::result::FAILURE,
                    upstream.status = status.as_u16(),
                    "上流がトークンを拒否"
                );
            }
            log_and_convert_platform_error("トークン検証", e)
        }
    }
}

/// GET /api/auth/context
///
/// トークンがあれば上流で検証し、ユーザーが取れたときだけ認証済みとする。
/// 検証の失敗（拒否・通信失敗とも）は未認証として扱い、エラーにはしない。
#[utoipa::path(
   get,
   path = "/api/auth/context",
   tag = "auth",
   params(("embedded" = Option<bool>, Query, description = "埋め込み表示か")),
   responses(
      (status = 200, description = "認証コンテキスト", body = AuthContext)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn context(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
    jar: CookieJar,
    RawQuery(query): RawQuery,
) -> Json<AuthContext> {
    let mode = detect_embed_mode(&headers, query.as_deref());
    let Some(token) = extract_token(&headers, &jar) else {
        return Json(AuthContext::anonymous(mode));
    };

    let context = match state
        .auth_client
        .verify_token(query.as_deref(), &token)
        .await
    {
        Ok(upstream) => match User::from_verify_body(&upstream.body) {
            Some(user) => AuthContext::authenticated(user, mode),
            None => {
                tracing::warn!("検証レスポンスにユーザーが含まれていない");
                AuthContext::anonymous(mode)
            }
        },
        Err(e) => {
            tracing::debug!(error = %e, "トークン検証に失敗したため未認証として扱う");
            AuthContext::anonymous(mode)
        }
    };
    Json(context)
}
