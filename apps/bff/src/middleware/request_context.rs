//! # リクエストコンテキスト
//!
//! リクエストからトークンと埋め込みモードを取り出す。
//!
//! ## トークンの取り出し順
//!
//! 1. `Authorization: Bearer <token>`
//! 2. Cookie `auth_token`
//!
//! ## 使い方
//!
//! トークン必須のルートには [`require_bearer_token`] を適用し、
//! ハンドラでは `Extension<BearerToken>` で受け取る。
//!
//! ```rust,ignore
//! Router::new()
//!     .route("/api/user/profile", get(get_profile))
//!     .layer(from_fn(require_bearer_token))
//! ```

use axum::{
    body::Body,
    http::{HeaderMap, Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use startup_resources_domain::{
    auth::BearerToken,
    embed::{EmbedHints, EmbedMode},
};

use crate::error::unauthorized_response;

/// トークンを保持する Cookie 名
pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// 埋め込み元を示すヘッダー
pub const EMBEDDED_BY_HEADER: &str = "x-embedded-by";

const SEC_FETCH_DEST_HEADER: &str = "sec-fetch-dest";

/// リクエストからトークンを取り出す
pub fn extract_token(headers: &HeaderMap, jar: &CookieJar) -> Option<BearerToken> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(BearerToken::from_authorization)
        .or_else(|| {
            jar.get(AUTH_TOKEN_COOKIE)
                .and_then(|cookie| BearerToken::parse(cookie.value()))
        })
}

/// リクエストから埋め込みモードを判定する
pub fn detect_embed_mode(headers: &HeaderMap, raw_query: Option<&str>) -> EmbedMode {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    EmbedMode::detect(&EmbedHints {
        embedded_query: EmbedHints::embedded_from_query(raw_query),
        sec_fetch_dest: header(SEC_FETCH_DEST_HEADER),
        embedded_by:    header(EMBEDDED_BY_HEADER),
    })
}

/// トークン必須ルート用ミドルウェア
///
/// トークンがなければ上流を呼ばずに 401 を返す。
/// あればリクエスト extensions に [`BearerToken`] を入れて次へ渡す。
pub async fn require_bearer_token(
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_token(request.headers(), &jar) else {
        return unauthorized_response();
    };

    request.extensions_mut().insert(token);
    next.run(request).await
}
