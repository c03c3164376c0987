//! 認証関連の Platform API クライアント

use async_trait::async_trait;
use reqwest::Method;
use startup_resources_domain::auth::BearerToken;

use super::{
    client_impl::PlatformApiClientImpl,
    error::PlatformApiError,
    response::{UpstreamResponse, handle_response},
};

/// 認証関連の Platform API クライアントトレイト
#[async_trait]
pub trait PlatformAuthClient: Send + Sync {
    /// トークンを検証する
    ///
    /// Platform API の `GET /auth/verify` を呼び出す。
    async fn verify_token(
        &self,
        raw_query: Option<&str>,
        token: &BearerToken,
    ) -> Result<UpstreamResponse, PlatformApiError>;
}

#[async_trait]
impl PlatformAuthClient for PlatformApiClientImpl {
    async fn verify_token(
        &self,
        raw_query: Option<&str>,
        token: &BearerToken,
    ) -> Result<UpstreamResponse, PlatformApiError> {
        let response = self
            .request(Method::GET, "/auth/verify", raw_query, Some(token))
            .send()
            .await?;
        handle_response(response).await
    }
}
