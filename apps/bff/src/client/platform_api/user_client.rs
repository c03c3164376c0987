//! ログインユーザー本人の Platform API クライアント

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use startup_resources_domain::{auth::BearerToken, progress::ProgressUpdate};

use super::{
    client_impl::PlatformApiClientImpl,
    error::PlatformApiError,
    response::{UpstreamResponse, handle_response},
};

/// ユーザー関連の Platform API クライアントトレイト
///
/// すべてトークン必須。`raw_query` はクライアントのクエリ文字列をそのまま渡す。
#[async_trait]
pub trait PlatformUserClient: Send + Sync {
    /// Platform API の `GET /users/me` を呼び出す。
    async fn get_profile(
        &self,
        raw_query: Option<&str>,
        token: &BearerToken,
    ) -> Result<UpstreamResponse, PlatformApiError>;

    /// Platform API の `PUT /users/me` を呼び出す。
    async fn update_profile(
        &self,
        raw_query: Option<&str>,
        token: &BearerToken,
        body: &Value,
    ) -> Result<UpstreamResponse, PlatformApiError>;

    /// Platform API の `GET /users/me/progress` を呼び出す。
    async fn get_progress(
        &self,
        raw_query: Option<&str>,
        token: &BearerToken,
    ) -> Result<UpstreamResponse, PlatformApiError>;

    /// Platform API の `POST /users/me/progress` を呼び出す。
    ///
    /// 送るのは検証済みの元のボディ（[`ProgressUpdate::body`]）。
    async fn record_progress(
        &self,
        raw_query: Option<&str>,
        token: &BearerToken,
        update: &ProgressUpdate,
    ) -> Result<UpstreamResponse, PlatformApiError>;
}

#[async_trait]
impl PlatformUserClient for PlatformApiClientImpl {
    async fn get_profile(
        &self,
        raw_query: Option<&str>,
        token: &BearerToken,
    ) -> Result<UpstreamResponse, PlatformApiError> {
        let response = self
            .request(Method::GET, "/users/me", raw_query, Some(token))
            .send()
            .await?;
        handle_response(response).await
    }

    async fn update_profile(
        &self,
        raw_query: Option<&str>,
        token: &BearerToken,
        body: &Value,
    ) -> Result<UpstreamResponse, PlatformApiError> {
        let response = self
            .request(Method::PUT, "/users/me", raw_query, Some(token))
            .json(body)
            .send()
            .await?;
        handle_response(response).await
    }

    async fn get_progress(
        &self,
        raw_query: Option<&str>,
        token: &BearerToken,
    ) -> Result<UpstreamResponse, PlatformApiError> {
        let response = self
            .request(Method::GET, "/users/me/progress", raw_query, Some(token))
            .send()
            .await?;
        handle_response(response).await
    }

    async fn record_progress(
        &self,
        raw_query: Option<&str>,
        token: &BearerToken,
        update: &ProgressUpdate,
    ) -> Result<UpstreamResponse, PlatformApiError> {
        let response = self
            .request(Method::POST, "/users/me/progress", raw_query, Some(token))
            .json(update.body())
            .send()
            .await?;
        handle_response(response).await
    }
}
