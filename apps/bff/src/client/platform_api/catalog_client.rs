//! リソース・ツール・検索の Platform API クライアント

use async_trait::async_trait;
use reqwest::Method;
use startup_resources_domain::{auth::BearerToken, search::SearchKind};

use super::{
    client_impl::PlatformApiClientImpl,
    error::PlatformApiError,
    response::{UpstreamResponse, handle_response},
};

/// カタログ（リソース・ツール・テンプレート）の Platform API クライアントトレイト
///
/// いずれもトークンは任意。`raw_query` はクライアントのクエリ文字列をそのまま渡す。
#[async_trait]
pub trait PlatformCatalogClient: Send + Sync {
    /// Platform API の `GET /resources` を呼び出す。
    async fn list_resources(
        &self,
        raw_query: Option<&str>,
        token: Option<&BearerToken>,
    ) -> Result<UpstreamResponse, PlatformApiError>;

    /// Platform API の `GET /resources/{id}` を呼び出す。
    async fn get_resource(
        &self,
        id: &str,
        raw_query: Option<&str>,
        token: Option<&BearerToken>,
    ) -> Result<UpstreamResponse, PlatformApiError>;

    /// Platform API の `GET /tools` を呼び出す。
    async fn list_tools(
        &self,
        raw_query: Option<&str>,
        token: Option<&BearerToken>,
    ) -> Result<UpstreamResponse, PlatformApiError>;

    /// Platform API の `GET /tools/{id}` を呼び出す。
    async fn get_tool(
        &self,
        id: &str,
        raw_query: Option<&str>,
        token: Option<&BearerToken>,
    ) -> Result<UpstreamResponse, PlatformApiError>;

    /// 検索対象ごとの検索エンドポイントを呼び出す
    ///
    /// 呼び出し先は [`SearchKind::upstream_path`] を参照。
    async fn search(
        &self,
        kind: SearchKind,
        raw_query: Option<&str>,
        token: Option<&BearerToken>,
    ) -> Result<UpstreamResponse, PlatformApiError>;
}

impl PlatformApiClientImpl {
    async fn get_json(
        &self,
        path: &str,
        raw_query: Option<&str>,
        token: Option<&BearerToken>,
    ) -> Result<UpstreamResponse, PlatformApiError> {
        let response = self
            .request(Method::GET, path, raw_query, token)
            .send()
            .await?;
        handle_response(response).await
    }
}

#[async_trait]
impl PlatformCatalogClient for PlatformApiClientImpl {
    async fn list_resources(
        &self,
        raw_query: Option<&str>,
        token: Option<&BearerToken>,
    ) -> Result<UpstreamResponse, PlatformApiError> {
        self.get_json("/resources", raw_query, token).await
    }

    async fn get_resource(
        &self,
        id: &str,
        raw_query: Option<&str>,
        token: Option<&BearerToken>,
    ) -> Result<UpstreamResponse, PlatformApiError> {
        let path = format!("/resources/{}", urlencoding::encode(id));
        self.get_json(&path, raw_query, token).await
    }

    async fn list_tools(
        &self,
        raw_query: Option<&str>,
        token: Option<&BearerToken>,
    ) -> Result<UpstreamResponse, PlatformApiError> {
        self.get_json("/tools", raw_query, token).await
    }

    async fn get_tool(
        &self,
        id: &str,
        raw_query: Option<&str>,
        token: Option<&BearerToken>,
    ) -> Result<UpstreamResponse, PlatformApiError> {
        let path = format!("/tools/{}", urlencoding::encode(id));
        self.get_json(&path, raw_query, token).await
    }

    async fn search(
        &self,
        kind: SearchKind,
        raw_query: Option<&str>,
        token: Option<&BearerToken>,
    ) -> Result<UpstreamResponse, PlatformApiError> {
        self.get_json(kind.upstream_path(), raw_query, token).await
    }
}
