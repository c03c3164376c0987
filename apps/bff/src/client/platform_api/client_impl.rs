//! PlatformApiClient スーパートレイトとクライアント実装の構造体

use reqwest::{Method, RequestBuilder, header::AUTHORIZATION};
use startup_resources_domain::auth::BearerToken;

use super::{
    auth_client::PlatformAuthClient,
    catalog_client::PlatformCatalogClient,
    health_client::PlatformHealthClient,
    user_client::PlatformUserClient,
};
use crate::middleware::request_id::inject_request_id;

/// API キーを載せるヘッダー
pub const API_KEY_HEADER: &str = "x-api-key";

/// Platform API クライアントトレイト（スーパートレイト）
///
/// Auth / Catalog / User / Health の各サブトレイトを束ねる。
/// 各 State にはサブトレイト単位で注入する。
pub trait PlatformApiClient:
    PlatformAuthClient + PlatformCatalogClient + PlatformUserClient + PlatformHealthClient
{
}

/// ブランケット impl: 4 つのサブトレイトをすべて実装する型は
/// 自動的に `PlatformApiClient` を実装する。
impl<T> PlatformApiClient for T where
    T: PlatformAuthClient + PlatformCatalogClient + PlatformUserClient + PlatformHealthClient
{
}

/// Platform API クライアント実装
#[derive(Clone)]
pub struct PlatformApiClientImpl {
    pub(super) base_url: String,
    api_key:             String,
    pub(super) client:   reqwest::Client,
}

impl PlatformApiClientImpl {
    /// 新しい PlatformApiClient を作成する
    ///
    /// # 引数
    ///
    /// - `base_url`: Platform API のベース URL（例: `https://api.growthlab.io/v1`）
    /// - `api_key`: 全リクエストに付与する API キー
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key:  api_key.into(),
            client:   reqwest::Client::new(),
        }
    }

    /// 共通ヘッダーを付けたリクエストビルダーを作る
    ///
    /// `X-API-Key` は常に、`Authorization` はトークンがあるときだけ付与する。
    /// クライアントのクエリ文字列は加工せずにそのまま付け直す。
    pub(super) fn request(
        &self,
        method: Method,
        path: &str,
        raw_query: Option<&str>,
        token: Option<&BearerToken>,
    ) -> RequestBuilder {
        let url = match raw_query.filter(|q| !q.is_empty()) {
            Some(query) => format!("{}{}?{}", self.base_url, path, query),
            None => format!("{}{}", self.base_url, path),
        };

        let mut builder = self
            .client
            .request(method, url)
            .header(API_KEY_HEADER, &self.api_key);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, token.to_header_value());
        }
        inject_request_id(builder)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_api_keyとbearerトークンを付与する() {
        let client = PlatformApiClientImpl::new("https://api.example.com/", "secret");
        let token = BearerToken::parse("tok-1").unwrap();

        let request = client
            .request(Method::GET, "/resources", None, Some(&token))
            .build()
            .unwrap();

        assert_eq!(request.url().as_str(), "https://api.example.com/resources");
        assert_eq!(request.headers()[API_KEY_HEADER], "secret");
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer tok-1");
    }

    #[test]
    fn test_トークンがなければauthorizationを付けない() {
        let client = PlatformApiClientImpl::new("https://api.example.com", "secret");

        let request = client
            .request(Method::GET, "/tools", None, None)
            .build()
            .unwrap();

        assert!(request.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_クエリ文字列はそのまま転送する() {
        let client = PlatformApiClientImpl::new("https://api.example.com", "secret");

        let request = client
            .request(
                Method::GET,
                "/resources",
                Some("category=fundraising&tag=seed%20stage&page=2"),
                None,
            )
            .build()
            .unwrap();

        assert_eq!(
            request.url().query(),
            Some("category=fundraising&tag=seed%20stage&page=2")
        );
    }
}
