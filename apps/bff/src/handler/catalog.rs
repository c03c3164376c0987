//! # カタログハンドラ
//!
//! リソース・ツールの一覧と詳細を Platform API から中継する。
//! トークンは任意で、あれば上流に転送する。
//!
//! ## エンドポイント
//!
//! - `GET /api/resources` / `GET /api/resources/{id}`
//! - `GET /api/tools` / `GET /api/tools/{id}`
//!
//! ## ユーザーコンテキストの付与
//!
//! `ENRICH_USER_CONTEXT` が有効で、上流の 2xx ボディが JSON オブジェクトのときだけ
//! `user_context` を追加する。配列ボディや非 2xx はそのまま返す。

use std::sync::Arc;

use axum::{
    extract::{Path, RawQuery, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde::Serialize;
use startup_resources_domain::{auth::BearerToken, embed::EmbedMode};
use startup_resources_shared::ErrorResponse;
use utoipa::ToSchema;

use crate::{
    client::{PlatformApiError, PlatformCatalogClient, UpstreamResponse},
    error::{insert_if_object, log_and_convert_platform_error},
    middleware::{detect_embed_mode, extract_token},
};

/// 付与するキー
const USER_CONTEXT_KEY: &str = "user_context";

/// カタログ・検索ハンドラの共有状態
pub struct CatalogState {
    pub catalog_client:      Arc<dyn PlatformCatalogClient>,
    pub enrich_user_context: bool,
}

/// レスポンスに付与するユーザーコンテキスト
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserContextFlags {
    /// トークン付きのリクエストか（上流での検証はしない）
    pub is_authenticated: bool,
    pub is_embedded:      bool,
}

/// カタログ系リクエストから取り出す情報
struct CatalogRequest {
    token: Option<BearerToken>,
    mode:  EmbedMode,
    query: Option<String>,
}

impl CatalogRequest {
    fn new(headers: &HeaderMap, jar: &CookieJar, query: Option<String>) -> Self {
        Self {
            token: extract_token(headers, jar),
            mode: detect_embed_mode(headers, query.as_deref()),
            query,
        }
    }

    fn flags(&self) -> UserContextFlags {
        UserContextFlags {
            is_authenticated: self.token.is_some(),
            is_embedded:      self.mode.is_embedded(),
        }
    }
}

/// 上流の結果を中継し、必要ならユーザーコンテキストを付与する
fn respond(
    state: &CatalogState,
    request: &CatalogRequest,
    context: &str,
    result: Result<UpstreamResponse, PlatformApiError>,
) -> Response {
    match result {
        Ok(mut upstream) => {
            if state.enrich_user_context {
                match serde_json::to_value(request.flags()) {
                    Ok(flags) => insert_if_object(&mut upstream.body, USER_CONTEXT_KEY, flags),
                    Err(e) => tracing::warn!(error = %e, "ユーザーコンテキストの生成に失敗"),
                }
            }
            upstream.into_response()
        }
        Err(e) => log_and_convert_platform_error(context, e),
    }
}

/// GET /api/resources
#[utoipa::path(
   get,
   path = "/api/resources",
   tag = "resources",
   security((), ("bearer_auth" = [])),
   responses(
      (status = 200, description = "上流のリソース一覧（user_context 付与）"),
      (status = 500, description = "上流と通信できない", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn list_resources(
    State(state): State<Arc<CatalogState>>,
    headers: HeaderMap,
    jar: CookieJar,
    RawQuery(query): RawQuery,
) -> Response {
    let request = CatalogRequest::new(&headers, &jar, query);
    let result = state
        .catalog_client
        .list_resources(request.query.as_deref(), request.token.as_ref())
        .await;
    respond(&state, &request, "リソース一覧取得", result)
}

/// GET /api/resources/{id}
#[utoipa::path(
   get,
   path = "/api/resources/{id}",
   tag = "resources",
   security((), ("bearer_auth" = [])),
   params(("id" = String, Path, description = "リソース ID")),
   responses(
      (status = 200, description = "上流のリソース詳細（user_context 付与）"),
      (status = 404, description = "上流が返した 404 を中継"),
      (status = 500, description = "上流と通信できない", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all, fields(resource.id = %id))]
pub async fn get_resource(
    State(state): State<Arc<CatalogState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    jar: CookieJar,
    RawQuery(query): RawQuery,
) -> Response {
    let request = CatalogRequest::new(&headers, &jar, query);
    let result = state
        .catalog_client
        .get_resource(&id, request.query.as_deref(), request.token.as_ref())
        .await;
    respond(&state, &request, "リソース詳細取得", result)
}

/// GET /api/tools
#[utoipa::path(
   get,
   path = "/api/tools",
   tag = "tools",
   security((), ("bearer_auth" = [])),
   responses(
      (status = 200, description = "上流のツール一覧（user_context 付与）"),
      (status = 500, description = "上流と通信できない", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn list_tools(
    State(state): State<Arc<CatalogState>>,
    headers: HeaderMap,
    jar: CookieJar,
    RawQuery(query): RawQuery,
) -> Response {
    let request = CatalogRequest::new(&headers, &jar, query);
    let result = state
        .catalog_client
        .list_tools(request.query.as_deref(), request.token.as_ref())
        .await;
    respond(&state, &request, "ツール一覧取得", result)
}

/// GET /api/tools/{id}
#[utoipa::path(
   get,
   path = "/api/tools/{id}",
   tag = "tools",
   security((), ("bearer_auth" = [])),
   params(("id" = String, Path, description = "ツール ID")),
   responses(
      (status = 200, description = "上流のツール詳細（user_context 付与）"),
      (status = 404, description = "上流が返した 404 を中継"),
      (status = 500, description = "上流と通信できない", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all, fields(tool.id = %id))]
pub async fn get_tool(
    State(state): State<Arc<CatalogState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    jar: CookieJar,
    RawQuery(query): RawQuery,
) -> Response {
    let request = CatalogRequest::new(&headers, &jar, query);
    let result = state
        .catalog_client
        .get_tool(&id, request.query.as_deref(), request.token.as_ref())
        .await;
    respond(&state, &request, "ツール詳細取得", result)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request, StatusCode},
        routing::get,
    };
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use startup_resources_domain::search::SearchKind;
    use tower::ServiceExt;

    use super::*;

    /// 固定レスポンスを返し、受け取った引数を記録するスタブ
    struct StubCatalogClient {
        result: Result<UpstreamResponse, PlatformApiError>,
        calls:  Mutex<Vec<(String, Option<String>, Option<String>)>>,
    }

    impl StubCatalogClient {
        fn new(result: Result<UpstreamResponse, PlatformApiError>) -> Self {
            Self {
                result,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn record(
            &self,
            target: String,
            raw_query: Option<&str>,
            token: Option<&BearerToken>,
        ) -> Result<UpstreamResponse, PlatformApiError> {
            self.calls.lock().unwrap().push((
                target,
                raw_query.map(str::to_string),
                token.map(|t| t.as_str().to_string()),
            ));
            self.result.clone()
        }
    }

    #[async_trait]
    impl PlatformCatalogClient for StubCatalogClient {
        async fn list_resources(
            &self,
            raw_query: Option<&str>,
            token: Option<&BearerToken>,
        ) -> Result<UpstreamResponse, PlatformApiError> {
            self.record("resources".to_string(), raw_query, token)
        }

        async fn get_resource(
            &self,
            id: &str,
            raw_query: Option<&str>,
            token: Option<&BearerToken>,
        ) -> Result<UpstreamResponse, PlatformApiError> {
            self.record(format!("resources/{id}"), raw_query, token)
        }

        async fn list_tools(
            &self,
            raw_query: Option<&str>,
            token: Option<&BearerToken>,
        ) -> Result<UpstreamResponse, PlatformApiError> {
            self.record("tools".to_string(), raw_query, token)
        }

        async fn get_tool(
            &self,
            id: &str,
            raw_query: Option<&str>,
            token: Option<&BearerToken>,
        ) -> Result<UpstreamResponse, PlatformApiError> {
            self.record(format!("tools/{id}"), raw_query, token)
        }

        async fn search(
            &self,
            kind: SearchKind,
            raw_query: Option<&str>,
            token: Option<&BearerToken>,
        ) -> Result<UpstreamResponse, PlatformApiError> {
            self.record(kind.to_string(), raw_query, token)
        }
    }

    fn app(client: Arc<StubCatalogClient>, enrich: bool) -> Router {
        let state = Arc::new(CatalogState {
            catalog_client:      client,
            enrich_user_context: enrich,
        });
        Router::new()
            .route("/api/resources", get(list_resources))
            .route("/api/resources/{id}", get(get_resource))
            .route("/api/tools", get(list_tools))
            .route("/api/tools/{id}", get(get_tool))
            .with_state(state)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_オブジェクトボディにuser_contextを付与する() {
        let client = Arc::new(StubCatalogClient::new(Ok(UpstreamResponse::ok(
            json!({"data": [{"id": "r1"}], "total": 1}),
        ))));

        let request = Request::builder()
            .uri("/api/resources?category=legal")
            .header("authorization", "Bearer tok")
            .header("sec-fetch-dest", "iframe")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(client.clone(), true), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "data": [{"id": "r1"}],
                "total": 1,
                "user_context": {"is_authenticated": true, "is_embedded": true}
            })
        );
        assert_eq!(
            client.calls.lock().unwrap()[0],
            (
                "resources".to_string(),
                Some("category=legal".to_string()),
                Some("tok".to_string())
            )
        );
    }

    #[tokio::test]
    async fn test_付与が無効ならボディを変更しない() {
        let client = Arc::new(StubCatalogClient::new(Ok(UpstreamResponse::ok(
            json!({"id": "t1"}),
        ))));

        let (_, body) = send(app(client, false), get_request("/api/tools/t1")).await;

        assert_eq!(body, json!({"id": "t1"}));
    }

    #[tokio::test]
    async fn test_配列ボディには付与しない() {
        let client = Arc::new(StubCatalogClient::new(Ok(UpstreamResponse::ok(json!([
            {"id": "t1"}
        ])))));

        let (_, body) = send(app(client, true), get_request("/api/tools")).await;

        assert_eq!(body, json!([{"id": "t1"}]));
    }

    #[tokio::test]
    async fn test_上流の404はステータスとボディを中継し付与しない() {
        let client = Arc::new(StubCatalogClient::new(Err(PlatformApiError::Upstream {
            status: StatusCode::NOT_FOUND,
            body:   json!({"message": "no such resource"}),
        })));

        let (status, body) = send(app(client.clone(), true), get_request("/api/resources/r9")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "no such resource"}));
        assert_eq!(client.calls.lock().unwrap()[0].0, "resources/r9");
    }

    #[tokio::test]
    async fn test_通信失敗は500() {
        let client = Arc::new(StubCatalogClient::new(Err(PlatformApiError::Network(
            "timeout".to_string(),
        ))));

        let (status, body) = send(app(client, true), get_request("/api/tools")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], 500);
    }

    #[tokio::test]
    async fn test_トークンなしは未認証フラグ() {
        let client = Arc::new(StubCatalogClient::new(Ok(UpstreamResponse::ok(
            json!({"id": "r1"}),
        ))));

        let (_, body) = send(app(client.clone(), true), get_request("/api/resources/r1")).await;

        assert_eq!(
            body["user_context"],
            json!({"is_authenticated": false, "is_embedded": false})
        );
        assert_eq!(client.calls.lock().unwrap()[0].2, None);
    }
}
