//! # ユーザーハンドラ
//!
//! ログインユーザー本人のプロフィールと学習進捗を中継する。
//! すべてトークン必須で、ルーターで [`require_bearer_token`] を適用する前提。
//!
//! 進捗の記録だけは上流に送る前に軽く検証し、違反は 400 で返す。
//! 通った場合は受け取ったボディをそのまま転送する。
//! どのルートもクエリ文字列はそのまま上流へ渡す。
//!
//! [`require_bearer_token`]: crate::middleware::require_bearer_token

use std::sync::Arc;

use axum::{
    Extension,
    Json,
    extract::{RawQuery, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use startup_resources_domain::{
    auth::BearerToken,
    progress::{ProgressUpdate, ProgressUpdateRequest},
};
use startup_resources_shared::{ErrorResponse, event_log::event, log_business_event};

use crate::{
    client::PlatformUserClient,
    error::{
        domain_error_response,
        json_rejection_response,
        log_and_convert_platform_error,
        relay,
        validation_error_response,
    },
};

/// ユーザーハンドラの共有状態
pub struct UserState {
    pub user_client: Arc<dyn PlatformUserClient>,
}

/// GET /api/user/profile
#[utoipa::path(
   get,
   path = "/api/user/profile",
   tag = "user",
   security(("bearer_auth" = [])),
   responses(
      (status = 200, description = "上流のプロフィール（中継）"),
      (status = 401, description = "トークンなし", body = ErrorResponse),
      (status = 500, description = "上流と通信できない", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn get_profile(
    State(state): State<Arc<UserState>>,
    Extension(token): Extension<BearerToken>,
    RawQuery(query): RawQuery,
) -> Response {
    relay(
        "プロフィール取得",
        state
            .user_client
            .get_profile(query.as_deref(), &token)
            .await,
    )
}

/// PUT /api/user/profile
///
/// ボディは JSON オブジェクトであることだけ確認し、中身は上流に任せる。
#[utoipa::path(
   put,
   path = "/api/user/profile",
   tag = "user",
   security(("bearer_auth" = [])),
   request_body(content = serde_json::Value, description = "更新するプロフィール項目"),
   responses(
      (status = 200, description = "上流の更新結果（中継）"),
      (status = 400, description = "ボディが JSON オブジェクトでない", body = ErrorResponse),
      (status = 401, description = "トークンなし", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn update_profile(
    State(state): State<Arc<UserState>>,
    Extension(token): Extension<BearerToken>,
    RawQuery(query): RawQuery,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => return json_rejection_response(rejection),
    };
    if !body.is_object() {
        return validation_error_response("プロフィールは JSON オブジェクトで指定してください");
    }
    relay(
        "プロフィール更新",
        state
            .user_client
            .update_profile(query.as_deref(), &token, &body)
            .await,
    )
}

/// GET /api/user/progress
#[utoipa::path(
   get,
   path = "/api/user/progress",
   tag = "user",
   security(("bearer_auth" = [])),
   responses(
      (status = 200, description = "上流の進捗一覧（中継）"),
      (status = 401, description = "トークンなし", body = ErrorResponse),
      (status = 500, description = "上流と通信できない", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn get_progress(
    State(state): State<Arc<UserState>>,
    Extension(token): Extension<BearerToken>,
    RawQuery(query): RawQuery,
) -> Response {
    relay(
        "進捗取得",
        state
            .user_client
            .get_progress(query.as_deref(), &token)
            .await,
    )
}

/// POST /api/user/progress
///
/// `resource_id`（`resourceId` も可）と `percent` の範囲だけ確認する。
#[utoipa::path(
   post,
   path = "/api/user/progress",
   tag = "user",
   security(("bearer_auth" = [])),
   request_body = ProgressUpdateRequest,
   responses(
      (status = 201, description = "上流の記録結果（中継、ステータスは上流のまま）"),
      (status = 400, description = "進捗の値が不正", body = ErrorResponse),
      (status = 401, description = "トークンなし", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn record_progress(
    State(state): State<Arc<UserState>>,
    Extension(token): Extension<BearerToken>,
    RawQuery(query): RawQuery,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let update = match body {
        Ok(Json(body)) => match ProgressUpdate::from_json(body) {
            Ok(update) => update,
            Err(e) => return domain_error_response(e),
        },
        Err(rejection) => return json_rejection_response(rejection),
    };

    match state
        .user_client
        .record_progress(query.as_deref(), &token, &update)
        .await
    {
        Ok(upstream) => {
            log_business_event!(
                event.category = event::category::PROGRESS,
                event.action = event::action::PROGRESS_RECORDED,
                event.result = event::result::SUCCESS,
                event.entity_id = update.resource_id(),
                progress.status = ?update.status(),
                progress.percent = ?update.percent(),
                "学習進捗を記録"
            );
            upstream.into_response()
        }
        Err(e) => {
            log_business_event!(
                event.category = event::category::PROGRESS,
                event.action = event::action::PROGRESS_RECORDED,
                event.result = event::result::FAILURE,
                event.entity_id = update.resource_id(),
                "学習進捗の記録に失敗"
            );
            log_and_convert_platform_error("進捗記録", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header::CONTENT_TYPE},
        middleware::from_fn,
        routing::get,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::{
        client::{PlatformApiError, UpstreamResponse},
        middleware::require_bearer_token,
    };

    /// 受け取った進捗・ボディ・クエリを記録するスタブ
    #[derive(Default)]
    struct StubUserClient {
        progress: Mutex<Vec<Value>>,
        profiles: Mutex<Vec<Value>>,
        queries:  Mutex<Vec<Option<String>>>,
    }

    impl StubUserClient {
        fn remember(&self, raw_query: Option<&str>) {
            self.queries
                .lock()
                .unwrap()
                .push(raw_query.map(str::to_string));
        }
    }

    #[async_trait]
    impl PlatformUserClient for StubUserClient {
        async fn get_profile(
            &self,
            raw_query: Option<&str>,
            token: &BearerToken,
        ) -> Result<UpstreamResponse, PlatformApiError> {
            self.remember(raw_query);
            Ok(UpstreamResponse::ok(
                json!({"id": "u1", "token_seen": token.as_str()}),
            ))
        }

        async fn update_profile(
            &self,
            raw_query: Option<&str>,
            _token: &BearerToken,
            body: &Value,
        ) -> Result<UpstreamResponse, PlatformApiError> {
            self.remember(raw_query);
            self.profiles.lock().unwrap().push(body.clone());
            Ok(UpstreamResponse::ok(body.clone()))
        }

        async fn get_progress(
            &self,
            raw_query: Option<&str>,
            _token: &BearerToken,
        ) -> Result<UpstreamResponse, PlatformApiError> {
            self.remember(raw_query);
            Ok(UpstreamResponse::ok(json!({"query": raw_query})))
        }

        async fn record_progress(
            &self,
            raw_query: Option<&str>,
            _token: &BearerToken,
            update: &ProgressUpdate,
        ) -> Result<UpstreamResponse, PlatformApiError> {
            self.remember(raw_query);
            let body = update.body().clone();
            self.progress.lock().unwrap().push(body.clone());
            Ok(UpstreamResponse {
                status: StatusCode::CREATED,
                body,
            })
        }
    }

    fn app(client: Arc<StubUserClient>) -> Router {
        let state = Arc::new(UserState {
            user_client: client,
        });
        Router::new()
            .route("/api/user/profile", get(get_profile).put(update_profile))
            .route("/api/user/progress", get(get_progress).post(record_progress))
            .layer(from_fn(require_bearer_token))
            .with_state(state)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", "Bearer tok")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_トークンなしは401で上流を呼ばない() {
        let client = Arc::new(StubUserClient::default());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/user/progress")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"resource_id":"r1","percent":50}"#))
            .unwrap();

        let (status, _) = send(app(client.clone()), request).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(client.progress.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cookieのトークンでプロフィールを取得できる() {
        let client = Arc::new(StubUserClient::default());
        let request = Request::builder()
            .uri("/api/user/profile")
            .header("cookie", "auth_token=cookie-tok")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(app(client), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_seen"], "cookie-tok");
    }

    #[rstest::rstest]
    #[case::snake_case(json!({"resource_id": "r1", "status": "completed", "note": "done"}))]
    #[case::camel_case(json!({"resourceId": "r1", "percent": 50}))]
    #[case::上流判断に任せる組み合わせ(json!({"resource_id": "r1", "status": "completed", "percent": 40}))]
    #[tokio::test]
    async fn test_進捗の記録は受け取ったボディをそのまま送り上流のステータスを返す(
        #[case] body: Value,
    ) {
        let client = Arc::new(StubUserClient::default());

        let (status, _) = send(
            app(client.clone()),
            json_request(Method::POST, "/api/user/progress", body.clone()),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(client.progress.lock().unwrap()[0], body);
    }

    #[rstest::rstest]
    #[case(json!({"resource_id": "r1", "percent": 150}))]
    #[case(json!({"resource_id": "r1", "percent": -1}))]
    #[case(json!({"resource_id": "", "percent": 10}))]
    #[case(json!({"percent": 10}))]
    #[case(json!({"resource_id": "r1", "status": "archived"}))]
    #[case(json!(["r1"]))]
    #[tokio::test]
    async fn test_不正な進捗は400で上流を呼ばない(#[case] body: Value) {
        let client = Arc::new(StubUserClient::default());

        let (status, response) = send(
            app(client.clone()),
            json_request(Method::POST, "/api/user/progress", body),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["status"], 400);
        assert!(client.progress.lock().unwrap().is_empty());
    }

    #[rstest::rstest]
    #[case::進捗_壊れたjson(Method::POST, "/api/user/progress", Some("application/json"), "{\"resourceId\": ")]
    #[case::進捗_content_typeなし(Method::POST, "/api/user/progress", None, r#"{"resourceId":"r1"}"#)]
    #[case::プロフィール_壊れたjson(Method::PUT, "/api/user/profile", Some("application/json"), "{")]
    #[case::プロフィール_content_type違い(Method::PUT, "/api/user/profile", Some("text/plain"), r#"{"name":"A"}"#)]
    #[tokio::test]
    async fn test_jsonとして読めないボディはrfc9457形式の400(
        #[case] method: Method,
        #[case] uri: &str,
        #[case] content_type: Option<&str>,
        #[case] body: &'static str,
    ) {
        let client = Arc::new(StubUserClient::default());
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", "Bearer tok");
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }

        let (status, response) =
            send(app(client.clone()), builder.body(Body::from(body)).unwrap()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["status"], 400);
        assert!(
            response["type"]
                .as_str()
                .unwrap()
                .ends_with("/validation-error")
        );
        assert!(client.progress.lock().unwrap().is_empty());
        assert!(client.profiles.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_プロフィール更新はオブジェクト以外を400にする() {
        let client = Arc::new(StubUserClient::default());

        let (status, _) = send(
            app(client.clone()),
            json_request(Method::PUT, "/api/user/profile", json!(["name"])),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(client.profiles.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_プロフィール更新はボディをそのまま送る() {
        let client = Arc::new(StubUserClient::default());

        let (status, body) = send(
            app(client.clone()),
            json_request(Method::PUT, "/api/user/profile", json!({"name": "Aiko"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"name": "Aiko"}));
        assert_eq!(client.profiles.lock().unwrap()[0], json!({"name": "Aiko"}));
    }

    #[tokio::test]
    async fn test_進捗一覧はクエリを転送する() {
        let client = Arc::new(StubUserClient::default());
        let request = Request::builder()
            .uri("/api/user/progress?status=completed")
            .header("authorization", "Bearer tok")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(app(client), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"query": "status=completed"}));
    }

    #[rstest::rstest]
    #[case::プロフィール取得(Method::GET, "/api/user/profile?fields=name", None)]
    #[case::プロフィール更新(Method::PUT, "/api/user/profile?notify=false", Some(json!({"name": "A"})))]
    #[case::進捗記録(Method::POST, "/api/user/progress?source=embed", Some(json!({"resourceId": "r1", "percent": 10})))]
    #[tokio::test]
    async fn test_すべてのルートでクエリを上流へ渡す(
        #[case] method: Method,
        #[case] uri: &str,
        #[case] body: Option<Value>,
    ) {
        let client = Arc::new(StubUserClient::default());
        let request = match body {
            Some(body) => json_request(method, uri, body),
            None => Request::builder()
                .method(method)
                .uri(uri)
                .header("authorization", "Bearer tok")
                .body(Body::empty())
                .unwrap(),
        };
        let expected = uri.split_once('?').map(|(_, query)| query.to_string());

        let (status, _) = send(app(client.clone()), request).await;

        assert!(status.is_success());
        assert_eq!(*client.queries.lock().unwrap(), vec![expected]);
    }
}
