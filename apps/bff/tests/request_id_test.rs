//! # Request ID レイヤーのテスト
//!
//! `build_app` が組み立てるルーターで、Request ID レイヤー（SetRequestIdLayer +
//! PropagateRequestIdLayer + store_request_id）が正しく動作することを検証する。
//!
//! - レスポンスに `X-Request-Id` ヘッダーが含まれる
//! - クライアント提供の `X-Request-Id` がそのまま返される
//! - 自動生成の `X-Request-Id` が UUID v7 形式である

use std::sync::Arc;

use axum::{Router, body::Body};
use http::{Request, StatusCode};
use startup_resources_bff::{
    app_builder::build_app,
    client::PlatformApiClientImpl,
    config::BffConfig,
};
use tower::ServiceExt;

/// テスト用のルーターを構築する
///
/// `/health` は上流を呼ばないため、上流 URL は到達不能なもので構わない。
fn test_app() -> Router {
    let config = BffConfig::from_lookup(|name| match name {
        "PLATFORM_API_URL" => Some("http://127.0.0.1:9".to_string()),
        "PLATFORM_API_KEY" => Some("test-key".to_string()),
        _ => None,
    })
    .unwrap();
    let client = Arc::new(PlatformApiClientImpl::new(
        &config.platform_api_url,
        config.platform_api_key.clone(),
    ));
    build_app(&config, client)
}

#[tokio::test]
async fn test_レスポンスにx_request_idヘッダーが含まれる() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers().contains_key("x-request-id"),
        "レスポンスに x-request-id ヘッダーが含まれること"
    );
}

#[tokio::test]
async fn test_クライアント提供のx_request_idがそのまま返される() {
    let app = test_app();
    let custom_id = "client-provided-request-id-123";

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", custom_id)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .unwrap()
            .to_str()
            .unwrap(),
        custom_id,
        "クライアント提供の Request ID がそのまま返されること"
    );
}

#[tokio::test]
async fn test_自動生成のx_request_idがuuid_v7形式である() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let request_id = response
        .headers()
        .get("x-request-id")
        .unwrap()
        .to_str()
        .unwrap();

    let uuid = uuid::Uuid::parse_str(request_id)
        .unwrap_or_else(|_| panic!("有効な UUID であること: {request_id}"));
    assert_eq!(
        uuid.get_version(),
        Some(uuid::Version::SortRand),
        "UUID v7（SortRand）であること"
    );
}

#[tokio::test]
async fn test_401レスポンスにもx_request_idが付く() {
    let app = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/user/profile")
                .header("x-request-id", "req-401")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["x-request-id"], "req-401");
}
