//! # Request ID 伝播
//!
//! 受信リクエストの Request ID を、上流 Platform API への呼び出しに引き継ぐ。
//!
//! `SetRequestIdLayer` が付けた ID を [`store_request_id`] が task-local に置き、
//! クライアント側は [`inject_request_id`] で `X-Request-Id` ヘッダーに載せる。
//! 検索のファンアウトも同じタスク内で `join!` するので、3 本とも同じ ID になる。

use std::future::Future;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use startup_resources_shared::observability::REQUEST_ID_HEADER;
use tower_http::request_id::RequestId;

tokio::task_local! {
    static REQUEST_ID: String;
}

/// 現在のタスクに紐づく Request ID（スコープ外なら `None`）
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(Clone::clone).ok()
}

/// 指定した Request ID のスコープで future を実行する
pub async fn with_request_id<F: Future>(request_id: String, future: F) -> F::Output {
    REQUEST_ID.scope(request_id, future).await
}

/// extensions の `RequestId` を task-local に置くミドルウェア
///
/// ID が取れない場合（レイヤー順の誤り等）は `-` を置く。
pub async fn store_request_id(request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .map_or_else(|| "-".to_string(), str::to_string);

    with_request_id(request_id, next.run(request)).await
}

/// 上流へのリクエストに `X-Request-Id` を付ける
pub fn inject_request_id(builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if let Some(id) = current_request_id() {
        builder.header(REQUEST_ID_HEADER, id)
    } else {
        builder
    }
}
