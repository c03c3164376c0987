//! # BFF エラーハンドリング
//!
//! 上流レスポンス・クライアントエラー・入力エラーを axum レスポンスに変換する。
//!
//! ## 変換ルール
//!
//! | 入力 | レスポンス |
//! |------|-----------|
//! | 上流 2xx | 上流のステータスと JSON ボディ |
//! | 上流 非 2xx | 上流のステータスとボディ（JSON でなければ `{"error": ...}`） |
//! | 通信失敗・不正な 2xx ボディ | 500 + RFC 9457 |
//! | 入力検証エラー・JSON として読めないボディ | 400 + RFC 9457 |
//! | トークンなし | 401 + RFC 9457 |
//!
//! 内部エラーの詳細はログにだけ出し、レスポンスには含めない。

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use startup_resources_domain::DomainError;
use startup_resources_shared::{ErrorResponse, event_log::error};

use crate::client::{PlatformApiError, UpstreamResponse};

// --- 上流レスポンスの中継 ---

impl IntoResponse for UpstreamResponse {
    fn into_response(self) -> Response {
        if self.status == StatusCode::NO_CONTENT || self.body.is_null() {
            return self.status.into_response();
        }
        (self.status, Json(self.body)).into_response()
    }
}

impl IntoResponse for PlatformApiError {
    fn into_response(self) -> Response {
        match self {
            PlatformApiError::Upstream { status, body } => {
                if body.is_null() {
                    status.into_response()
                } else {
                    (status, Json(body)).into_response()
                }
            }
            PlatformApiError::InvalidBody(_) | PlatformApiError::Network(_) => {
                internal_error_response()
            }
        }
    }
}

/// Platform API エラーをログ付きでレスポンスに変換する
///
/// 通信失敗と不正ボディは `error.category` / `error.kind` 付きで `error` ログ、
/// 上流の非 2xx は中継するだけなので `debug` に留める。
pub fn log_and_convert_platform_error(context: &str, err: PlatformApiError) -> Response {
    match &err {
        PlatformApiError::Network(_) => {
            tracing::error!(
                error.category = error::category::EXTERNAL_SERVICE,
                error.kind = error::kind::UPSTREAM_COMMUNICATION,
                "{}で上流との通信に失敗: {}",
                context,
                err
            );
        }
        PlatformApiError::InvalidBody(_) => {
            tracing::error!(
                error.category = error::category::EXTERNAL_SERVICE,
                error.kind = error::kind::UPSTREAM_RESPONSE,
                "{}で上流レスポンスが不正: {}",
                context,
                err
            );
        }
        PlatformApiError::Upstream { status, .. } => {
            tracing::debug!(upstream.status = status.as_u16(), "{}: 上流の非 2xx を中継", context);
        }
    }
    err.into_response()
}

/// 上流呼び出しの結果をレスポンスに変換する
pub fn relay(context: &str, result: Result<UpstreamResponse, PlatformApiError>) -> Response {
    match result {
        Ok(upstream) => upstream.into_response(),
        Err(e) => log_and_convert_platform_error(context, e),
    }
}

// --- 入力エラー ---

/// ドメインの入力エラーを 400 に変換する
pub fn domain_error_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(detail) => validation_error_response(&detail),
    }
}

/// JSON ボディの抽出失敗を 400 に変換する
///
/// axum 既定のテキスト応答ではなく、他の入力エラーと同じ RFC 9457 形式で返す。
pub fn json_rejection_response(rejection: JsonRejection) -> Response {
    tracing::debug!(error = %rejection, "JSON ボディを読めない");
    validation_error_response(&rejection.body_text())
}

// --- レスポンスヘルパー ---

/// 未認証レスポンス
pub fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse::unauthorized("認証が必要です")),
    )
        .into_response()
}

/// 内部エラーレスポンス
pub fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::internal_error()),
    )
        .into_response()
}

/// バリデーションエラーレスポンス
pub fn validation_error_response(detail: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::validation_error(detail)),
    )
        .into_response()
}

/// JSON オブジェクトのボディにキーを追加する（オブジェクト以外はそのまま）
pub(crate) fn insert_if_object(body: &mut Value, key: &str, value: Value) {
    if let Value::Object(map) = body {
        map.insert(key.to_string(), value);
    }
}
