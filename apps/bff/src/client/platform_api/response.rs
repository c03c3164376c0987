//! Platform API レスポンスの共通ハンドリング

use axum::http::StatusCode;
use serde_json::{Value, json};

use super::error::PlatformApiError;

/// 上流の 2xx レスポンス
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body:   Value,
}

impl UpstreamResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }
}

/// Platform API レスポンスの共通ハンドリング
///
/// 2xx はボディを JSON として読み、ステータスと一緒に返す（空ボディは `null`）。
/// 非 2xx は [`PlatformApiError::Upstream`] として返し、JSON でないボディは
/// `{"error": <text>}` に包む（空ボディは `null`）。
pub(super) async fn handle_response(
    response: reqwest::Response,
) -> Result<UpstreamResponse, PlatformApiError> {
    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)
                .map_err(|e| PlatformApiError::InvalidBody(e.to_string()))?
        };
        return Ok(UpstreamResponse { status, body });
    }

    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or_else(|_| json!({ "error": text }))
    };
    Err(PlatformApiError::Upstream { status, body })
}
