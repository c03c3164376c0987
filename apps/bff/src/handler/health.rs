//! # ヘルスチェックハンドラ
//!
//! - `/health`: Liveness Check（常に `"healthy"` を返す）
//! - `/health/ready`: Readiness Check（Platform API の `/health` を時間制限付きで確認）
//!
//! 時間制限を設けるのはこのチェックだけで、プロキシ経路の上流呼び出しには設けない。

use std::{collections::BTreeMap, sync::Arc, time::Duration};

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use startup_resources_shared::{CheckStatus, HealthResponse, ReadinessResponse};

use crate::client::PlatformHealthClient;

/// readiness のチェック名
const PLATFORM_API_CHECK: &str = "platform_api";

/// BFF のヘルスチェックエンドポイント
#[utoipa::path(
   get,
   path = "/health",
   tag = "health",
   responses(
      (status = 200, description = "サーバー稼働中", body = HealthResponse)
   )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status:  "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness Check 用の State
pub struct ReadinessState {
    pub health_client: Arc<dyn PlatformHealthClient>,
    pub timeout:       Duration,
}

/// BFF の Readiness Check エンドポイント
///
/// Platform API が時間内に 2xx を返せば 200、それ以外は 503。
#[utoipa::path(
   get,
   path = "/health/ready",
   tag = "health",
   responses(
      (status = 200, description = "Platform API 到達可能", body = ReadinessResponse),
      (status = 503, description = "Platform API 到達不可", body = ReadinessResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn readiness_check(State(state): State<Arc<ReadinessState>>) -> impl IntoResponse {
    let platform = check_platform_api(state.health_client.as_ref(), state.timeout).await;

    let response = ReadinessResponse::from_checks(BTreeMap::from([(
        PLATFORM_API_CHECK.to_string(),
        platform,
    )]));
    let http_status = if response.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (http_status, Json(response))
}

async fn check_platform_api(client: &dyn PlatformHealthClient, timeout: Duration) -> CheckStatus {
    match tokio::time::timeout(timeout, client.check_health()).await {
        Ok(Ok(())) => CheckStatus::Ok,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "readiness check: platform api failed");
            CheckStatus::Error
        }
        Err(_) => {
            tracing::warn!(
                timeout_secs = timeout.as_secs(),
                "readiness check: platform api timed out"
            );
            CheckStatus::Error
        }
    }
}
