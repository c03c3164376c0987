//! Platform API の死活確認

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use super::{client_impl::PlatformApiClientImpl, error::PlatformApiError};

/// Platform API の死活確認トレイト
#[async_trait]
pub trait PlatformHealthClient: Send + Sync {
    /// Platform API の `GET /health` を呼び出す
    ///
    /// ステータスが 2xx なら `Ok(())`。ボディは見ない。
    /// タイムアウトは呼び出し側で設定する。
    async fn check_health(&self) -> Result<(), PlatformApiError>;
}

#[async_trait]
impl PlatformHealthClient for PlatformApiClientImpl {
    async fn check_health(&self) -> Result<(), PlatformApiError> {
        let response = self
            .request(Method::GET, "/health", None, None)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(PlatformApiError::Upstream {
                status,
                body: Value::Null,
            })
        }
    }
}
