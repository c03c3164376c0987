//! Platform API クライアントのエラー型

use axum::http::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Platform API クライアントエラー
#[derive(Debug, Clone, Error)]
pub enum PlatformApiError {
    /// 上流が非 2xx を返した（ステータスとボディはそのまま中継する）
    #[error("上流がステータス {status} を返しました")]
    Upstream { status: StatusCode, body: Value },

    /// 2xx だがボディが JSON として解釈できない
    #[error("上流レスポンスの形式が不正です: {0}")]
    InvalidBody(String),

    /// ネットワークエラー
    #[error("ネットワークエラー: {0}")]
    Network(String),
}

impl PlatformApiError {
    /// 上流の非 2xx ステータス（通信失敗なら `None`）
    pub fn upstream_status(&self) -> Option<StatusCode> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            Self::InvalidBody(_) | Self::Network(_) => None,
        }
    }
}

impl From<reqwest::Error> for PlatformApiError {
    fn from(err: reqwest::Error) -> Self {
        PlatformApiError::Network(err.to_string())
    }
}
