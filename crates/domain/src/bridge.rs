//! # ブリッジプロトコル
//!
//! 埋め込み時に親ウィンドウ（GrowthLab）と `postMessage` でやり取りする
//! メッセージの型を定義する。
//!
//! ## ワイヤー形式
//!
//! ```json
//! { "type": "THEME_CHANGE", "payload": { "theme": "dark" }, "source": "growthlab" }
//! ```
//!
//! `payload` は `type` ごとに形が異なるため、受信時はまず [`BridgeEnvelope`] として
//! 受け取り、[`BridgeEnvelope::into_message`] で型付きの [`BridgeMessage`] に変換する。
//!
//! ## メッセージ種別と送信方向
//!
//! | type | 方向 |
//! |------|------|
//! | `REQUEST_TOKEN` | アプリ → 親 |
//! | `TOKEN_RESPONSE` | 親 → アプリ |
//! | `AUTH_UPDATE` | 親 → アプリ |
//! | `NAVIGATION` | 双方向 |
//! | `RESOURCE_VIEW` | アプリ → 親 |
//! | `TOOL_USAGE` | アプリ → 親 |
//! | `THEME_CHANGE` | 親 → アプリ |
//! | `EMBEDDED_READY` | アプリ → 親 |

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

use crate::user::User;

/// ブリッジメッセージのエラー
#[derive(Debug, Error)]
pub enum BridgeError {
    /// JSON として解釈できない、または `type` / `source` が不正
    #[error("ブリッジメッセージの形式が不正です: {0}")]
    Malformed(#[source] serde_json::Error),

    /// `type` に対して `payload` の形が合わない
    #[error("{message_type} の payload が不正です: {source}")]
    InvalidPayload {
        message_type: BridgeMessageType,
        #[source]
        source:       serde_json::Error,
    },

    /// 親ウィンドウへの送信経路が閉じている
    #[error("親ウィンドウに送信できません")]
    ParentUnavailable,
}

/// メッセージ種別
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BridgeMessageType {
    RequestToken,
    TokenResponse,
    AuthUpdate,
    Navigation,
    ResourceView,
    ToolUsage,
    ThemeChange,
    EmbeddedReady,
}

/// 送信元
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum BridgeSource {
    /// このアプリ（iframe 側）
    #[serde(rename = "startup-resources")]
    #[strum(serialize = "startup-resources")]
    StartupResources,
    /// 親プラットフォーム
    #[serde(rename = "growthlab")]
    #[strum(serialize = "growthlab")]
    GrowthLab,
}

/// 表示テーマ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// `TOKEN_RESPONSE` の payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// 親が持つトークン（未ログインなら `null`）
    pub token: Option<String>,
}

/// `AUTH_UPDATE` の payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUpdate {
    pub is_authenticated: bool,
    #[serde(default)]
    pub user:             Option<User>,
    #[serde(default)]
    pub token:            Option<String>,
}

/// `NAVIGATION` の payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    pub path: String,
}

/// `RESOURCE_VIEW` の payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceView {
    pub resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title:       Option<String>,
}

/// `TOOL_USAGE` の payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUsage {
    pub tool_id: String,
    pub action:  String,
}

/// `THEME_CHANGE` の payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeChange {
    pub theme: Theme,
}

/// `EMBEDDED_READY` の payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedReady {
    pub version: String,
}

/// 型付きメッセージ
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeMessage {
    RequestToken,
    TokenResponse(TokenResponse),
    AuthUpdate(AuthUpdate),
    Navigation(Navigation),
    ResourceView(ResourceView),
    ToolUsage(ToolUsage),
    ThemeChange(ThemeChange),
    EmbeddedReady(EmbeddedReady),
}

impl BridgeMessage {
    pub fn message_type(&self) -> BridgeMessageType {
        match self {
            Self::RequestToken => BridgeMessageType::RequestToken,
            Self::TokenResponse(_) => BridgeMessageType::TokenResponse,
            Self::AuthUpdate(_) => BridgeMessageType::AuthUpdate,
            Self::Navigation(_) => BridgeMessageType::Navigation,
            Self::ResourceView(_) => BridgeMessageType::ResourceView,
            Self::ToolUsage(_) => BridgeMessageType::ToolUsage,
            Self::ThemeChange(_) => BridgeMessageType::ThemeChange,
            Self::EmbeddedReady(_) => BridgeMessageType::EmbeddedReady,
        }
    }

    fn payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::RequestToken => Ok(Value::Null),
            Self::TokenResponse(p) => serde_json::to_value(p),
            Self::AuthUpdate(p) => serde_json::to_value(p),
            Self::Navigation(p) => serde_json::to_value(p),
            Self::ResourceView(p) => serde_json::to_value(p),
            Self::ToolUsage(p) => serde_json::to_value(p),
            Self::ThemeChange(p) => serde_json::to_value(p),
            Self::EmbeddedReady(p) => serde_json::to_value(p),
        }
    }
}

/// ワイヤー上のメッセージ（`{type, payload, source}`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeEnvelope {
    #[serde(rename = "type")]
    pub message_type: BridgeMessageType,
    #[serde(default)]
    pub payload:      Value,
    pub source:       BridgeSource,
}

impl BridgeEnvelope {
    /// 型付きメッセージからエンベロープを作る
    pub fn new(source: BridgeSource, message: &BridgeMessage) -> Result<Self, BridgeError> {
        let message_type = message.message_type();
        let payload = message
            .payload()
            .map_err(|source| BridgeError::InvalidPayload {
                message_type,
                source,
            })?;
        Ok(Self {
            message_type,
            payload,
            source,
        })
    }

    /// JSON 文字列からパースする
    pub fn from_json(raw: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(raw).map_err(BridgeError::Malformed)
    }

    pub fn to_json(&self) -> Result<String, BridgeError> {
        serde_json::to_string(self).map_err(BridgeError::Malformed)
    }

    pub fn is_from(&self, source: BridgeSource) -> bool {
        self.source == source
    }

    /// `type` に応じて payload を型付きメッセージに変換する
    pub fn into_message(self) -> Result<BridgeMessage, BridgeError> {
        let message_type = self.message_type;
        let payload = self.payload;

        fn decode<T: DeserializeOwned>(
            message_type: BridgeMessageType,
            payload: Value,
        ) -> Result<T, BridgeError> {
            serde_json::from_value(payload).map_err(|source| BridgeError::InvalidPayload {
                message_type,
                source,
            })
        }

        let message = match message_type {
            BridgeMessageType::RequestToken => BridgeMessage::RequestToken,
            BridgeMessageType::TokenResponse => {
                BridgeMessage::TokenResponse(decode(message_type, payload)?)
            }
            BridgeMessageType::AuthUpdate => {
                BridgeMessage::AuthUpdate(decode(message_type, payload)?)
            }
            BridgeMessageType::Navigation => {
                BridgeMessage::Navigation(decode(message_type, payload)?)
            }
            BridgeMessageType::ResourceView => {
                BridgeMessage::ResourceView(decode(message_type, payload)?)
            }
            BridgeMessageType::ToolUsage => BridgeMessage::ToolUsage(decode(message_type, payload)?),
            BridgeMessageType::ThemeChange => {
                BridgeMessage::ThemeChange(decode(message_type, payload)?)
            }
            BridgeMessageType::EmbeddedReady => {
                BridgeMessage::EmbeddedReady(decode(message_type, payload)?)
            }
        };
        Ok(message)
    }
}
