//! # BFF 設定
//!
//! 環境変数から BFF サーバーの設定を読み込む。
//!
//! | 変数名 | 必須 | デフォルト |
//! |--------|------|-----------|
//! | `BFF_HOST` | No | `0.0.0.0` |
//! | `BFF_PORT` | No | `3000` |
//! | `PLATFORM_API_URL` | **Yes** | - |
//! | `PLATFORM_API_KEY` | **Yes** | - |
//! | `GROWTHLAB_ORIGINS` | No | 空（カンマ区切り） |
//! | `HEALTH_CHECK_TIMEOUT_SECS` | No | `5` |
//! | `ENRICH_USER_CONTEXT` | No | `true` |

use std::{env, time::Duration};

use startup_resources_domain::embed::ParentOrigins;
use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    #[error("{name} の値が不正です: {value}")]
    Invalid { name: &'static str, value: String },
}

/// BFF サーバーの設定
#[derive(Debug, Clone)]
pub struct BffConfig {
    /// バインドアドレス
    pub host: String,
    /// ポート番号
    pub port: u16,
    /// 上流 Platform API のベース URL
    pub platform_api_url: String,
    /// 上流に付与する API キー
    pub platform_api_key: String,
    /// 親ウィンドウ（GrowthLab）として許可するオリジン
    pub parent_origins: ParentOrigins,
    /// Readiness Check の上流呼び出しの制限時間
    pub health_check_timeout: Duration,
    /// リソース・ツールのレスポンスに `user_context` を付与するか
    pub enrich_user_context: bool,
}

impl BffConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// テストでプロセスの環境変数を書き換えずに済むよう分けている。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let port = match optional("BFF_PORT") {
            Some(v) => parse_value("BFF_PORT", &v)?,
            None => DEFAULT_PORT,
        };
        let health_check_timeout_secs = match optional("HEALTH_CHECK_TIMEOUT_SECS") {
            Some(v) => parse_value("HEALTH_CHECK_TIMEOUT_SECS", &v)?,
            None => DEFAULT_HEALTH_CHECK_TIMEOUT_SECS,
        };
        let enrich_user_context = match optional("ENRICH_USER_CONTEXT") {
            Some(v) => parse_flag("ENRICH_USER_CONTEXT", &v)?,
            None => true,
        };

        let platform_api_url = required("PLATFORM_API_URL")?;
        if url::Url::parse(&platform_api_url).is_err() {
            return Err(ConfigError::Invalid {
                name:  "PLATFORM_API_URL",
                value: platform_api_url,
            });
        }

        Ok(Self {
            host: optional("BFF_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            platform_api_url,
            platform_api_key: required("PLATFORM_API_KEY")?,
            parent_origins: ParentOrigins::parse(
                &optional("GROWTHLAB_ORIGINS").unwrap_or_default(),
            ),
            health_check_timeout: Duration::from_secs(health_check_timeout_secs),
            enrich_user_context,
        })
    }
}

fn parse_value<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
    }
}
