//! # Observability 基盤
//!
//! トレーシング初期化と Request ID 関連のヘルパーを提供する。
//!
//! - `LOG_FORMAT=json|pretty` で出力形式を切り替える
//! - `RUST_LOG` でレベルを制御する（未設定時は [`DEFAULT_ENV_FILTER`]）
//! - Request ID は UUID v7 で生成し、リクエストスパンに `request_id` として載せる

/// Request ID ヘッダー名（小文字で統一）
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// `RUST_LOG` 未設定時のフィルタ
pub const DEFAULT_ENV_FILTER: &str = "info,startup_resources=debug,tower_http=info";

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON 形式（本番環境向け）
    Json,
    /// 人間が読みやすい形式（開発環境向け）
    #[default]
    Pretty,
}

impl LogFormat {
    /// 環境変数の値からログ形式を決める
    ///
    /// 大文字小文字は区別しない。未設定・不明な値は `Pretty` にフォールバックする。
    /// トレーシング初期化前に呼ばれるため、警告は stderr に直接出す。
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::default(),
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            Some(v) if v.eq_ignore_ascii_case("pretty") => Self::Pretty,
            Some(other) => {
                eprintln!("WARNING: unknown LOG_FORMAT={other:?}, falling back to pretty");
                Self::Pretty
            }
        }
    }

    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref())
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// サービス名（JSON ログの `span.service` に出る）
    pub service_name: String,
    pub log_format:   LogFormat,
}

impl TracingConfig {
    pub fn new(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            service_name: service_name.into(),
            log_format,
        }
    }

    pub fn from_env(service_name: impl Into<String>) -> Self {
        Self::new(service_name, LogFormat::from_env())
    }
}

/// グローバル subscriber を初期化する
///
/// サービス名は呼び出し側で `tracing::info_span!("app", service = ...)` に入れる。
#[cfg(feature = "observability")]
pub fn init_tracing(config: &TracingConfig) {
    use tracing_subscriber::{Layer as _, layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_ENV_FILTER.into());

    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_target(true)
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// UUID v7 の Request ID を生成する `MakeRequestId`
///
/// クライアントが `X-Request-Id` を送ってきた場合は `SetRequestIdLayer` が
/// そちらを優先するため、ここが呼ばれるのはヘッダーがないときだけ。
#[cfg(feature = "observability")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV7;

#[cfg(feature = "observability")]
impl tower_http::request_id::MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(
        &mut self,
        _request: &http::Request<B>,
    ) -> Option<tower_http::request_id::RequestId> {
        let id = uuid::Uuid::now_v7().to_string();
        http::HeaderValue::from_str(&id)
            .ok()
            .map(tower_http::request_id::RequestId::new)
    }
}

/// `TraceLayer::make_span_with` 用のリクエストスパンを作る
///
/// `request_id` をスパンフィールドに含めることで、ハンドラ内のすべてのログに
/// Request ID が自動で付く。
#[cfg(feature = "observability")]
pub fn make_request_span<B>(request: &http::Request<B>) -> tracing::Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_value_jsonは大文字小文字を区別しない() {
        assert_eq!(LogFormat::from_env_value(Some("json")), LogFormat::Json);
        assert_eq!(LogFormat::from_env_value(Some("JSON")), LogFormat::Json);
    }

    #[test]
    fn test_from_env_value_未設定と空文字はprettyになる() {
        assert_eq!(LogFormat::from_env_value(None), LogFormat::Pretty);
        assert_eq!(LogFormat::from_env_value(Some("  ")), LogFormat::Pretty);
    }

    #[test]
    fn test_from_env_value_不明な値はprettyにフォールバックする() {
        assert_eq!(LogFormat::from_env_value(Some("yaml")), LogFormat::Pretty);
    }

    #[test]
    fn test_tracing_configのフィールド() {
        let config = TracingConfig::new("bff", LogFormat::Json);

        assert_eq!(config.service_name, "bff");
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
