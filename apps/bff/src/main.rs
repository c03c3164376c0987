//! # BFF (Backend for Frontend) サーバー
//!
//! Startup Resources のフロントエンド専用 API サーバー。
//!
//! ## 役割
//!
//! BFF はブラウザ（単体表示または GrowthLab に iframe 埋め込み）と上流
//! Platform API の間に位置し、以下の責務を担う:
//!
//! - **認証情報の中継**: Bearer トークンまたは Cookie のトークンを上流に転送
//! - **API キーの秘匿**: Platform API キーをブラウザに渡さず BFF が付与
//! - **アグリゲーション**: 3 種類の検索を 1 つのレスポンスにまとめる
//! - **埋め込み制御**: `frame-ancestors` で埋め込み元を GrowthLab に限定
//!
//! ## アーキテクチャ
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   Browser    │────▶│     BFF      │────▶│ Platform API │
//! │ (GrowthLab)  │     │  port: 3000  │     │  (external)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! 環境変数は [`BffConfig`] を参照。
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（.env ファイルを使用）
//! cargo run -p startup-resources-bff
//!
//! # 本番環境（環境変数を直接指定）
//! PLATFORM_API_URL=https://... PLATFORM_API_KEY=... cargo run -p startup-resources-bff --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use startup_resources_bff::{
    app_builder::build_app,
    client::PlatformApiClientImpl,
    config::BffConfig,
};
use startup_resources_shared::{
    event_log::error,
    observability::{TracingConfig, init_tracing},
};
use tokio::net::TcpListener;

/// BFF サーバーのエントリーポイント
///
/// 以下の順序で初期化を行う:
///
/// 1. 環境変数の読み込み（.env ファイル）
/// 2. トレーシングの初期化
/// 3. アプリケーション設定の読み込み
/// 4. ルーターの構築
/// 5. HTTP サーバーの起動
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    // 本番環境では .env ファイルは使用せず、環境変数を直接設定する
    dotenvy::dotenv().ok();

    let tracing_config = TracingConfig::from_env("bff");
    init_tracing(&tracing_config);
    let _tracing_guard = tracing::info_span!("app", service = "bff").entered();

    let config = BffConfig::from_env().inspect_err(|e| {
        tracing::error!(
            error.category = error::category::CONFIGURATION,
            "設定の読み込みに失敗しました: {}",
            e
        );
    })?;

    tracing::info!("BFF サーバーを起動します: {}:{}", config.host, config.port);
    if config.parent_origins.is_empty() {
        tracing::warn!("GROWTHLAB_ORIGINS が未設定のため、埋め込みは自オリジンからのみ許可されます");
    }

    let client = Arc::new(PlatformApiClientImpl::new(
        &config.platform_api_url,
        config.platform_api_key.clone(),
    ));
    let app = build_app(&config, client);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("バインドアドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("BFF サーバーが起動しました: {}", addr);

    // Graceful shutdown は axum::serve が自動的に処理する
    axum::serve(listener, app).await?;

    Ok(())
}
