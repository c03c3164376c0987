//! # Platform API クライアント
//!
//! BFF から上流 Platform API への通信を担当する。
//!
//! 全リクエストに `X-API-Key` と `X-Request-Id` を付け、トークンがあれば
//! `Authorization: Bearer` も付ける。リトライ・キャッシュはしない。
//!
//! ## エンドポイント
//!
//! - `GET /auth/verify` - トークン検証
//! - `GET /resources`, `GET /resources/{id}` - リソース
//! - `GET /tools`, `GET /tools/{id}` - ツール
//! - `GET /resources/search`, `/tools/search`, `/templates/search` - 検索
//! - `GET|PUT /users/me` - プロフィール
//! - `GET|POST /users/me/progress` - 学習進捗
//! - `GET /health` - 死活確認
//!
//! ## モジュール構成
//!
//! - `client_impl`: スーパートレイトと実装構造体
//! - `error`: エラー型
//! - `response`: レスポンスの共通ハンドリング
//! - `auth_client` / `catalog_client` / `user_client` / `health_client`: サブトレイト

mod auth_client;
mod catalog_client;
mod client_impl;
mod error;
mod health_client;
mod response;
mod user_client;

pub use auth_client::PlatformAuthClient;
pub use catalog_client::PlatformCatalogClient;
pub use client_impl::{API_KEY_HEADER, PlatformApiClient, PlatformApiClientImpl};
pub use error::PlatformApiError;
pub use health_client::PlatformHealthClient;
pub use response::UpstreamResponse;
pub use user_client::PlatformUserClient;
