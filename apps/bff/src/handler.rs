//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュールで re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、データの意味づけは上流 Platform API に委ねる
//!
//! ## ハンドラ一覧
//!
//! - `health`: ヘルスチェック
//! - `auth`: トークン検証と認証コンテキスト
//! - `catalog`: リソース・ツールの一覧と詳細
//! - `search`: 横断検索
//! - `user`: プロフィールと学習進捗

pub mod auth;
pub mod catalog;
pub mod health;
pub mod search;
pub mod user;

pub use auth::{AuthState, context, verify};
pub use catalog::{CatalogState, UserContextFlags, get_resource, get_tool, list_resources, list_tools};
pub use health::{ReadinessState, health_check, readiness_check};
pub use search::{SearchParams, search};
pub use user::{UserState, get_profile, get_progress, record_progress, update_profile};
