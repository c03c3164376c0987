//! # Startup Resources ドメイン層
//!
//! BFF とアプリケーションシェルが共有する型と判定ロジックを定義する。
//!
//! 上流 Platform API のエンティティ（リソース・ツール等）は BFF で中継するだけなので
//! ここでは型付けしない。このクレートが持つのは BFF 自身が判断に使うものに限る。
//!
//! ## モジュール構成
//!
//! - [`auth`] - 認証コンテキストとベアラートークン
//! - [`bridge`] - 親ウィンドウとのメッセージプロトコル
//! - [`embed`] - 埋め込みモード判定と親オリジンの許可リスト
//! - [`progress`] - 学習進捗の更新ルール
//! - [`search`] - 横断検索結果のマージ
//! - [`user`] - ユーザー DTO
//! - [`error`] - ドメインエラー
//!
//! ## 依存関係の方向
//!
//! ```text
//! bff ───→ domain
//!  └─────→ shared
//! shell ─→ domain
//! ```
//!
//! bff と shell は互いに依存しない。

pub mod auth;
pub mod bridge;
pub mod embed;
pub mod error;
pub mod progress;
pub mod search;
pub mod user;

pub use error::DomainError;
