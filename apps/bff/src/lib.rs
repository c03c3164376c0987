//! # BFF (Backend for Frontend) ライブラリ
//!
//! Startup Resources のフロントエンド専用 API サーバーのコアモジュール。
//!
//! ## モジュール構成
//!
//! - `app_builder`: ルーターとミドルウェアスタックの組み立て
//! - `client`: 上流 Platform API クライアント
//! - `config`: 環境変数からの設定読み込み
//! - `handler`: HTTP ハンドラ
//! - `middleware`: ミドルウェア（トークン必須化、セキュリティヘッダー等）
//! - `openapi`: OpenAPI 仕様の集約

pub mod app_builder;
pub mod client;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod openapi;
