//! # ドメイン層エラー定義
//!
//! BFF が上流へ転送する前に弾く入力エラーを表す。
//! API 層で 400 Bad Request に変換される。

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// 入力値がルールに違反している
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}
