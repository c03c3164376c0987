//! # 学習進捗
//!
//! `POST /api/user/progress` で受け取る進捗更新を、上流へ転送する前に軽く検証する。
//! 検証に通ったボディは加工せず、クライアントが送った JSON のまま転送する。
//!
//! ## ルール
//!
//! - ボディは JSON オブジェクト
//! - `resource_id`（`resourceId` も可）は空文字不可
//! - `status` があれば `not_started` / `in_progress` / `completed` のいずれか
//! - `percent` があれば 0〜100 の整数
//!
//! `status` と `percent` の整合性は上流に任せる。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::DomainError;

/// 進捗ステータス
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// クライアントから受け取る進捗更新の形
///
/// 検証とドキュメント用。転送には使わない。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProgressUpdateRequest {
    #[serde(default, alias = "resourceId")]
    pub resource_id: String,
    #[serde(default)]
    pub status:      Option<ProgressStatus>,
    #[serde(default)]
    pub percent:     Option<i64>,
    /// 上流が解釈する追加フィールド（メモ等）
    #[serde(flatten)]
    #[cfg_attr(feature = "openapi", schema(ignore))]
    pub extra:       Map<String, Value>,
}

/// 検証済みの進捗更新
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    resource_id: String,
    status:      Option<ProgressStatus>,
    percent:     Option<u8>,
    body:        Value,
}

impl ProgressUpdate {
    /// クライアントの JSON を検証する
    pub fn from_json(body: Value) -> Result<Self, DomainError> {
        if !body.is_object() {
            return Err(DomainError::Validation(
                "進捗は JSON オブジェクトで指定してください".to_string(),
            ));
        }
        let request = ProgressUpdateRequest::deserialize(&body).map_err(|e| {
            DomainError::Validation(format!("進捗の形式が不正です: {e}"))
        })?;

        if request.resource_id.trim().is_empty() {
            return Err(DomainError::Validation(
                "resource_id は必須です".to_string(),
            ));
        }
        let percent = request
            .percent
            .map(|p| {
                u8::try_from(p).ok().filter(|p| *p <= 100).ok_or_else(|| {
                    DomainError::Validation(format!("percent は 0〜100 で指定してください: {p}"))
                })
            })
            .transpose()?;

        Ok(Self {
            resource_id: request.resource_id,
            status: request.status,
            percent,
            body,
        })
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    pub fn status(&self) -> Option<ProgressStatus> {
        self.status
    }

    pub fn percent(&self) -> Option<u8> {
        self.percent
    }

    /// 上流へ転送するボディ（受け取ったまま）
    pub fn body(&self) -> &Value {
        &self.body
    }
}
