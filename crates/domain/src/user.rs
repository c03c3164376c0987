//! # ユーザー
//!
//! 上流 Platform API が返すユーザー情報のミラー。
//!
//! BFF はユーザーを生成・変更しないため、既知のフィールド以外は
//! `extra` にそのまま保持して往復で欠落しないようにする。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// ユーザー DTO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id:    String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name:  Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// 上流のトークン検証レスポンスからユーザーを取り出す
    ///
    /// `{"user": {...}}` 形式と、ユーザーオブジェクトそのものの両方に対応する。
    /// どちらにも当てはまらなければ `None`。
    pub fn from_verify_body(body: &Value) -> Option<Self> {
        let candidate = match body.get("user") {
            Some(user @ Value::Object(_)) => user,
            _ => body,
        };
        serde_json::from_value(candidate.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_userキー配下のオブジェクトを取り出す() {
        let body = json!({"valid": true, "user": {"id": "u1", "email": "a@example.com"}});

        let user = User::from_verify_body(&body).unwrap();

        assert_eq!(user.id, "u1");
        assert_eq!(user.email.as_deref(), Some("a@example.com"));
    }

    #[test]
    fn test_ボディそのものがユーザーでも取り出せる() {
        let body = json!({"id": "u2", "name": "Founder", "plan": "pro"});

        let user = User::from_verify_body(&body).unwrap();

        assert_eq!(user.name.as_deref(), Some("Founder"));
        assert_eq!(user.extra.get("plan"), Some(&json!("pro")));
    }

    #[test]
    fn test_idがなければnone() {
        assert_eq!(User::from_verify_body(&json!({"valid": false})), None);
    }

    #[test]
    fn test_未知フィールドはシリアライズで保持される() {
        let body = json!({"id": "u3", "company": {"stage": "seed"}});

        let user = User::from_verify_body(&body).unwrap();

        assert_eq!(serde_json::to_value(&user).unwrap(), body);
    }
}
