//! # 認証コンテキスト
//!
//! ルートハンドラに渡す「誰が・どのモードで」アクセスしているかの情報。
//!
//! BFF はセッションを持たない。トークンは毎リクエスト `Authorization` ヘッダー
//! または Cookie から取り出し、必要なときだけ上流で検証する。

use serde::Serialize;

use crate::{embed::EmbedMode, user::User};

/// ベアラートークン
///
/// ログに平文が出ないよう `Debug` をマスクする。`Display` は実装しない。
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// 生のトークン文字列から作る（前後の空白は除去、空なら `None`）
    pub fn parse(raw: &str) -> Option<Self> {
        let token = raw.trim();
        (!token.is_empty()).then(|| Self(token.to_string()))
    }

    /// `Authorization` ヘッダーの値から取り出す
    ///
    /// スキームは大文字小文字を区別しない（`Bearer` / `bearer`）。
    pub fn from_authorization(value: &str) -> Option<Self> {
        let (scheme, token) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        Self::parse(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `Authorization` ヘッダーに入れる値
    pub fn to_header_value(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BearerToken").field(&"[REDACTED]").finish()
    }
}

/// ハンドラに公開する認証コンテキスト
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AuthContext {
    pub is_authenticated: bool,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub user:             Option<User>,
    pub is_embedded:      bool,
}

impl AuthContext {
    pub fn anonymous(mode: EmbedMode) -> Self {
        Self {
            is_authenticated: false,
            user:             None,
            is_embedded:      mode.is_embedded(),
        }
    }

    pub fn authenticated(user: User, mode: EmbedMode) -> Self {
        Self {
            is_authenticated: true,
            user:             Some(user),
            is_embedded:      mode.is_embedded(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("Bearer abc", Some("abc"))]
    #[case("bearer abc", Some("abc"))]
    #[case("BEARER   abc  ", Some("abc"))]
    #[case("Basic abc", None)]
    #[case("Bearer ", None)]
    #[case("abc", None)]
    fn test_authorizationヘッダーからトークンを取り出す(
        #[case] header: &str,
        #[case] expected: Option<&str>,
    ) {
        let token = BearerToken::from_authorization(header);

        assert_eq!(token.as_ref().map(BearerToken::as_str), expected);
    }

    #[test]
    fn test_debug出力はマスクされる() {
        let token = BearerToken::parse("secret-token").unwrap();

        let debug = format!("{token:?}");

        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_ヘッダー値はbearerスキーム付き() {
        let token = BearerToken::parse(" t0k ").unwrap();

        assert_eq!(token.to_header_value(), "Bearer t0k");
    }

    #[test]
    fn test_anonymousは未認証で埋め込みフラグを反映する() {
        let ctx = AuthContext::anonymous(EmbedMode::Embedded);

        assert!(!ctx.is_authenticated);
        assert!(ctx.is_embedded);
        assert!(ctx.user.is_none());
    }

    #[test]
    fn test_authenticatedのjson形状() {
        let user = User::from_verify_body(&serde_json::json!({"id": "u1"})).unwrap();

        let json = serde_json::to_value(AuthContext::authenticated(user, EmbedMode::Standalone))
            .unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "is_authenticated": true,
                "user": {"id": "u1"},
                "is_embedded": false
            })
        );
    }
}
