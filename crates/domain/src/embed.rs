//! # 埋め込みモード判定
//!
//! アプリが GrowthLab の iframe 内で動いているかを、リクエストに含まれる
//! ヒントから判定する。あわせて、親ウィンドウとして許可するオリジンの
//! リストを管理する。
//!
//! ## 判定ルール（上から順に評価）
//!
//! | ヒント | 結果 |
//! |--------|------|
//! | クエリ `embedded=true` / `embedded=1` | Embedded |
//! | `Sec-Fetch-Dest: iframe` | Embedded |
//! | `X-Embedded-By: growthlab` | Embedded |
//! | 上記以外 | Standalone |

use serde::Serialize;
use url::Url;

/// 親プラットフォームを示す `X-Embedded-By` の値
pub const GROWTHLAB_EMBEDDER: &str = "growthlab";

/// 動作モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmbedMode {
    #[default]
    Standalone,
    Embedded,
}

impl EmbedMode {
    pub fn is_embedded(self) -> bool {
        self == Self::Embedded
    }

    /// リクエストのヒントからモードを判定する
    pub fn detect(hints: &EmbedHints<'_>) -> Self {
        let by_query = hints
            .embedded_query
            .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1");
        let by_fetch_dest = hints
            .sec_fetch_dest
            .is_some_and(|v| v.eq_ignore_ascii_case("iframe"));
        let by_embedder = hints
            .embedded_by
            .is_some_and(|v| v.trim().eq_ignore_ascii_case(GROWTHLAB_EMBEDDER));

        if by_query || by_fetch_dest || by_embedder {
            Self::Embedded
        } else {
            Self::Standalone
        }
    }
}

/// 埋め込み判定に使うリクエスト上のヒント
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbedHints<'a> {
    /// クエリパラメータ `embedded` の値
    pub embedded_query: Option<&'a str>,
    /// `Sec-Fetch-Dest` ヘッダーの値
    pub sec_fetch_dest: Option<&'a str>,
    /// `X-Embedded-By` ヘッダーの値
    pub embedded_by:    Option<&'a str>,
}

impl<'a> EmbedHints<'a> {
    /// 生のクエリ文字列から `embedded` パラメータを探す
    pub fn embedded_from_query(raw_query: Option<&'a str>) -> Option<&'a str> {
        raw_query?
            .split('&')
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
            .find(|(key, _)| *key == "embedded")
            .map(|(_, value)| value)
    }
}

/// 親ウィンドウとして許可するオリジンのリスト
///
/// オリジンは `scheme://host[:port]` に正規化して保持する。
/// パスや末尾スラッシュは比較に影響しない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentOrigins(Vec<String>);

impl ParentOrigins {
    /// カンマ区切りの文字列からパースする
    ///
    /// URL として解釈できない要素は無視する。
    pub fn parse(list: &str) -> Self {
        let mut origins: Vec<String> = list
            .split(',')
            .filter_map(normalize_origin)
            .collect();
        origins.dedup();
        Self(origins)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// オリジンが許可リストに含まれるか
    pub fn allows(&self, origin: &str) -> bool {
        normalize_origin(origin).is_some_and(|o| self.0.contains(&o))
    }

    /// CSP の `frame-ancestors` ディレクティブ
    ///
    /// 自分自身（`'self'`）は常に許可する。
    pub fn frame_ancestors_directive(&self) -> String {
        let sources = std::iter::once("'self'")
            .chain(self.iter())
            .collect::<Vec<_>>()
            .join(" ");
        format!("frame-ancestors {sources}")
    }
}

fn normalize_origin(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let origin = url.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Some("true"), None, None, EmbedMode::Embedded)]
    #[case(Some("1"), None, None, EmbedMode::Embedded)]
    #[case(Some("false"), None, None, EmbedMode::Standalone)]
    #[case(None, Some("iframe"), None, EmbedMode::Embedded)]
    #[case(None, Some("document"), None, EmbedMode::Standalone)]
    #[case(None, None, Some("GrowthLab"), EmbedMode::Embedded)]
    #[case(None, None, Some("other"), EmbedMode::Standalone)]
    #[case(None, None, None, EmbedMode::Standalone)]
    fn test_ヒントから埋め込みモードを判定する(
        #[case] embedded_query: Option<&str>,
        #[case] sec_fetch_dest: Option<&str>,
        #[case] embedded_by: Option<&str>,
        #[case] expected: EmbedMode,
    ) {
        let hints = EmbedHints {
            embedded_query,
            sec_fetch_dest,
            embedded_by,
        };

        assert_eq!(EmbedMode::detect(&hints), expected);
    }

    #[rstest]
    #[case(Some("embedded=true&page=2"), Some("true"))]
    #[case(Some("page=2&embedded=1"), Some("1"))]
    #[case(Some("embedded"), Some(""))]
    #[case(Some("embeddedx=true"), None)]
    #[case(None, None)]
    fn test_クエリ文字列からembeddedを探す(
        #[case] raw: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(EmbedHints::embedded_from_query(raw), expected);
    }

    #[test]
    fn test_オリジンは正規化して比較する() {
        let origins = ParentOrigins::parse("https://app.growthlab.io/, https://staging.growthlab.io:8443");

        assert!(origins.allows("https://app.growthlab.io"));
        assert!(origins.allows("https://app.growthlab.io/dashboard"));
        assert!(origins.allows("https://staging.growthlab.io:8443"));
        assert!(!origins.allows("https://staging.growthlab.io"));
        assert!(!origins.allows("http://app.growthlab.io"));
    }

    #[test]
    fn test_不正な要素は無視する() {
        let origins = ParentOrigins::parse("not a url, ,https://app.growthlab.io");

        assert_eq!(origins.iter().collect::<Vec<_>>(), vec!["https://app.growthlab.io"]);
    }

    #[test]
    fn test_frame_ancestorsは自身と許可オリジンを並べる() {
        let origins = ParentOrigins::parse("https://app.growthlab.io");

        assert_eq!(
            origins.frame_ancestors_directive(),
            "frame-ancestors 'self' https://app.growthlab.io"
        );
    }

    #[test]
    fn test_許可オリジンが空ならselfのみ() {
        assert_eq!(
            ParentOrigins::default().frame_ancestors_directive(),
            "frame-ancestors 'self'"
        );
    }
}
