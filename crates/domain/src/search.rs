//! # 横断検索
//!
//! リソース・ツール・テンプレートの各検索結果を 1 つのレスポンスにまとめる。
//!
//! 上流のレスポンス形は検索対象ごとに揺れがあるため、[`extract_items`] で
//! 配列を取り出してから [`SearchResults::merge`] でマージする。
//! `total` は常に 3 配列の長さの合計になる。

use serde::Serialize;
use serde_json::Value;

/// 検索対象
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum SearchKind {
    Resources,
    Tools,
    Templates,
}

impl SearchKind {
    pub const ALL: [Self; 3] = [Self::Resources, Self::Tools, Self::Templates];

    /// 上流の検索エンドポイントのパス
    pub fn upstream_path(self) -> &'static str {
        match self {
            Self::Resources => "/resources/search",
            Self::Tools => "/tools/search",
            Self::Templates => "/templates/search",
        }
    }
}

/// 結果配列を保持するキーの候補（配列そのものでない場合）
const ITEM_KEYS: [&str; 3] = ["data", "results", "items"];

/// 上流レスポンスから結果配列を取り出す
///
/// トップレベルが配列ならそれを、オブジェクトなら `data` / `results` / `items`
/// の順に最初に見つかった配列を返す。どれにも当てはまらなければ空。
pub fn extract_items(body: &Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items.clone(),
        Value::Object(map) => ITEM_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
            .cloned()
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// マージ済み検索結果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SearchResults {
    pub query:     String,
    pub resources: Vec<Value>,
    pub tools:     Vec<Value>,
    pub templates: Vec<Value>,
    pub total:     usize,
}

impl SearchResults {
    /// 3 種類の結果をマージする
    pub fn merge(
        query: impl Into<String>,
        resources: Vec<Value>,
        tools: Vec<Value>,
        templates: Vec<Value>,
    ) -> Self {
        let total = resources.len() + tools.len() + templates.len();
        Self {
            query: query.into(),
            resources,
            tools,
            templates,
            total,
        }
    }
}
