//! # 横断検索ハンドラ
//!
//! `GET /api/search?q=` を受け、リソース・ツール・テンプレートの 3 つの検索
//! エンドポイントへ並行に問い合わせて 1 つの結果にまとめる。
//!
//! 個々の問い合わせの失敗はレスポンス全体を失敗させず、その種別を空配列として扱う。

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, RawQuery, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::Value;
use startup_resources_domain::{
    auth::BearerToken,
    search::{SearchKind, SearchResults, extract_items},
};
use startup_resources_shared::{
    ErrorResponse,
    event_log::{error, event},
    log_business_event,
};
use utoipa::IntoParams;

use super::catalog::CatalogState;
use crate::{
    client::PlatformCatalogClient,
    error::validation_error_response,
    middleware::extract_token,
};

/// 検索クエリ
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// 検索キーワード（必須、空白のみは不可）
    pub q: Option<String>,
}

/// GET /api/search
#[utoipa::path(
   get,
   path = "/api/search",
   tag = "search",
   security((), ("bearer_auth" = [])),
   params(SearchParams),
   responses(
      (status = 200, description = "マージ済み検索結果", body = SearchResults),
      (status = 400, description = "検索キーワードなし", body = ErrorResponse)
   )
)]
#[tracing::instrument(skip_all)]
pub async fn search(
    State(state): State<Arc<CatalogState>>,
    Query(params): Query<SearchParams>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    let Some(query) = params.q.filter(|q| !q.trim().is_empty()) else {
        return validation_error_response("検索キーワード q は必須です");
    };
    let token = extract_token(&headers, &jar);
    let client = state.catalog_client.as_ref();
    let raw_query = raw_query.as_deref();

    let (resources, tools, templates) = tokio::join!(
        fetch_items(client, SearchKind::Resources, raw_query, token.as_ref()),
        fetch_items(client, SearchKind::Tools, raw_query, token.as_ref()),
        fetch_items(client, SearchKind::Templates, raw_query, token.as_ref()),
    );
    let outcome = if resources.is_some() && tools.is_some() && templates.is_some() {
        event::result::SUCCESS
    } else {
        event::result::PARTIAL
    };

    let results = SearchResults::merge(
        query,
        resources.unwrap_or_default(),
        tools.unwrap_or_default(),
        templates.unwrap_or_default(),
    );

    log_business_event!(
        event.category = event::category::CATALOG,
        event.action = event::action::SEARCH_EXECUTED,
        event.result = outcome,
        search.total = results.total,
        "横断検索を実行"
    );

    Json(results).into_response()
}

/// 1 種別分の検索結果を取り出す。失敗時は `None`
async fn fetch_items(
    client: &dyn PlatformCatalogClient,
    kind: SearchKind,
    raw_query: Option<&str>,
    token: Option<&BearerToken>,
) -> Option<Vec<Value>> {
    match client.search(kind, raw_query, token).await {
        Ok(upstream) => Some(extract_items(&upstream.body)),
        Err(e) => {
            tracing::warn!(
                error.category = error::category::EXTERNAL_SERVICE,
                error.kind = error::kind::SEARCH_FANOUT,
                search.kind = %kind,
                "検索の問い合わせに失敗したため空として扱う: {}",
                e
            );
            None
        }
    }
}
