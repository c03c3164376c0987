//! # OpenAPI 仕様定義
//!
//! utoipa を使用して BFF の OpenAPI 仕様を Rust の型から自動生成する。
//! `ApiDoc::openapi()` で OpenAPI ドキュメントを取得できる。
//!
//! 上流 Platform API のボディをそのまま中継するエンドポイントは、レスポンスの
//! 形を BFF が保証しないためスキーマを付けていない。

use utoipa::{
    Modify,
    OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};

use crate::handler::{auth, catalog, health, search, user};

#[derive(OpenApi)]
#[openapi(
   info(
      title = "Startup Resources BFF API",
      version = "0.1.0",
      description = "Startup Resources（単体表示 / GrowthLab 埋め込み）の BFF API"
   ),
   paths(
      // health
      health::health_check,
      health::readiness_check,
      // auth
      auth::verify,
      auth::context,
      // resources
      catalog::list_resources,
      catalog::get_resource,
      // tools
      catalog::list_tools,
      catalog::get_tool,
      // search
      search::search,
      // user
      user::get_profile,
      user::update_profile,
      user::get_progress,
      user::record_progress,
   ),
   components(schemas(
      startup_resources_shared::ErrorResponse,
      startup_resources_domain::auth::AuthContext,
      startup_resources_domain::search::SearchResults,
      startup_resources_domain::progress::ProgressUpdateRequest,
      startup_resources_domain::progress::ProgressStatus,
      catalog::UserContextFlags,
   )),
   tags(
      (name = "health", description = "ヘルスチェック"),
      (name = "auth", description = "認証"),
      (name = "resources", description = "リソース"),
      (name = "tools", description = "ツール"),
      (name = "search", description = "横断検索"),
      (name = "user", description = "ログインユーザー"),
   ),
   modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// セキュリティスキーム定義
///
/// Bearer トークン認証を追加する。Cookie `auth_token` でも同じトークンを受け付けるが、
/// ドキュメント上は Bearer に一本化している。
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
