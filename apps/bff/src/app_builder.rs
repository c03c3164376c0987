//! # BFF アプリケーション構築
//!
//! クライアント・State の組み立てとルーター構築を担当する。
//! `main.rs` は設定読み込みとサーバー起動に集中する。
//!
//! 統合テストからモックの上流に向けたクライアントを渡して同じルーターを
//! 組み立てられるよう、ライブラリ側に置いている。

use std::sync::Arc;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use startup_resources_shared::{
    canonical_log::CanonicalLogLineLayer,
    observability::{MakeRequestUuidV7, make_request_span},
};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::{
    client::PlatformApiClient,
    config::BffConfig,
    handler::{
        AuthState,
        CatalogState,
        ReadinessState,
        UserState,
        context,
        get_profile,
        get_progress,
        get_resource,
        get_tool,
        health_check,
        list_resources,
        list_tools,
        readiness_check,
        record_progress,
        search,
        update_profile,
        verify,
    },
    middleware::{
        FrameAncestorsState,
        frame_ancestors,
        no_cache,
        request_id::store_request_id,
        require_bearer_token,
    },
};

/// State の組み立てとルーター定義を行う
///
/// クライアントは具象型で受け取り、各 State 注入時に必要なトレイトオブジェクトへ
/// coerce する。
pub fn build_app<C>(config: &BffConfig, client: Arc<C>) -> Router
where
    C: PlatformApiClient + 'static,
{
    let readiness_state = Arc::new(ReadinessState {
        health_client: client.clone(),
        timeout:       config.health_check_timeout,
    });
    let auth_state = Arc::new(AuthState {
        auth_client: client.clone(),
    });
    let catalog_state = Arc::new(CatalogState {
        catalog_client:      client.clone(),
        enrich_user_context: config.enrich_user_context,
    });
    let user_state = Arc::new(UserState {
        user_client: client,
    });
    let frame_ancestors_state = FrameAncestorsState::new(&config.parent_origins);

    // トークン必須のルートは上流を呼ぶ前に 401 を返す
    let auth_routes = Router::new()
        .route(
            "/api/auth/verify",
            get(verify).layer(from_fn(require_bearer_token)),
        )
        .route("/api/auth/context", get(context))
        .with_state(auth_state);

    let catalog_routes = Router::new()
        .route("/api/resources", get(list_resources))
        .route("/api/resources/{id}", get(get_resource))
        .route("/api/tools", get(list_tools))
        .route("/api/tools/{id}", get(get_tool))
        .route("/api/search", get(search))
        .with_state(catalog_state);

    let user_routes = Router::new()
        .route("/api/user/profile", get(get_profile).put(update_profile))
        .route(
            "/api/user/progress",
            get(get_progress).post(record_progress),
        )
        .layer(from_fn(require_bearer_token))
        .with_state(user_state);

    // キャッシュ制御: 動的 API レスポンスがブラウザにキャッシュされないようにする
    let api_routes = Router::new()
        .merge(auth_routes)
        .merge(catalog_routes)
        .merge(user_routes)
        .layer(from_fn(no_cache));

    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .with_state(readiness_state)
        .merge(api_routes)
        .layer(from_fn_with_state(frame_ancestors_state, frame_ancestors))
        // Request ID レイヤー（レイヤー順序が重要: 下に書いたものが外側）
        // 1. SetRequestIdLayer（最外）: リクエスト受信時に UUID v7 を生成（またはクライアント提供値を使用）
        // 2. TraceLayer: カスタムスパンに request_id を含め、全ログに自動注入
        // 3. CanonicalLogLineLayer: リクエストごとに 1 行のサマリーログを出す
        // 4. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
        // 5. store_request_id: task-local に保存し、上流へのヘッダー伝播に使用
        .layer(from_fn(store_request_id))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CanonicalLogLineLayer)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}
