//! # ビジネスイベントログとエラーコンテキストの構造化ヘルパー
//!
//! `jq` でフィルタしやすいよう、ログフィールドの命名規約と出力マクロを提供する。
//!
//! - ビジネスイベント: [`log_business_event!`] で出力し、
//!   `event.kind = "business_event"` が自動付与される
//! - エラー: `tracing::error!` に `error.category` と `error.kind` を付ける
//!
//! フィールド名はドット記法（`event.action`、`error.kind`）で統一する。

/// ビジネスイベントを構造化ログとして出力する
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: [`event::category`] の定数
/// - `event.action`: [`event::action`] の定数
/// - `event.result`: [`event::result`] の定数
///
/// ## 推奨フィールド
///
/// - `event.entity_id`: 対象リソースの ID
/// - `event.embedded`: 埋め込みモードかどうか
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const AUTH: &str = "auth";
        pub const CATALOG: &str = "catalog";
        pub const PROGRESS: &str = "progress";
    }

    /// イベントアクション
    pub mod action {
        pub const TOKEN_VERIFIED: &str = "auth.token_verified";
        pub const TOKEN_REJECTED: &str = "auth.token_rejected";
        pub const SEARCH_EXECUTED: &str = "catalog.search_executed";
        pub const PROGRESS_RECORDED: &str = "progress.recorded";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const PARTIAL: &str = "partial";
        pub const FAILURE: &str = "failure";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// 上流 Platform API の呼び出し
        pub const EXTERNAL_SERVICE: &str = "external_service";
        /// 設定・起動処理
        pub const CONFIGURATION: &str = "configuration";
    }

    /// エラー種別
    pub mod kind {
        pub const UPSTREAM_COMMUNICATION: &str = "upstream_communication";
        pub const UPSTREAM_RESPONSE: &str = "upstream_response";
        pub const SEARCH_FANOUT: &str = "search_fanout";
    }
}
