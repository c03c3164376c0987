//! # アプリケーションシェル
//!
//! ブラウザ側のアプリケーションシェルが持つ状態を、UI から切り離して実装する。
//!
//! - [`bridge`] - 親ウィンドウ（GrowthLab）とのメッセージング
//! - [`toast`] - トースト通知ストア
//! - [`clock`] - 時刻プロバイダ
//!
//! いずれも tokio ランタイム上で動作する。タイマーは `tokio::time` を使うため、
//! テストでは一時停止したクロックで時間経過を再現できる。

pub mod bridge;
pub mod clock;
pub mod toast;

pub use bridge::{ChannelParentWindow, EmbedBridge, ParentWindow};
pub use toast::{Toast, ToastId, ToastKind, ToastStore};
