//! # 埋め込みブリッジ
//!
//! iframe として GrowthLab に埋め込まれたときに、親ウィンドウとの
//! メッセージングを担う。
//!
//! ## 送信
//!
//! 送信はすべて fire-and-forget。スタンドアロン時は何も送らない。
//!
//! ## トークン要求
//!
//! [`EmbedBridge::request_token`] は `REQUEST_TOKEN` を送って `TOKEN_RESPONSE` を待つ。
//! [`TOKEN_REQUEST_TIMEOUT`] 以内に応答がなければ `None` に解決する。
//! 応答待ちの間に重ねて呼ばれた要求は、次の 1 回の応答を共有する。
//!
//! ## 受信
//!
//! [`EmbedBridge::handle_incoming`] は送信元が `growthlab` で、かつ
//! オリジンが許可リストに含まれるメッセージだけを処理する。

use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use startup_resources_domain::{
    bridge::{
        AuthUpdate,
        BridgeEnvelope,
        BridgeError,
        BridgeMessage,
        BridgeSource,
        EmbeddedReady,
        Navigation,
        ResourceView,
        Theme,
        ToolUsage,
    },
    embed::{EmbedMode, ParentOrigins},
};
use tokio::sync::{broadcast, mpsc, oneshot, watch};

/// トークン要求のタイムアウト
pub const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

const NAVIGATION_CHANNEL_CAPACITY: usize = 16;

/// 親ウィンドウへの送信口
pub trait ParentWindow: Send + Sync {
    fn post(&self, envelope: BridgeEnvelope) -> Result<(), BridgeError>;
}

/// チャネルで親ウィンドウを表す実装
///
/// 受信側を持つホストが `postMessage` に中継する。テストでもこれを使う。
#[derive(Clone)]
pub struct ChannelParentWindow {
    sender: mpsc::UnboundedSender<BridgeEnvelope>,
}

impl ChannelParentWindow {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BridgeEnvelope>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl ParentWindow for ChannelParentWindow {
    fn post(&self, envelope: BridgeEnvelope) -> Result<(), BridgeError> {
        self.sender
            .send(envelope)
            .map_err(|_| BridgeError::ParentUnavailable)
    }
}

/// 親ウィンドウとのブリッジ
pub struct EmbedBridge {
    mode:          EmbedMode,
    parent:        Arc<dyn ParentWindow>,
    origins:       ParentOrigins,
    version:       String,
    token_waiters: Mutex<Vec<oneshot::Sender<Option<String>>>>,
    auth:          watch::Sender<Option<AuthUpdate>>,
    theme:         watch::Sender<Theme>,
    navigation:    broadcast::Sender<String>,
}

impl EmbedBridge {
    pub fn new(
        mode: EmbedMode,
        parent: Arc<dyn ParentWindow>,
        origins: ParentOrigins,
        version: impl Into<String>,
    ) -> Self {
        let (auth, _) = watch::channel(None);
        let (theme, _) = watch::channel(Theme::default());
        let (navigation, _) = broadcast::channel(NAVIGATION_CHANNEL_CAPACITY);
        Self {
            mode,
            parent,
            origins,
            version: version.into(),
            token_waiters: Mutex::new(Vec::new()),
            auth,
            theme,
            navigation,
        }
    }

    pub fn mode(&self) -> EmbedMode {
        self.mode
    }

    /// 埋め込み準備完了を親に通知する
    pub fn announce_ready(&self) {
        self.send(BridgeMessage::EmbeddedReady(EmbeddedReady {
            version: self.version.clone(),
        }));
    }

    /// 親にトークンを要求する
    ///
    /// スタンドアロン時は即座に `None`。
    pub async fn request_token(&self) -> Option<String> {
        if !self.mode.is_embedded() {
            return None;
        }

        let (respond_to, response) = oneshot::channel();
        let first = {
            let mut waiters = self
                .token_waiters
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            waiters.retain(|w| !w.is_closed());
            waiters.push(respond_to);
            waiters.len() == 1
        };
        if first {
            self.send(BridgeMessage::RequestToken);
        }

        match tokio::time::timeout(TOKEN_REQUEST_TIMEOUT, response).await {
            Ok(Ok(token)) => token,
            Ok(Err(_)) => None,
            Err(_) => {
                tracing::debug!("親ウィンドウからトークン応答がなくタイムアウト");
                None
            }
        }
    }

    /// 親ウィンドウからのメッセージを処理する
    ///
    /// 処理した場合はそのメッセージを返す。送信元やオリジンが不正なもの、
    /// アプリ側からしか送らない種別は無視して `None` を返す。
    pub fn handle_incoming(
        &self,
        envelope: BridgeEnvelope,
        origin: &str,
    ) -> Result<Option<BridgeMessage>, BridgeError> {
        if !envelope.is_from(BridgeSource::GrowthLab) {
            return Ok(None);
        }
        if !self.origins.allows(origin) {
            tracing::warn!(origin, "許可されていないオリジンからのメッセージを無視");
            return Ok(None);
        }

        let message = envelope.into_message()?;
        match &message {
            BridgeMessage::TokenResponse(response) => {
                let waiters = std::mem::take(
                    &mut *self
                        .token_waiters
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner),
                );
                for waiter in waiters {
                    let _ = waiter.send(response.token.clone());
                }
            }
            BridgeMessage::AuthUpdate(update) => {
                self.auth.send_replace(Some(update.clone()));
            }
            BridgeMessage::ThemeChange(change) => {
                self.theme.send_replace(change.theme);
            }
            BridgeMessage::Navigation(navigation) => {
                let _ = self.navigation.send(navigation.path.clone());
            }
            BridgeMessage::RequestToken
            | BridgeMessage::ResourceView(_)
            | BridgeMessage::ToolUsage(_)
            | BridgeMessage::EmbeddedReady(_) => return Ok(None),
        }
        Ok(Some(message))
    }

    /// アプリ内の遷移を親に通知する
    pub fn notify_navigation(&self, path: impl Into<String>) {
        self.send(BridgeMessage::Navigation(Navigation { path: path.into() }));
    }

    pub fn track_resource_view(&self, resource_id: impl Into<String>, title: Option<String>) {
        self.send(BridgeMessage::ResourceView(ResourceView {
            resource_id: resource_id.into(),
            title,
        }));
    }

    pub fn track_tool_usage(&self, tool_id: impl Into<String>, action: impl Into<String>) {
        self.send(BridgeMessage::ToolUsage(ToolUsage {
            tool_id: tool_id.into(),
            action:  action.into(),
        }));
    }

    pub fn subscribe_auth(&self) -> watch::Receiver<Option<AuthUpdate>> {
        self.auth.subscribe()
    }

    pub fn subscribe_theme(&self) -> watch::Receiver<Theme> {
        self.theme.subscribe()
    }

    /// 親から指示された遷移先を受け取る
    pub fn subscribe_navigation(&self) -> broadcast::Receiver<String> {
        self.navigation.subscribe()
    }

    fn send(&self, message: BridgeMessage) {
        if !self.mode.is_embedded() {
            return;
        }
        let message_type = message.message_type();
        let result = BridgeEnvelope::new(BridgeSource::StartupResources, &message)
            .and_then(|envelope| self.parent.post(envelope));
        if let Err(e) = result {
            tracing::warn!(bridge.message_type = %message_type, error = %e, "親ウィンドウへの送信に失敗");
        }
    }
}
