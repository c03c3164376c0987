//! # トースト通知ストア
//!
//! アプリケーションシェルが所有する publish/subscribe 型の通知ストア。
//!
//! ## 振る舞い
//!
//! - [`ToastStore::show`] で追加したトーストは、表示中の件数に関係なく
//!   [`TOAST_TTL`] 経過後に自動で消える
//! - 購読者は [`ToastStore::subscribe`] の `watch::Receiver` で一覧の変化を受け取る
//! - ストアを破棄すると保留中のタイマーはすべて中止される
//!
//! タイマーはストア本体を `Weak` でしか参照しないため、
//! タイマーがストアの寿命を延ばすことはない。

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError, Weak},
    time::Duration,
};

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::Serialize;
use tokio::{sync::watch, task::JoinHandle};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};

/// 自動消去までの時間
pub const TOAST_TTL: Duration = Duration::from_secs(3);

/// トースト ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[display("{_0}")]
pub struct ToastId(Uuid);

impl ToastId {
    fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

/// トーストの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

/// トースト
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Toast {
    pub id:         ToastId,
    pub kind:       ToastKind,
    pub message:    String,
    pub created_at: DateTime<Utc>,
}

struct Inner {
    toasts: watch::Sender<Vec<Toast>>,
    timers: Mutex<HashMap<ToastId, JoinHandle<()>>>,
    clock:  Box<dyn Clock>,
    ttl:    Duration,
}

impl Inner {
    fn remove(&self, id: ToastId) -> bool {
        let mut removed = false;
        self.toasts.send_if_modified(|toasts| {
            let before = toasts.len();
            toasts.retain(|t| t.id != id);
            removed = toasts.len() != before;
            removed
        });
        removed
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let timers = self.timers.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, timer) in timers.drain() {
            timer.abort();
        }
    }
}

/// トースト通知ストア
///
/// `show` はタイマーを spawn するため tokio ランタイム内で呼ぶこと。
pub struct ToastStore {
    inner: Arc<Inner>,
}

impl ToastStore {
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock), TOAST_TTL)
    }

    pub fn with_clock(clock: Box<dyn Clock>, ttl: Duration) -> Self {
        let (toasts, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                toasts,
                timers: Mutex::new(HashMap::new()),
                clock,
                ttl,
            }),
        }
    }

    /// トーストを表示し、自動消去タイマーを開始する
    pub fn show(&self, kind: ToastKind, message: impl Into<String>) -> ToastId {
        let toast = Toast {
            id: ToastId::new(),
            kind,
            message: message.into(),
            created_at: self.inner.clock.now(),
        };
        let id = toast.id;

        self.inner.toasts.send_modify(|toasts| toasts.push(toast));

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let ttl = self.inner.ttl;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(inner) = weak.upgrade() {
                inner
                    .timers
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .remove(&id);
                inner.remove(id);
            }
        });

        self.inner
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, timer);

        tracing::debug!(toast.id = %id, toast.kind = ?kind, "トーストを表示");
        id
    }

    pub fn success(&self, message: impl Into<String>) -> ToastId {
        self.show(ToastKind::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> ToastId {
        self.show(ToastKind::Error, message)
    }

    /// トーストを即座に消す
    ///
    /// 既に消えている ID なら何もせず `false` を返す。
    pub fn dismiss(&self, id: ToastId) -> bool {
        if let Some(timer) = self
            .inner
            .timers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
        {
            timer.abort();
        }
        self.inner.remove(id)
    }

    /// 現在表示中のトースト
    pub fn snapshot(&self) -> Vec<Toast> {
        self.inner.toasts.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.inner.toasts.subscribe()
    }
}

impl Default for ToastStore {
    fn default() -> Self {
        Self::new()
    }
}
