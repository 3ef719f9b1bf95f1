//! Notifications - the outcome channel from the coordinator to the UI.
//!
//! Every emitted [`Notification`] goes to three places:
//!
//! - tokio broadcast subscribers ([`Notifier::subscribe`]),
//! - callback listeners registered through event-emitter-rs
//!   ([`Notifier::on_notification`], feature `emitter`),
//! - the session history ([`Notifier::history`]).

mod notification;

use std::sync::{Arc, Mutex};

#[cfg(feature = "emitter")]
use event_emitter_rs::EventEmitter;
use tokio::sync::broadcast;

pub use notification::{Notification, NotificationKind};

/// Event name used on the emitter.
pub const NOTIFICATION_EVENT: &str = "notification";

const CHANNEL_CAPACITY: usize = 64;

struct NotifierInner {
    sender: broadcast::Sender<Notification>,
    history: Mutex<Vec<Notification>>,
    #[cfg(feature = "emitter")]
    emitter: Mutex<EventEmitter>,
}

/// Fan-out for notifications. Clones share the same channel and history.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(NotifierInner {
                sender,
                history: Mutex::new(Vec::new()),
                #[cfg(feature = "emitter")]
                emitter: Mutex::new(EventEmitter::new()),
            }),
        }
    }

    /// Receive every notification emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.inner.sender.subscribe()
    }

    /// Register a callback. The emitter runs callbacks on their own threads,
    /// so they fire shortly after `notify` returns, not during it.
    #[cfg(feature = "emitter")]
    pub fn on_notification<F>(&self, listener: F) -> Option<String>
    where
        F: Fn(Notification) + Send + Sync + 'static,
    {
        let mut emitter = self.inner.emitter.lock().ok()?;
        Some(emitter.on(NOTIFICATION_EVENT, listener))
    }

    pub fn notify(&self, notification: Notification) {
        if let Ok(mut history) = self.inner.history.lock() {
            history.push(notification.clone());
        }

        self.emit_to_listeners(&notification);

        // no receivers is fine
        let _ = self.inner.sender.send(notification);
    }

    #[cfg(feature = "emitter")]
    fn emit_to_listeners(&self, notification: &Notification) {
        if let Ok(mut emitter) = self.inner.emitter.lock() {
            emitter.emit(NOTIFICATION_EVENT, notification.clone());
        }
    }

    #[cfg(not(feature = "emitter"))]
    fn emit_to_listeners(&self, _notification: &Notification) {}

    pub fn success(&self, title: impl Into<String>, description: impl Into<String>) {
        self.notify(Notification::success(title, description));
    }

    pub fn error(&self, title: impl Into<String>, description: impl Into<String>) {
        self.notify(Notification::error(title, description));
    }

    /// Everything emitted this session, oldest first.
    pub fn history(&self) -> Vec<Notification> {
        self.inner
            .history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    pub fn clear_history(&self) {
        if let Ok(mut history) = self.inner.history.lock() {
            history.clear();
        }
    }
}
