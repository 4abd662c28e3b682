//! Transient status notifications.
//!
//! Any component may post a notification; each one is dismissed automatically
//! after the configured TTL when a tokio runtime is available.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::config::DEFAULT_NOTIFY_TTL;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    Shown(Notification),
    Dismissed(u64),
}

struct Inner {
    next_id: AtomicU64,
    active: Mutex<Vec<Notification>>,
    events: broadcast::Sender<NotificationEvent>,
    ttl: Duration,
    shutdown: CancellationToken,
}

impl Inner {
    fn active(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn dismiss(&self, id: u64) -> bool {
        let removed = {
            let mut active = self.active();
            let before = active.len();
            active.retain(|n| n.id != id);
            active.len() != before
        };
        if removed {
            let _ = self.events.send(NotificationEvent::Dismissed(id));
        }
        removed
    }
}

/// Cheap to clone; all clones share the same notifications.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFY_TTL)
    }
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                next_id: AtomicU64::new(1),
                active: Mutex::new(Vec::new()),
                events,
                ttl,
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Posts a notification and schedules its dismissal. Returns its id.
    pub fn notify(&self, level: NotificationLevel, message: impl Into<String>) -> u64 {
        let notification = Notification {
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed),
            level,
            message: message.into(),
            created_at: SystemTime::now(),
        };
        let id = notification.id;

        #[cfg(feature = "tracing")]
        tracing::debug!("notification {} ({:?}): {}", id, level, notification.message);

        self.inner.active().push(notification.clone());
        let _ = self.inner.events.send(NotificationEvent::Shown(notification));

        // Without a runtime the notification stays until dismissed by hand.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let inner = Arc::clone(&self.inner);
            let token = self.inner.shutdown.clone();
            handle.spawn(async move {
                tokio::select! {
                    _ = tokio::time::sleep(inner.ttl) => {
                        inner.dismiss(id);
                    }
                    _ = token.cancelled() => {}
                }
            });
        }

        id
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.notify(NotificationLevel::Info, message)
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.notify(NotificationLevel::Success, message)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.notify(NotificationLevel::Error, message)
    }

    /// Removes a notification. Returns `false` if it was already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        self.inner.dismiss(id)
    }

    /// Currently visible notifications, oldest first.
    pub fn active(&self) -> Vec<Notification> {
        self.inner.active().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.inner.events.subscribe()
    }

    /// Stops all pending auto-dismiss timers.
    pub fn shutdown(&self) {
        self.inner.shutdown.cancel();
    }
}

impl std::fmt::Debug for NotificationCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCenter")
            .field("ttl", &self.inner.ttl)
            .field("active", &self.inner.active().len())
            .finish()
    }
}


#[cfg(all(test, feature = "async"))]
mod async_tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_auto_dismiss_after_ttl() {
        let center = NotificationCenter::new(Duration::from_millis(3000));
        center.info("Password copied");
        assert_eq!(center.active().len(), 1);

        tokio::time::sleep(Duration::from_millis(2999)).await;
        assert_eq!(center.active().len(), 1);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(center.active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_timers() {
        let center = NotificationCenter::new(Duration::from_millis(100));
        center.error("Scan failed");
        center.shutdown();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(center.active().len(), 1);
    }

    #[tokio::test]
    async fn test_events_are_broadcast() {
        let center = NotificationCenter::new(Duration::from_secs(60));
        let mut rx = center.subscribe();

        let id = center.success("done");
        match rx.recv().await.expect("shown event") {
            NotificationEvent::Shown(n) => assert_eq!(n.id, id),
            other => panic!("Expected Shown, got {:?}", other),
        }

        center.dismiss(id);
        assert_eq!(
            rx.recv().await.expect("dismissed event"),
            NotificationEvent::Dismissed(id)
        );
        center.shutdown();
    }
}
