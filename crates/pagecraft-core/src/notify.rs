//! Transient notifications shown to the user, dismissed after a timeout.

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: Instant,
}

/// Queue of notifications, oldest first.
#[derive(Debug, Clone)]
pub struct Notifications {
    items: Vec<Notification>,
    ttl: Duration,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(Duration::from_millis(3000))
    }
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self {
            items: Vec::new(),
            ttl,
        }
    }

    pub fn push(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.push_at(kind, message, Instant::now());
    }

    pub fn push_at(&mut self, kind: NotificationKind, message: impl Into<String>, now: Instant) {
        self.items.push(Notification {
            kind,
            message: message.into(),
            created_at: now,
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NotificationKind::Info, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NotificationKind::Error, message);
    }

    /// Notifications still visible at `now`.
    pub fn active(&self, now: Instant) -> impl Iterator<Item = &Notification> {
        let ttl = self.ttl;
        self.items
            .iter()
            .filter(move |n| now.saturating_duration_since(n.created_at) < ttl)
    }

    /// Drop expired notifications.
    pub fn prune(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.items
            .retain(|n| now.saturating_duration_since(n.created_at) < ttl);
    }

    /// All queued notifications, including expired ones not yet pruned.
    pub fn all(&self) -> &[Notification] {
        &self.items
    }

    /// Most recent notification.
    pub fn latest(&self) -> Option<&Notification> {
        self.items.last()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
