//! Transient notifications
//!
//! The controller reports short-lived messages ("Task created", "Copied!")
//! through a [`Notifier`]. The TUI shows them as a toast.

use std::sync::Mutex;
use tokio::sync::mpsc;

/// Success or failure, drives the toast colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Success,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: NotificationKind::Failure,
        }
    }
}

/// Sink for transient notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, kind: NotificationKind);
}

/// Forwards notifications over an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, message: &str, kind: NotificationKind) {
        // Receiver gone means the page is shutting down.
        let _ = self.tx.send(Notification {
            message: message.to_string(),
            kind,
        });
    }
}

/// Keeps every notification in memory
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<Notification> {
        self.seen.lock().ok().and_then(|s| s.last().cloned())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, kind: NotificationKind) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(Notification {
                message: message.to_string(),
                kind,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_notifier_delivers() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify("Copied!", NotificationKind::Success);

        let got = rx.recv().await.unwrap();
        assert_eq!(got, Notification::success("Copied!"));
    }

    #[test]
    fn test_channel_notifier_ignores_closed_receiver() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify("late", NotificationKind::Failure);
    }

    #[test]
    fn test_recording_notifier() {
        let notifier = RecordingNotifier::new();
        notifier.notify("a", NotificationKind::Success);
        notifier.notify("b", NotificationKind::Failure);

        assert_eq!(notifier.notifications().len(), 2);
        assert_eq!(notifier.last(), Some(Notification::failure("b")));
    }
}
