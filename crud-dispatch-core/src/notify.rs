//! User-facing notifications emitted by store actions
//!
//! The store never talks to UI components directly. It publishes
//! [`Notification`]s on a channel handed to it at construction, and whatever
//! renders alerts and dialogs listens on the other end.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertColor {
    Green,
    Red,
}

/// A named UI event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    /// Toast-style message
    Alert { text: String, color: AlertColor },
    /// Open/close the create/edit form dialog
    DialogForm(bool),
    /// Open/close the delete confirmation dialog
    DeleteDialog(bool),
}

impl Notification {
    pub fn success(text: impl Into<String>) -> Self {
        Notification::Alert {
            text: text.into(),
            color: AlertColor::Green,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notification::Alert {
            text: text.into(),
            color: AlertColor::Red,
        }
    }

    /// Event name as listeners know it.
    pub fn event_name(&self) -> &'static str {
        match self {
            Notification::Alert { .. } => "alert",
            Notification::DialogForm(_) => "handleDialogForm",
            Notification::DeleteDialog(_) => "handleDeleteDialog",
        }
    }
}

pub type NotificationSender = mpsc::UnboundedSender<Notification>;
pub type NotificationReceiver = mpsc::UnboundedReceiver<Notification>;

/// Create a notification channel.
pub fn channel() -> (NotificationSender, NotificationReceiver) {
    mpsc::unbounded_channel()
}

/// Sending half held by the store.
///
/// A dropped receiver is not an error: notifications are best-effort.
#[derive(Clone, Debug, Default)]
pub struct Notifier {
    tx: Option<NotificationSender>,
}

impl Notifier {
    pub fn new(tx: NotificationSender) -> Self {
        Self { tx: Some(tx) }
    }

    /// A notifier that drops everything.
    pub fn disconnected() -> Self {
        Self { tx: None }
    }

    pub fn send(&self, notification: Notification) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(notification).is_err() {
            tracing::debug!("Notification receiver dropped");
        }
    }
}

impl From<NotificationSender> for Notifier {
    fn from(tx: NotificationSender) -> Self {
        Self::new(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(Notification::success("ok").event_name(), "alert");
        assert_eq!(Notification::DialogForm(false).event_name(), "handleDialogForm");
        assert_eq!(
            Notification::DeleteDialog(false).event_name(),
            "handleDeleteDialog"
        );
    }

    #[test]
    fn test_notifier_delivers() {
        let (tx, mut rx) = channel();
        let notifier = Notifier::new(tx);

        notifier.send(Notification::error("boom"));

        assert_eq!(rx.try_recv().unwrap(), Notification::error("boom"));
    }

    #[test]
    fn test_notifier_survives_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        Notifier::new(tx).send(Notification::DialogForm(false));
        Notifier::disconnected().send(Notification::DialogForm(false));
    }
}
