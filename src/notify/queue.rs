use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::{Email, Mailer};

/// Sending half, cloned into every handler that fires notifications.
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Email>,
}

pub struct NotificationQueue {
    rx: mpsc::UnboundedReceiver<Email>,
}

pub fn channel() -> (Notifier, NotificationQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Notifier { tx }, NotificationQueue { rx })
}

impl Notifier {
    /// Queues the message and returns immediately.
    pub fn dispatch(&self, email: Email) {
        if let Err(err) = self.tx.send(email) {
            warn!(to = %err.0.to, subject = %err.0.subject, "Notification worker is gone, dropping message");
        }
    }
}

impl NotificationQueue {
    pub async fn recv(&mut self) -> Option<Email> {
        self.rx.recv().await
    }

    /// Takes the next queued message without waiting.
    pub fn try_recv(&mut self) -> Option<Email> {
        self.rx.try_recv().ok()
    }

    /// Delivers queued messages until every `Notifier` is dropped.
    pub async fn run(mut self, mailer: Mailer) {
        while let Some(email) = self.rx.recv().await {
            match mailer.send(&email).await {
                Ok(()) => info!(to = %email.to, subject = %email.subject, "Notification sent"),
                Err(err) => error!(
                    to = %email.to,
                    subject = %email.subject,
                    error = %err,
                    "Failed to send notification"
                ),
            }
        }
    }
}
