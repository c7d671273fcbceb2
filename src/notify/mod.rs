//! Transactional email.
//!
//! [`Mailer`] delivers a single message synchronously. [`Notifier`] is the
//! fire-and-forget side: it queues messages for a worker that drains the
//! [`NotificationQueue`] and logs delivery failures.

mod messages;
mod postmark;
mod queue;

pub use messages::*;
pub use postmark::PostmarkClient;
pub use queue::{channel, NotificationQueue, Notifier};

use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::info;

use crate::config::MailConfig;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Mail provider rejected the message: {status} - {message}")]
    Api { status: u16, message: String },
}

#[derive(Clone)]
pub struct Mailer {
    transport: Transport,
}

#[derive(Clone)]
enum Transport {
    Postmark(PostmarkClient),
    /// No provider configured; messages only reach the log.
    Log,
    Recording(Outbox),
}

impl Mailer {
    pub fn postmark(config: &MailConfig) -> Result<Self, MailError> {
        Ok(Self {
            transport: Transport::Postmark(PostmarkClient::new(config)?),
        })
    }

    pub fn log_only() -> Self {
        Self {
            transport: Transport::Log,
        }
    }

    /// A mailer that keeps every message in memory instead of sending it.
    pub fn recording() -> (Self, Outbox) {
        let outbox = Outbox::default();
        (
            Self {
                transport: Transport::Recording(outbox.clone()),
            },
            outbox,
        )
    }

    pub async fn send(&self, email: &Email) -> Result<(), MailError> {
        match &self.transport {
            Transport::Postmark(client) => client.send(email).await,
            Transport::Log => {
                info!(to = %email.to, subject = %email.subject, "Mail provider disabled, skipping send");
                Ok(())
            }
            Transport::Recording(outbox) => {
                outbox.push(email.clone());
                Ok(())
            }
        }
    }
}

#[derive(Clone, Default)]
pub struct Outbox {
    sent: Arc<Mutex<Vec<Email>>>,
}

impl Outbox {
    fn push(&self, email: Email) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email);
        }
    }

    pub fn messages(&self) -> Vec<Email> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}
