use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use super::{Email, MailError};
use crate::config::MailConfig;

const BASE_URL: &str = "https://api.postmarkapp.com";

/// Bounds a whole send. Must stay below `REQUEST_TIMEOUT_SECS`.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Postmark "send single email" client.
#[derive(Clone)]
pub struct PostmarkClient {
    inner: Arc<PostmarkClientInner>,
}

struct PostmarkClientInner {
    client: reqwest::Client,
    base_url: String,
    token: String,
    sender: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
}

impl PostmarkClient {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        Self::with_endpoint(config, BASE_URL, SEND_TIMEOUT)
    }

    fn with_endpoint(
        config: &MailConfig,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, MailError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(PostmarkClientInner {
                client,
                base_url: base_url.trim_end_matches('/').to_owned(),
                token: config.postmark_token.clone(),
                sender: config.sender.clone(),
            }),
        })
    }

    pub async fn send(&self, email: &Email) -> Result<(), MailError> {
        let request = SendEmailRequest {
            from: &self.inner.sender,
            to: &email.to,
            subject: &email.subject,
            html_body: &email.html_body,
            text_body: &email.text_body,
        };

        let response = self
            .inner
            .client
            .post(format!("{}/email", self.inner.base_url))
            .header("X-Postmark-Server-Token", &self.inner.token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let message = response.text().await.unwrap_or_default();
        Err(MailError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn config() -> MailConfig {
        MailConfig {
            postmark_token: "server-token".into(),
            sender: "shop@example.com".into(),
        }
    }

    fn email() -> Email {
        Email {
            to: "ann@example.com".into(),
            subject: "Payment Status Updated".into(),
            html_body: String::new(),
            text_body: String::new(),
        }
    }

    #[tokio::test]
    async fn stalled_provider_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and never answer.
        let server = tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });

        let client = PostmarkClient::with_endpoint(
            &config(),
            &format!("http://{addr}"),
            Duration::from_millis(200),
        )
        .unwrap();

        let started = std::time::Instant::now();
        let result = client.send(&email()).await;

        assert!(matches!(result, Err(MailError::Http(ref err)) if err.is_timeout()));
        assert!(started.elapsed() < Duration::from_secs(5));
        server.abort();
    }
}
