//! HTTP mail relay transport
//!
//! Posts messages to a relay speaking the Mailpit send API
//! (`POST /api/v1/send`).

use super::MessageTransport;
use crate::config::MailConfig;
use crate::error::{Error, Result};
use crate::render::EmailMessage;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// Address object in the relay's JSON schema
#[derive(Debug, Serialize)]
struct Address<'a> {
    #[serde(rename = "Email")]
    email: &'a str,
}

/// Request body for the relay's send endpoint
#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    #[serde(rename = "From")]
    from: Address<'a>,
    #[serde(rename = "To")]
    to: Vec<Address<'a>>,
    #[serde(rename = "Subject")]
    subject: &'a str,
    #[serde(rename = "HTML")]
    html: &'a str,
}

/// Mail transport backed by an HTTP relay
#[derive(Clone, Debug)]
pub struct HttpMailTransport {
    client: reqwest::Client,
    endpoint: String,
    auth_header: Option<String>,
    timeout: Duration,
}

impl HttpMailTransport {
    /// Create a transport from mail settings
    pub fn new(config: &MailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            auth_header: config.auth_header.clone(),
            timeout: config.timeout,
        }
    }

    /// Relay endpoint messages are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MessageTransport for HttpMailTransport {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let body = SendRequest {
            from: Address {
                email: &message.from,
            },
            to: vec![Address { email: &message.to }],
            subject: &message.subject,
            html: &message.html,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);

        if let Some(auth) = &self.auth_header {
            request = request.header("Authorization", auth);
        }

        let response = match tokio::time::timeout(self.timeout, request.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                return Err(Error::Transport(format!(
                    "mail relay request to {} failed: {}",
                    self.endpoint, e
                )));
            }
            Err(_) => {
                return Err(Error::Transport(format!(
                    "mail relay at {} timed out after {:?}",
                    self.endpoint, self.timeout
                )));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!(
                "mail relay returned status {}: {}",
                status,
                detail.trim()
            )));
        }

        tracing::debug!(
            endpoint = %self.endpoint,
            to = %message.to,
            subject = %message.subject,
            "mail accepted by relay"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http-mail"
    }
}
