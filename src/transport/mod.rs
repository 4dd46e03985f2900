//! Outbound mail transport
//!
//! Two transports are available: [`SmtpMailTransport`] talks SMTP directly
//! (the default, pointed at a local catcher on port 1025), and
//! [`HttpMailTransport`] posts to an HTTP relay. Every failure mode
//! (connection, timeout, rejection) collapses into [`Error::Transport`]:
//! the pipeline does not distinguish between them.
//!
//! [`Error::Transport`]: crate::Error::Transport

use crate::config::{MailConfig, MailTransportKind};
use crate::error::Result;
use crate::render::EmailMessage;
use async_trait::async_trait;

mod http;
mod smtp;

pub use http::HttpMailTransport;
pub use smtp::SmtpMailTransport;

/// Sends one rendered message
#[async_trait]
pub trait MessageTransport: Send + Sync + 'static {
    /// Deliver `message`, returning once the server accepted it
    async fn send(&self, message: &EmailMessage) -> Result<()>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// The transport selected by configuration
#[derive(Debug)]
pub enum MailTransport {
    /// Direct SMTP delivery
    Smtp(SmtpMailTransport),
    /// HTTP relay
    Http(HttpMailTransport),
}

impl MailTransport {
    /// Build the transport named by `config.transport`
    pub fn from_config(config: &MailConfig) -> Self {
        match config.transport {
            MailTransportKind::Smtp => Self::Smtp(SmtpMailTransport::new(config)),
            MailTransportKind::Http => Self::Http(HttpMailTransport::new(config)),
        }
    }

    /// Where messages go, for logs
    pub fn destination(&self) -> String {
        match self {
            Self::Smtp(smtp) => format!("smtp://{}", smtp.server()),
            Self::Http(http) => http.endpoint().to_string(),
        }
    }
}

#[async_trait]
impl MessageTransport for MailTransport {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        match self {
            Self::Smtp(smtp) => smtp.send(message).await,
            Self::Http(http) => http.send(message).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Smtp(smtp) => smtp.name(),
            Self::Http(http) => http.name(),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_selects_smtp() {
        let transport = MailTransport::from_config(&MailConfig::default());

        assert!(matches!(transport, MailTransport::Smtp(_)));
        assert_eq!(transport.name(), "smtp");
        assert_eq!(transport.destination(), "smtp://localhost:1025");
    }

    #[test]
    fn test_http_kind_selects_relay() {
        let config = MailConfig {
            transport: MailTransportKind::Http,
            ..MailConfig::default()
        };

        let transport = MailTransport::from_config(&config);

        assert_eq!(transport.name(), "http-mail");
        assert_eq!(transport.destination(), "http://localhost:8025/api/v1/send");
    }
}
