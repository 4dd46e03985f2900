//! SMTP transport

use super::MessageTransport;
use crate::config::MailConfig;
use crate::error::{Error, Result};
use crate::render::EmailMessage;
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// Delivers messages over plain SMTP
///
/// One connection per message. No TLS: the server is expected to be a
/// local relay or catcher.
pub struct SmtpMailTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
    port: u16,
}

impl std::fmt::Debug for SmtpMailTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailTransport")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl SmtpMailTransport {
    /// Create a transport from mail settings
    pub fn new(config: &MailConfig) -> Self {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.smtp_host.as_str())
                .port(config.smtp_port)
                .timeout(Some(config.timeout));

        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        Self {
            mailer: builder.build(),
            host: config.smtp_host.clone(),
            port: config.smtp_port,
        }
    }

    /// `host:port` of the SMTP server
    pub fn server(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Build the MIME message for one part
fn build_message(message: &EmailMessage) -> Result<Message> {
    let from: Mailbox = message.from.parse().map_err(|e| {
        Error::Transport(format!("invalid sender address '{}': {}", message.from, e))
    })?;
    let to: Mailbox = message.to.parse().map_err(|e| {
        Error::Transport(format!("invalid recipient address '{}': {}", message.to, e))
    })?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(message.html.clone())
        .map_err(|e| Error::Transport(format!("failed to build message: {}", e)))
}

#[async_trait]
impl MessageTransport for SmtpMailTransport {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let email = build_message(message)?;

        AsyncTransport::send(&self.mailer, email)
            .await
            .map_err(|e| {
                Error::Transport(format!("SMTP delivery via {} failed: {}", self.server(), e))
            })?;

        tracing::debug!(
            server = %self.server(),
            to = %message.to,
            subject = %message.subject,
            "mail accepted by SMTP server"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}
