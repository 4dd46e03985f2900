//! Configuration types for quiz-report

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf, time::Duration};
use utoipa::ToSchema;

pub use crate::pagination::{MAX_PAGE_SIZE, PageSize};

/// Report rendering and pagination configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportConfig {
    /// Attempts per page / per email part (default: 10, at most 10)
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Title printed at the top of every report and email
    #[serde(default = "default_report_title")]
    pub title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            title: default_report_title(),
        }
    }
}

/// How email parts leave the service
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MailTransportKind {
    /// Plain SMTP to `smtp_host:smtp_port`
    #[default]
    Smtp,
    /// JSON POST to a Mailpit-compatible HTTP `endpoint`
    Http,
}

/// Mail delivery configuration for the multi-part email path
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MailConfig {
    /// Transport used for every part (default: smtp)
    #[serde(default)]
    pub transport: MailTransportKind,

    /// SMTP server host (default: "localhost")
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP server port (default: 1025)
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username; used only together with `smtp_password`
    #[serde(default)]
    pub smtp_username: Option<String>,

    /// SMTP password
    #[serde(default)]
    pub smtp_password: Option<String>,

    /// HTTP send endpoint of the mail relay (Mailpit-compatible)
    #[serde(default = "default_mail_endpoint")]
    pub endpoint: String,

    /// Sender address
    #[serde(default = "default_mail_from")]
    pub from: String,

    /// Optional authentication header value for the HTTP relay
    #[serde(default)]
    pub auth_header: Option<String>,

    /// Timeout for each send (default: 30 seconds)
    #[serde(default = "default_mail_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: MailTransportKind::default(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            endpoint: default_mail_endpoint(),
            from: default_mail_from(),
            auth_header: None,
            timeout: default_mail_timeout(),
        }
    }
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PersistenceConfig {
    /// Database path (default: "./quiz-report.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:8080)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// Main configuration for the report service
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// Data storage
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Report rendering and pagination
    #[serde(default)]
    pub report: ReportConfig,

    /// Mail relay for the email path
    #[serde(default)]
    pub mail: MailConfig,

    /// REST API
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from a JSON file and validate it
    ///
    /// Missing fields fall back to their defaults.
    pub async fn from_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| Error::Config {
            message: format!("failed to read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&raw).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<()> {
        self.page_size()?;

        match self.mail.transport {
            MailTransportKind::Smtp => {
                if self.mail.smtp_host.trim().is_empty() {
                    return Err(Error::Config {
                        message: "SMTP host must not be empty".into(),
                        key: Some("mail.smtp_host".into()),
                    });
                }
                if self.mail.smtp_port == 0 {
                    return Err(Error::Config {
                        message: "SMTP port must be greater than zero".into(),
                        key: Some("mail.smtp_port".into()),
                    });
                }
            }
            MailTransportKind::Http => {
                let endpoint = url::Url::parse(&self.mail.endpoint).map_err(|e| Error::Config {
                    message: format!("invalid mail endpoint '{}': {}", self.mail.endpoint, e),
                    key: Some("mail.endpoint".into()),
                })?;
                if !matches!(endpoint.scheme(), "http" | "https") {
                    return Err(Error::Config {
                        message: format!(
                            "mail endpoint must be http or https, got '{}'",
                            endpoint.scheme()
                        ),
                        key: Some("mail.endpoint".into()),
                    });
                }
            }
        }

        self.mail
            .from
            .parse::<lettre::message::Mailbox>()
            .map_err(|e| Error::Config {
                message: format!("invalid mail sender address '{}': {}", self.mail.from, e),
                key: Some("mail.from".into()),
            })?;

        if self.mail.timeout.is_zero() {
            return Err(Error::Config {
                message: "mail timeout must be greater than zero".into(),
                key: Some("mail.timeout".into()),
            });
        }

        Ok(())
    }

    /// The validated page size
    pub fn page_size(&self) -> Result<PageSize> {
        PageSize::new(self.report.page_size)
    }
}

// Default value functions
fn default_page_size() -> usize {
    MAX_PAGE_SIZE
}

fn default_report_title() -> String {
    "Detailed Quiz Report".into()
}

fn default_smtp_host() -> String {
    "localhost".into()
}

fn default_smtp_port() -> u16 {
    1025
}

fn default_mail_endpoint() -> String {
    "http://localhost:8025/api/v1/send".into()
}

fn default_mail_from() -> String {
    "quiz-system@university.com".into()
}

fn default_mail_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_database_path() -> PathBuf {
    PathBuf::from("quiz-report.db")
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

fn default_true() -> bool {
    true
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
