//! Top-level report service wiring.

use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::pipeline::{EVENT_CHANNEL_CAPACITY, ReportPipeline};
use crate::render::{ReportDocument, ReportTemplate};
use crate::service::{EmailService, ReportService};
use crate::transport::{MailTransport, MessageTransport};
use crate::types::{DispatchSummary, Event, SessionId};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Main report service instance (cloneable - all fields are Arc-wrapped)
///
/// Owns the database, the shared event channel and both delivery paths.
/// Both paths publish pipeline events to the same channel.
#[derive(Clone)]
pub struct QuizReporter {
    /// Database instance, public so fixtures and integration tests can seed it
    pub db: Arc<Database>,
    pub(crate) event_tx: broadcast::Sender<Event>,
    pub(crate) config: Arc<Config>,
    reports: Arc<ReportService<Database>>,
    emails: Arc<EmailService<Database, MailTransport>>,
}

impl QuizReporter {
    /// Validate `config`, open the database and build both services
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let db = Database::new(&config.persistence.database_path).await?;
        Self::with_database(db, config)
    }

    /// Build the services over an already-open database
    pub fn with_database(db: Database, config: Config) -> Result<Self> {
        let page_size = config.page_size()?;
        let db = Arc::new(db);
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let template = Arc::new(ReportTemplate::new(&config.report, &config.mail));
        let pipeline = ReportPipeline::with_events(Arc::clone(&db), page_size, event_tx.clone());
        let transport = Arc::new(MailTransport::from_config(&config.mail));

        tracing::info!(
            page_size = page_size.get(),
            mail_transport = transport.name(),
            mail_destination = %transport.destination(),
            "Report service ready"
        );

        Ok(Self {
            db,
            event_tx,
            config: Arc::new(config),
            reports: Arc::new(ReportService::new(pipeline.clone(), Arc::clone(&template))),
            emails: Arc::new(EmailService::new(pipeline, template, transport)),
        })
    }

    /// Subscribe to pipeline events from both delivery paths
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// The active configuration
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Assemble the report content for a session without encoding it
    pub async fn compose_report(&self, id: &SessionId) -> Result<ReportDocument> {
        self.reports.compose_report(id).await
    }

    /// Render the full report for a session as PDF bytes
    pub async fn generate_report(&self, id: &SessionId) -> Result<Vec<u8>> {
        self.reports.generate_report(id).await
    }

    /// Email the report to the session's owner, one message per page
    pub async fn send_report(&self, id: &SessionId) -> Result<DispatchSummary> {
        self.emails.send_report(id).await
    }

    /// Close the database pool
    ///
    /// In-flight queries finish first; later calls fail with a database error.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Shutting down report service");
        self.db.close().await;
        tracing::info!("Shutdown complete");
        Ok(())
    }

    /// Spawn the REST API server in a background task
    ///
    /// The task runs until aborted or until the server fails.
    pub fn spawn_api_server(&self) -> tokio::task::JoinHandle<Result<()>> {
        let reporter = Arc::new(self.clone());
        let config = Arc::clone(&self.config);
        tokio::spawn(async move {
            crate::api::start_api_server(reporter, config, std::future::pending()).await
        })
    }
}
