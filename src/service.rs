//! Report services: one downloadable document, or one email per page
//!
//! Both services run the same [`ReportPipeline`]; they differ only in the
//! producer they hand it and the delivery mode they ask for.

use crate::error::{Error, Result};
use crate::pagination::Page;
use crate::pipeline::{ReportPipeline, UnitProducer};
use crate::render::{ReportDocument, ReportTemplate, Section};
use crate::store::RecordStore;
use crate::transport::MessageTransport;
use crate::types::{AttemptRecord, DispatchSummary, SessionId, SessionRecord};
use async_trait::async_trait;
use std::sync::Arc;

/// A store serving quiz sessions and their attempts
pub trait QuizStore:
    RecordStore<Key = SessionId, Session = SessionRecord, Record = AttemptRecord>
{
}

impl<T> QuizStore for T where
    T: RecordStore<Key = SessionId, Session = SessionRecord, Record = AttemptRecord>
{
}

/// Renders one document section per page
pub struct SectionProducer {
    template: Arc<ReportTemplate>,
}

impl SectionProducer {
    /// Create a producer rendering with `template`
    pub fn new(template: Arc<ReportTemplate>) -> Self {
        Self { template }
    }
}

#[async_trait]
impl UnitProducer<SessionRecord, AttemptRecord> for SectionProducer {
    type Output = Section;

    async fn produce(&self, session: &SessionRecord, page: &Page<AttemptRecord>) -> Result<Section> {
        Ok(self.template.render_section(session, page))
    }

    fn name(&self) -> &'static str {
        "section"
    }
}

/// Renders one email per page and hands it to a transport
pub struct EmailProducer<T: MessageTransport> {
    template: Arc<ReportTemplate>,
    transport: Arc<T>,
}

impl<T: MessageTransport> EmailProducer<T> {
    /// Create a producer sending through `transport`
    pub fn new(template: Arc<ReportTemplate>, transport: Arc<T>) -> Self {
        Self {
            template,
            transport,
        }
    }
}

#[async_trait]
impl<T: MessageTransport> UnitProducer<SessionRecord, AttemptRecord> for EmailProducer<T> {
    type Output = ();

    async fn produce(&self, session: &SessionRecord, page: &Page<AttemptRecord>) -> Result<()> {
        let message = self.template.render_email(session, page);
        self.transport.send(&message).await?;

        tracing::debug!(
            session_id = %session.session_id,
            page = page.number(),
            pages = page.count(),
            transport = self.transport.name(),
            "Report part sent"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "email"
    }
}

/// Produces the single-document report
pub struct ReportService<S: QuizStore> {
    pipeline: ReportPipeline<S>,
    template: Arc<ReportTemplate>,
}

impl<S: QuizStore> ReportService<S> {
    /// Create a service over `pipeline`
    pub fn new(pipeline: ReportPipeline<S>, template: Arc<ReportTemplate>) -> Self {
        Self { pipeline, template }
    }

    /// Assemble the full report for a session
    ///
    /// Every page must render; a session without attempts yields a document
    /// with an empty question list.
    ///
    /// # Errors
    ///
    /// [`crate::Error::NotFound`], [`crate::Error::Fetch`] or
    /// [`crate::Error::Assembly`]; no partial document is ever returned.
    pub async fn compose_report(&self, id: &SessionId) -> Result<ReportDocument> {
        let producer = Arc::new(SectionProducer::new(Arc::clone(&self.template)));
        let assembled = self.pipeline.run_assemble(id, producer).await?;

        let total = assembled.records.len();
        let correct = assembled
            .records
            .iter()
            .filter(|attempt| attempt.answered_correctly())
            .count();

        Ok(self
            .template
            .render_document(&assembled.session, total, correct, assembled.outputs))
    }

    /// Render the full report for a session as PDF bytes
    ///
    /// # Errors
    ///
    /// Everything [`Self::compose_report`] returns, plus
    /// [`crate::Error::Render`] if encoding fails.
    pub async fn generate_report(&self, id: &SessionId) -> Result<Vec<u8>> {
        let document = self.compose_report(id).await?;

        let bytes = tokio::task::spawn_blocking(move || document.to_pdf())
            .await
            .map_err(|e| Error::Other(format!("PDF encoding task failed: {}", e)))??;

        tracing::debug!(session_id = %id, bytes = bytes.len(), "Report encoded");
        Ok(bytes)
    }

    /// The pipeline backing this service
    pub fn pipeline(&self) -> &ReportPipeline<S> {
        &self.pipeline
    }
}

/// Sends the report as one email per page
pub struct EmailService<S: QuizStore, T: MessageTransport> {
    pipeline: ReportPipeline<S>,
    producer: Arc<EmailProducer<T>>,
}

impl<S: QuizStore, T: MessageTransport> EmailService<S, T> {
    /// Create a service sending through `transport`
    pub fn new(pipeline: ReportPipeline<S>, template: Arc<ReportTemplate>, transport: Arc<T>) -> Self {
        Self {
            pipeline,
            producer: Arc::new(EmailProducer::new(template, transport)),
        }
    }

    /// Send every page of a session's report as its own email
    ///
    /// Returns once every send has finished. Failed parts are counted in
    /// the summary, not returned as errors. A session without attempts
    /// sends nothing.
    ///
    /// # Errors
    ///
    /// Only [`crate::Error::NotFound`] and [`crate::Error::Fetch`].
    pub async fn send_report(&self, id: &SessionId) -> Result<DispatchSummary> {
        self.pipeline
            .run_best_effort(id, Arc::clone(&self.producer))
            .await
    }

    /// The pipeline backing this service
    pub fn pipeline(&self) -> &ReportPipeline<S> {
        &self.pipeline
    }
}
