//! Report aggregation and paginated delivery
//!
//! One invocation walks a fixed sequence of stages:
//!
//! ```text
//! Fetching -> {NotFound | FetchError | Fetched} -> Paginating -> Dispatching
//!          -> {Assembled | AssemblyError | CompletedBestEffort}
//! ```
//!
//! Every transition is published as [`Event::StageChanged`] on the
//! pipeline's broadcast channel. There are no retries and no backward
//! transitions.
//!
//! ## Submodules
//!
//! - [`aggregator`]: Concurrent session and record reads
//! - [`dispatch`]: Per-page task fan-out and the two delivery modes

use crate::error::{Error, Result};
use crate::pagination::{Page, PageSize, paginate};
use crate::store::RecordStore;
use crate::types::{DeliveryMode, DispatchSummary, Event, Stage};
use std::sync::Arc;
use tokio::sync::broadcast;

pub mod aggregator;
pub mod dispatch;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod test_helpers;

pub use aggregator::{Aggregator, Fetched};
pub use dispatch::{DeliveryUnit, UnitProducer, assemble, fan_out, summarize};

/// Event channel capacity; slow subscribers lag rather than block delivery
pub const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Result of an assemble-mode run
#[derive(Debug)]
pub struct Assembled<S, R, T> {
    /// Session metadata
    pub session: Arc<S>,
    /// Every record that was paginated, in store order
    pub records: Arc<[R]>,
    /// One output per page, in page order
    pub outputs: Vec<T>,
}

/// Ties the aggregator, paginator and dispatcher together for one store
pub struct ReportPipeline<S: RecordStore> {
    aggregator: Aggregator<S>,
    page_size: PageSize,
    event_tx: broadcast::Sender<Event>,
}

impl<S: RecordStore> Clone for ReportPipeline<S> {
    fn clone(&self) -> Self {
        Self {
            aggregator: self.aggregator.clone(),
            page_size: self.page_size,
            event_tx: self.event_tx.clone(),
        }
    }
}

impl<S: RecordStore> ReportPipeline<S> {
    /// Create a pipeline with its own event channel
    pub fn new(store: Arc<S>, page_size: PageSize) -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self::with_events(store, page_size, event_tx)
    }

    /// Create a pipeline publishing to an existing event channel
    pub fn with_events(
        store: Arc<S>,
        page_size: PageSize,
        event_tx: broadcast::Sender<Event>,
    ) -> Self {
        Self {
            aggregator: Aggregator::new(store),
            page_size,
            event_tx,
        }
    }

    /// Subscribe to pipeline events
    ///
    /// Events published before the call are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Records per page
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Fetch, paginate and require every page to succeed
    ///
    /// Zero records is a success with no outputs.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`], [`Error::Fetch`], or [`Error::Assembly`] when any
    /// page failed. Outputs of pages that did succeed are discarded.
    pub async fn run_assemble<P>(
        &self,
        key: &S::Key,
        producer: Arc<P>,
    ) -> Result<Assembled<S::Session, S::Record, P::Output>>
    where
        P: UnitProducer<S::Session, S::Record>,
    {
        let mode = DeliveryMode::Assemble;
        let (session, records, pages) = self.prepare(key, mode).await?;
        let session_id = key.to_string();
        let page_count = pages.len();

        let units = fan_out(Arc::clone(&session), pages, producer).await;

        match assemble(&session_id, units) {
            Ok(outputs) => {
                self.emit_stage(key, mode, Stage::Assembled);
                tracing::info!(session_id = %session_id, pages = page_count, "Report assembled");
                Ok(Assembled {
                    session,
                    records,
                    outputs,
                })
            }
            Err(e) => {
                self.emit_stage(key, mode, Stage::AssemblyError);
                Err(e)
            }
        }
    }

    /// Fetch, paginate and deliver every page independently
    ///
    /// Succeeds once every page task has finished, whatever their outcome.
    /// Failed pages are logged, published as [`Event::UnitFailed`] and
    /// counted in the returned summary. Zero records dispatches nothing.
    ///
    /// # Errors
    ///
    /// Only [`Error::NotFound`] and [`Error::Fetch`]; page failures never
    /// fail the call.
    pub async fn run_best_effort<P>(&self, key: &S::Key, producer: Arc<P>) -> Result<DispatchSummary>
    where
        P: UnitProducer<S::Session, S::Record>,
    {
        let mode = DeliveryMode::BestEffort;
        let (session, _records, pages) = self.prepare(key, mode).await?;
        let session_id = key.to_string();

        let units = fan_out(session, pages, producer).await;
        let summary = summarize(&session_id, units, &self.event_tx);

        self.emit_stage(key, mode, Stage::CompletedBestEffort);
        tracing::info!(
            session_id = %session_id,
            pages = summary.pages,
            delivered = summary.delivered,
            failed = summary.failed,
            "Best-effort delivery finished"
        );
        Ok(summary)
    }

    /// Shared stages up to (and including) entering Dispatching
    #[allow(clippy::type_complexity)]
    async fn prepare(
        &self,
        key: &S::Key,
        mode: DeliveryMode,
    ) -> Result<(Arc<S::Session>, Arc<[S::Record]>, Vec<Page<S::Record>>)> {
        self.emit_stage(key, mode, Stage::Fetching);

        let fetched = match self.aggregator.fetch(key).await {
            Ok(fetched) => fetched,
            Err(e) => {
                let stage = match e {
                    Error::NotFound { .. } => Stage::NotFound,
                    _ => Stage::FetchError,
                };
                self.emit_stage(key, mode, stage);
                return Err(e);
            }
        };
        self.emit_stage(key, mode, Stage::Fetched);

        self.emit_stage(key, mode, Stage::Paginating);
        let records: Arc<[S::Record]> = fetched.records.into();
        let pages = paginate(Arc::clone(&records), self.page_size);

        tracing::debug!(
            session_id = %key,
            records = records.len(),
            pages = pages.len(),
            "Dispatching pages"
        );
        self.emit_stage(key, mode, Stage::Dispatching);

        Ok((Arc::new(fetched.session), records, pages))
    }

    fn emit_stage(&self, key: &S::Key, mode: DeliveryMode, stage: Stage) {
        self.event_tx
            .send(Event::StageChanged {
                session_id: key.to_string(),
                mode,
                stage,
            })
            .ok();
    }
}
