//! Concurrent per-page dispatch
//!
//! [`fan_out`] spawns one task per page, in page order, then joins every one
//! of them. Each task writes only its own slot, so the join needs no locks
//! or shared counters. What happens after the join depends on the delivery
//! mode: [`assemble`] requires every unit, [`summarize`] counts failures.

use crate::error::{AssemblyError, Error, Result};
use crate::pagination::Page;
use crate::types::{DispatchSummary, Event, UnitFailure};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Turns one page of a session into a delivery unit
///
/// Implementations render and, where applicable, transmit the page. They
/// run concurrently for sibling pages of the same session, so they must
/// not rely on call order.
#[async_trait]
pub trait UnitProducer<S, R>: Send + Sync + 'static {
    /// What a successful unit yields (document section, delivery receipt, ...)
    type Output: Send + 'static;

    /// Produce the unit for `page`
    ///
    /// An error fails this page only; sibling pages keep running.
    async fn produce(&self, session: &S, page: &Page<R>) -> Result<Self::Output>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Outcome of one page task
#[derive(Debug)]
pub struct DeliveryUnit<T> {
    /// 1-based page number
    pub page_number: usize,
    /// Total pages dispatched
    pub page_count: usize,
    /// Produced output, or the cause of failure
    pub outcome: Result<T>,
}

impl<T> DeliveryUnit<T> {
    /// Whether the unit completed successfully
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Run one task per page and wait for all of them
///
/// Every task is spawned before the first one is awaited. A failing or
/// panicking task never cancels its siblings: every task is joined, and a
/// panic becomes a failed unit. Exactly one unit is returned per page, in
/// the order the pages were given, regardless of completion order.
pub async fn fan_out<S, R, P>(
    session: Arc<S>,
    pages: Vec<Page<R>>,
    producer: Arc<P>,
) -> Vec<DeliveryUnit<P::Output>>
where
    S: Send + Sync + 'static,
    R: Send + Sync + 'static,
    P: UnitProducer<S, R>,
{
    let handles: Vec<_> = pages
        .into_iter()
        .map(|page| {
            let session = Arc::clone(&session);
            let producer = Arc::clone(&producer);
            let position = (page.number(), page.count());
            let handle = tokio::spawn(async move { producer.produce(&session, &page).await });
            (position, handle)
        })
        .collect();

    let mut units = Vec::with_capacity(handles.len());
    for ((page_number, page_count), handle) in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    page = page_number,
                    producer = producer.name(),
                    error = %e,
                    "Page task did not complete"
                );
                Err(Error::Other(format!("page task aborted: {}", e)))
            }
        };

        units.push(DeliveryUnit {
            page_number,
            page_count,
            outcome,
        });
    }

    units
}

/// Collect every unit's output in page order
///
/// Units are re-sorted by page number first, since callers may hand them
/// over in completion order. The units must cover every page from 1 to
/// their page count: a page with no unit counts as failed. If any page
/// failed, the outputs that did succeed are dropped and the failed pages
/// are reported instead.
pub fn assemble<T>(session_id: &str, mut units: Vec<DeliveryUnit<T>>) -> Result<Vec<T>> {
    units.sort_by_key(|unit| unit.page_number);
    let page_count = units
        .iter()
        .map(|unit| unit.page_count)
        .max()
        .unwrap_or(0)
        .max(units.len());

    let mut outputs = Vec::with_capacity(page_count);
    let mut failed_pages = Vec::new();
    let mut first_cause = None;
    let mut expected = 1;

    for unit in units {
        for missing in expected..unit.page_number {
            tracing::warn!(
                session_id,
                page = missing,
                pages = page_count,
                "Page was never dispatched, report cannot be assembled"
            );
            failed_pages.push(missing);
            first_cause.get_or_insert_with(|| format!("page {} was never dispatched", missing));
        }
        expected = expected.max(unit.page_number + 1);

        match unit.outcome {
            Ok(output) => outputs.push(output),
            Err(e) => {
                tracing::warn!(
                    session_id,
                    page = unit.page_number,
                    pages = page_count,
                    error = %e,
                    "Page failed, report cannot be assembled"
                );
                failed_pages.push(unit.page_number);
                first_cause.get_or_insert_with(|| e.to_string());
            }
        }
    }

    for missing in expected..=page_count {
        failed_pages.push(missing);
        first_cause.get_or_insert_with(|| format!("page {} was never dispatched", missing));
    }

    if failed_pages.is_empty() {
        return Ok(outputs);
    }

    Err(AssemblyError {
        session_id: session_id.to_string(),
        failed_pages,
        page_count,
        first_cause: first_cause.unwrap_or_default(),
    }
    .into())
}

/// Tally units without failing
///
/// Each failure is logged and published as [`Event::UnitFailed`], each
/// success as [`Event::UnitDelivered`]. The summary is always returned,
/// even when no unit succeeded.
pub fn summarize<T>(
    session_id: &str,
    mut units: Vec<DeliveryUnit<T>>,
    event_tx: &broadcast::Sender<Event>,
) -> DispatchSummary {
    units.sort_by_key(|unit| unit.page_number);
    let pages = units.len();
    let mut failures = Vec::new();

    for unit in units {
        match unit.outcome {
            Ok(_) => {
                event_tx
                    .send(Event::UnitDelivered {
                        session_id: session_id.to_string(),
                        page_number: unit.page_number,
                        page_count: unit.page_count,
                    })
                    .ok();
            }
            Err(e) => {
                let error = e.to_string();
                tracing::warn!(
                    session_id,
                    page = unit.page_number,
                    pages,
                    error = %error,
                    "Page delivery failed"
                );
                event_tx
                    .send(Event::UnitFailed {
                        session_id: session_id.to_string(),
                        page_number: unit.page_number,
                        page_count: unit.page_count,
                        error: error.clone(),
                    })
                    .ok();
                failures.push(UnitFailure {
                    page_number: unit.page_number,
                    error,
                });
            }
        }
    }

    let failed = failures.len();
    let summary = DispatchSummary {
        session_id: session_id.to_string(),
        pages,
        delivered: pages - failed,
        failed,
        failures,
    };

    if summary.all_failed() {
        tracing::error!(session_id, pages, "Every page failed to deliver");
    } else if failed > 0 {
        tracing::warn!(
            session_id,
            pages,
            failed,
            "Report delivered with missing parts"
        );
    }

    summary
}
