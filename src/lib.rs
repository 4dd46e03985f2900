//! # quiz-report
//!
//! Per-session quiz performance reports, delivered either as one
//! downloadable document or as a sequence of emailed parts.
//!
//! ## How a report is built
//!
//! 1. The session and its ordered attempts are read from the store
//!    concurrently, and classified only once both reads finish.
//! 2. Attempts are split into pages of at most ten.
//! 3. One task per page renders (and for email, sends) its part. Every task
//!    is joined; a failing page never cancels its siblings.
//! 4. The document path requires every page, assembles them in page order
//!    and encodes the result as PDF. The email path sends each part as HTML
//!    over SMTP (or an HTTP mail relay), succeeds regardless and reports
//!    how many parts failed.
//!
//! ## Quick Start
//!
//! ```no_run
//! use quiz_report::{Config, QuizReporter, SessionId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let reporter = QuizReporter::new(Config::default()).await?;
//!
//!     // Subscribe to pipeline events
//!     let mut events = reporter.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let id = SessionId::parse("s1")?;
//!     let pdf = reporter.generate_report(&id).await?;
//!     let summary = reporter.send_report(&id).await?;
//!     println!("{} bytes, {} of {} parts sent", pdf.len(), summary.delivered, summary.pages);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Error types
pub mod error;
/// Splitting records into pages
pub mod pagination;
/// Aggregation and paginated dispatch
pub mod pipeline;
/// Report content, PDF and HTML encoding
pub mod render;
/// Report service wiring
pub mod reporter;
/// Document and email report services
pub mod service;
/// Record store abstraction
pub mod store;
/// Outbound mail transport
pub mod transport;
/// Core types and events
pub mod types;

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use config::Config;
pub use db::Database;
pub use error::{
    ApiError, AssemblyError, DatabaseError, Error, ErrorDetail, FetchError, FetchSide, Result,
    ToHttpStatus,
};
pub use pagination::PageSize;
pub use pipeline::{ReportPipeline, UnitProducer};
pub use render::{Block, ReportDocument};
pub use reporter::QuizReporter;
pub use store::RecordStore;
pub use transport::{HttpMailTransport, MailTransport, MessageTransport, SmtpMailTransport};
pub use types::{
    AttemptRecord, DeliveryMode, DispatchSummary, Event, SessionId, SessionRecord, Stage,
};

/// Serve the REST API until a termination signal, then shut down.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use quiz_report::{Config, QuizReporter, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let reporter = QuizReporter::new(Config::default()).await?;
///     run_with_shutdown(reporter).await?;
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(reporter: QuizReporter) -> Result<()> {
    let config = reporter.config().clone();
    api::start_api_server(std::sync::Arc::new(reporter.clone()), config, wait_for_signal()).await?;
    reporter.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration can fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
