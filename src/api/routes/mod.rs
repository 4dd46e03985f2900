//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`reports`]: Report download and email delivery
//! - [`system`]: Health, events, OpenAPI

use serde::{Deserialize, Serialize};

mod reports;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use reports::*;
pub use system::*;

/// Response for POST /sessions/:id/email-report
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct EmailReportResponse {
    /// Acknowledgement text
    pub message: String,
    /// Number of email parts dispatched
    pub pages: usize,
    /// Parts the mail relay accepted
    pub delivered: usize,
    /// Parts that could not be sent
    pub failed: usize,
    /// Part numbers that could not be sent, ascending
    ///
    /// Causes are logged and published as `unit_failed` events, never
    /// returned to the caller.
    pub failed_pages: Vec<usize>,
}
