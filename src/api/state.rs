//! Application state for the API server

use crate::{Config, QuizReporter};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// The report service instance
    pub reporter: Arc<QuizReporter>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(reporter: Arc<QuizReporter>, config: Arc<Config>) -> Self {
        Self { reporter, config }
    }
}
