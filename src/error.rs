//! Error types for quiz-report
//!
//! This module provides the error taxonomy of the report pipeline, including:
//! - The caller-facing kinds (not found, fetch failure, assembly failure)
//! - HTTP status code mapping for the routing layer
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for quiz-report operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for quiz-report
///
/// The routing layer tells "does not exist" apart from "transient failure" by
/// matching on the variant (or on [`ToHttpStatus::error_code`]), never on the
/// message text.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "report.page_size")
        key: Option<String>,
    },

    /// The session identifier has no matching record
    #[error("session with ID {session_id} not found")]
    NotFound {
        /// The identifier exactly as the caller supplied it
        session_id: String,
    },

    /// The session identifier could not be parsed by the routing layer
    #[error("invalid session ID: {0}")]
    InvalidSessionId(String),

    /// One or both of the concurrent store reads failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// One or more pages failed while assembling a single document
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// Rendering a page or document failed
    #[error("render error: {0}")]
    Render(String),

    /// The message transport rejected or failed to deliver a message
    #[error("transport error: {0}")]
    Transport(String),

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Which side of the concurrent fetch failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FetchSide {
    /// Only the session read failed
    Session,
    /// Only the attempts read failed
    Attempts,
    /// Both reads failed
    Both,
}

impl FetchSide {
    /// Stable lowercase name used in logs and API details
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchSide::Session => "session",
            FetchSide::Attempts => "attempts",
            FetchSide::Both => "both",
        }
    }
}

/// Infrastructure failure on the concurrent session/attempts reads
///
/// Each variant keeps the cause of every side that failed. A side that
/// succeeded is never reported, and its result is never used.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The session read failed
    #[error("failed to fetch data for session {session_id}: session: {source}")]
    Session {
        /// Session being fetched
        session_id: String,
        /// Cause reported by the store
        source: Box<Error>,
    },

    /// The attempts read failed
    #[error("failed to fetch data for session {session_id}: attempts: {source}")]
    Attempts {
        /// Session being fetched
        session_id: String,
        /// Cause reported by the store
        source: Box<Error>,
    },

    /// Both reads failed
    #[error(
        "failed to fetch data for session {session_id}: session: {session}; attempts: {attempts}"
    )]
    Both {
        /// Session being fetched
        session_id: String,
        /// Cause of the session read failure
        session: Box<Error>,
        /// Cause of the attempts read failure
        attempts: Box<Error>,
    },
}

impl FetchError {
    /// Which side(s) failed
    pub fn side(&self) -> FetchSide {
        match self {
            FetchError::Session { .. } => FetchSide::Session,
            FetchError::Attempts { .. } => FetchSide::Attempts,
            FetchError::Both { .. } => FetchSide::Both,
        }
    }

    /// The session the fetch was issued for
    pub fn session_id(&self) -> &str {
        match self {
            FetchError::Session { session_id, .. }
            | FetchError::Attempts { session_id, .. }
            | FetchError::Both { session_id, .. } => session_id,
        }
    }
}

/// One or more page tasks failed in assemble mode; no partial output is kept
#[derive(Debug, Error)]
#[error(
    "failed to assemble report for session {session_id}: {} of {page_count} page(s) failed {failed_pages:?}",
    .failed_pages.len()
)]
pub struct AssemblyError {
    /// Session being assembled
    pub session_id: String,
    /// Page numbers (1-based, ascending) whose task failed
    pub failed_pages: Vec<usize>,
    /// Total number of pages dispatched
    pub page_count: usize,
    /// Cause of the first failed page, for logs
    pub first_cause: String,
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// A stored value could not be decoded into a record
    #[error("corrupt row: {0}")]
    CorruptRow(String),
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "session_not_found",
///     "message": "session with ID s9 not found",
///     "details": {
///       "session_id": "s9"
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "session_not_found", "fetch_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Error::Config { .. } => 400,
            Error::InvalidSessionId(_) => 400,

            // 404 Not Found
            Error::NotFound { .. } => 404,

            // 500 Internal Server Error
            Error::Fetch(_) => 500,
            Error::Assembly(_) => 500,
            Error::Render(_) => 500,
            Error::Database(_) => 500,
            Error::Sqlx(_) => 500,
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,

            // 502 Bad Gateway - mail relay failures
            Error::Transport(_) => 502,
            Error::Network(_) => 502,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::NotFound { .. } => "session_not_found",
            Error::InvalidSessionId(_) => "invalid_session_id",
            Error::Fetch(_) => "fetch_error",
            Error::Assembly(_) => "assembly_error",
            Error::Render(_) => "render_error",
            Error::Transport(_) => "transport_error",
            Error::Database(_) => "database_error",
            Error::Sqlx(_) => "database_error",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();

        // Infrastructure causes stay in the logs; callers get the kind only
        let message = match &error {
            Error::Fetch(e) => format!(
                "failed to fetch data for session {} ({} read failed)",
                e.session_id(),
                e.side().as_str()
            ),
            Error::Assembly(e) => format!(
                "failed to generate report for session {}",
                e.session_id
            ),
            other => other.to_string(),
        };

        let details = match &error {
            Error::NotFound { session_id } => Some(serde_json::json!({
                "session_id": session_id,
            })),
            Error::Fetch(e) => Some(serde_json::json!({
                "session_id": e.session_id(),
                "failed": e.side(),
            })),
            Error::Assembly(e) => Some(serde_json::json!({
                "session_id": e.session_id,
                "failed_pages": e.failed_pages,
                "page_count": e.page_count,
            })),
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
