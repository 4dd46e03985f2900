//! Core types and events

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Longest identifier the routing layer accepts
pub const MAX_SESSION_ID_LEN: usize = 64;

/// Unique identifier for a quiz session
///
/// Opaque to the pipeline. Integer ids are carried as their decimal text.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Parse an identifier taken from a request path
    ///
    /// The id is taken exactly as sent. Rejects blank ids, ids with
    /// surrounding whitespace, ids longer than [`MAX_SESSION_ID_LEN`], and
    /// ids containing anything other than ASCII alphanumerics, `-`, `_` or
    /// `.`.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(Error::InvalidSessionId("Session ID is missing".into()));
        }
        if raw.trim() != raw {
            return Err(Error::InvalidSessionId(
                "Session ID must not have surrounding whitespace".into(),
            ));
        }
        if raw.len() > MAX_SESSION_ID_LEN {
            return Err(Error::InvalidSessionId(format!(
                "Session ID exceeds {} characters",
                MAX_SESSION_ID_LEN
            )));
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(Error::InvalidSessionId(
                "Invalid Session ID format".to_string(),
            ));
        }
        Ok(Self(raw.to_string()))
    }

    /// Get the identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for SessionId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One completed quiz session with its owner's contact details
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessionRecord {
    /// Session identifier
    pub session_id: SessionId,
    /// Participant display name
    pub user_name: String,
    /// Participant email address (report recipient)
    pub email: String,
    /// Score recorded for the session
    pub score: i64,
    /// Quiz topic, if the session was scoped to one
    pub topic: Option<String>,
    /// When the session took place
    pub taken_at: DateTime<Utc>,
}

/// One answered question within a session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttemptRecord {
    /// Question identifier (the ordering key)
    pub question_id: i64,
    /// Question text
    pub question: String,
    /// Answer options, label to text
    pub options: BTreeMap<String, String>,
    /// Response chosen by the participant (None if skipped)
    pub chosen: Option<String>,
    /// Correct response
    pub correct: String,
    /// Correctness flag as stored, if the store graded the attempt
    pub is_correct: Option<bool>,
}

impl AttemptRecord {
    /// Whether the attempt counts as correct
    ///
    /// The stored grade wins; ungraded attempts compare the chosen and
    /// correct responses.
    pub fn answered_correctly(&self) -> bool {
        match self.is_correct {
            Some(flag) => flag,
            None => self.chosen.as_deref() == Some(self.correct.as_str()),
        }
    }
}

/// How the pipeline treats per-page failures after the dispatch join
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Every page must succeed; output is one assembled artifact
    Assemble,
    /// Pages are independent; failures are counted, never returned
    BestEffort,
}

/// Pipeline state for one invocation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Both store reads in flight
    Fetching,
    /// Session has no record (terminal)
    NotFound,
    /// A store read failed (terminal)
    FetchError,
    /// Session and attempts loaded
    Fetched,
    /// Splitting attempts into pages
    Paginating,
    /// Page tasks in flight
    Dispatching,
    /// All pages produced and assembled (terminal)
    Assembled,
    /// At least one page failed in assemble mode (terminal)
    AssemblyError,
    /// Best-effort dispatch joined (terminal)
    CompletedBestEffort,
}

impl Stage {
    /// Whether no further transition follows this stage
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Stage::NotFound
                | Stage::FetchError
                | Stage::Assembled
                | Stage::AssemblyError
                | Stage::CompletedBestEffort
        )
    }
}

/// One failed delivery unit in best-effort mode
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UnitFailure {
    /// Page number (1-based)
    pub page_number: usize,
    /// Failure cause
    pub error: String,
}

/// Outcome of a best-effort dispatch
///
/// Returned as success even when units failed; `failed` is the count of
/// pages whose unit did not complete.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DispatchSummary {
    /// Session the units were dispatched for
    pub session_id: String,
    /// Number of pages dispatched
    pub pages: usize,
    /// Units that completed
    pub delivered: usize,
    /// Units that failed
    pub failed: usize,
    /// Per-page failure detail, ascending by page number
    pub failures: Vec<UnitFailure>,
}

impl DispatchSummary {
    /// True when there was at least one page and none succeeded
    pub fn all_failed(&self) -> bool {
        self.pages > 0 && self.delivered == 0
    }
}

/// Event emitted while a report pipeline runs
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The invocation moved to a new stage
    StageChanged {
        /// Session being processed
        session_id: String,
        /// Delivery mode of the invocation
        mode: DeliveryMode,
        /// New stage
        stage: Stage,
    },

    /// A page unit completed
    UnitDelivered {
        /// Session being processed
        session_id: String,
        /// Page number (1-based)
        page_number: usize,
        /// Total pages
        page_count: usize,
    },

    /// A page unit failed
    UnitFailed {
        /// Session being processed
        session_id: String,
        /// Page number (1-based)
        page_number: usize,
        /// Total pages
        page_count: usize,
        /// Failure cause
        error: String,
    },
}
