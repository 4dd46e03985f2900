//! Database layer for quiz-report
//!
//! Handles SQLite persistence for users, sessions, questions and quiz attempts.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`]: Database lifecycle, schema migrations
//! - [`sessions`]: Session lookup and insertion
//! - [`attempts`]: Question and attempt queries

use crate::error::DatabaseError;
use crate::types::{AttemptRecord, SessionId, SessionRecord};
use chrono::{TimeZone, Utc};
use sqlx::{FromRow, sqlite::SqlitePool};
use std::collections::BTreeMap;

mod attempts;
mod migrations;
mod sessions;

/// New user to be inserted into the database
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact address for reports
    pub email: String,
}

/// New quiz session to be inserted into the database
#[derive(Debug, Clone)]
pub struct NewSession {
    /// Session identifier
    pub id: SessionId,
    /// Owning user
    pub user_id: i64,
    /// Recorded score
    pub total_marks: i64,
    /// Optional quiz topic
    pub topic: Option<String>,
    /// Unix timestamp of the session
    pub session_date: i64,
}

/// New question to be inserted into the database
#[derive(Debug, Clone)]
pub struct NewQuestion {
    /// Question text
    pub question: String,
    /// Answer options, label to text
    pub options: BTreeMap<String, String>,
    /// Correct answer
    pub answer: String,
    /// Topic the question belongs to
    pub topic: Option<String>,
}

/// New attempt to be inserted into the database
#[derive(Debug, Clone)]
pub struct NewAttempt {
    /// Session the attempt belongs to
    pub session_id: SessionId,
    /// Question answered
    pub question_id: i64,
    /// Chosen answer (None if skipped)
    pub answer: Option<String>,
    /// Grade, if already known
    pub is_correct: Option<bool>,
}

/// Session row joined with its user (raw from SQLite)
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    /// Session identifier
    pub id: String,
    /// Recorded score
    pub total_marks: i64,
    /// Optional quiz topic
    pub topic: Option<String>,
    /// Unix timestamp of the session
    pub session_date: i64,
    /// User given name
    pub first_name: String,
    /// User family name
    pub last_name: String,
    /// User email
    pub email: String,
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        let user_name = format!("{} {}", row.first_name, row.last_name)
            .trim()
            .to_string();

        SessionRecord {
            session_id: SessionId::from(row.id.as_str()),
            user_name,
            email: row.email,
            score: row.total_marks,
            topic: row.topic,
            taken_at: Utc
                .timestamp_opt(row.session_date, 0)
                .single()
                .unwrap_or_default(),
        }
    }
}

/// Attempt row joined with its question (raw from SQLite)
#[derive(Debug, Clone, FromRow)]
pub struct AttemptRow {
    /// Question identifier
    pub question_id: i64,
    /// Question text
    pub question: String,
    /// Options as a JSON object
    pub options: Option<String>,
    /// Chosen answer
    pub answer: Option<String>,
    /// Correct answer
    pub correct_answer: String,
    /// Grade as stored
    pub is_correct: Option<bool>,
}

impl TryFrom<AttemptRow> for AttemptRecord {
    type Error = DatabaseError;

    fn try_from(row: AttemptRow) -> Result<Self, Self::Error> {
        let options = match row.options.as_deref() {
            None | Some("") => BTreeMap::new(),
            Some(json) => serde_json::from_str(json).map_err(|e| {
                DatabaseError::CorruptRow(format!(
                    "options of question {} are not a JSON object: {}",
                    row.question_id, e
                ))
            })?,
        };

        Ok(AttemptRecord {
            question_id: row.question_id,
            question: row.question,
            options,
            chosen: row.answer,
            correct: row.correct_answer,
            is_correct: row.is_correct,
        })
    }
}

/// Database handle for quiz-report
pub struct Database {
    pool: SqlitePool,
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
