//! Question and attempt queries, plus the [`RecordStore`] implementation.

use crate::store::RecordStore;
use crate::types::{AttemptRecord, SessionId, SessionRecord};
use crate::{Error, Result};
use async_trait::async_trait;

use super::{AttemptRow, Database, NewAttempt, NewQuestion};

impl Database {
    /// Insert a question, returning its id
    pub async fn insert_question(&self, question: &NewQuestion) -> Result<i64> {
        let options = serde_json::to_string(&question.options)?;

        let result = sqlx::query(
            "INSERT INTO questions (question, options, answer, topic) VALUES (?, ?, ?, ?)",
        )
        .bind(&question.question)
        .bind(options)
        .bind(&question.answer)
        .bind(&question.topic)
        .execute(&self.pool)
        .await
        .map_err(Error::Sqlx)?;

        Ok(result.last_insert_rowid())
    }

    /// Record one attempt, returning its id
    pub async fn insert_attempt(&self, attempt: &NewAttempt) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO quiz_attempts (session_id, question_id, answer, is_correct)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(attempt.session_id.as_str())
        .bind(attempt.question_id)
        .bind(&attempt.answer)
        .bind(attempt.is_correct)
        .execute(&self.pool)
        .await
        .map_err(Error::Sqlx)?;

        Ok(result.last_insert_rowid())
    }

    /// Get every attempt of a session with its question
    ///
    /// Ordered by question id, then attempt id, so repeated reads of the same
    /// session always return the same sequence. Empty if the session has no
    /// attempts (or does not exist).
    pub async fn get_attempts(&self, id: &SessionId) -> Result<Vec<AttemptRecord>> {
        let rows = sqlx::query_as::<_, AttemptRow>(
            r#"
            SELECT q.id AS question_id, q.question, q.options,
                   a.answer, q.answer AS correct_answer, a.is_correct
            FROM quiz_attempts a
            JOIN questions q ON a.question_id = q.id
            WHERE a.session_id = ?
            ORDER BY q.id ASC, a.id ASC
            "#,
        )
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Sqlx)?;

        rows.into_iter()
            .map(|row| AttemptRecord::try_from(row).map_err(Error::Database))
            .collect()
    }

    /// Count attempts recorded for a session
    pub async fn count_attempts(&self, id: &SessionId) -> Result<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM quiz_attempts WHERE session_id = ?")
                .bind(id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Sqlx)?;

        Ok(count)
    }
}

#[async_trait]
impl RecordStore for Database {
    type Key = SessionId;
    type Session = SessionRecord;
    type Record = AttemptRecord;

    async fn fetch_session(&self, key: &SessionId) -> Result<Option<SessionRecord>> {
        self.get_session(key).await
    }

    async fn fetch_records(&self, key: &SessionId) -> Result<Vec<AttemptRecord>> {
        self.get_attempts(key).await
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
