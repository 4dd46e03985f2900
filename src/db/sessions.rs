//! Session lookup and insertion.

use crate::types::{SessionId, SessionRecord};
use crate::{Error, Result};

use super::{Database, NewSession, NewUser, SessionRow};

impl Database {
    /// Insert a user, returning its id
    pub async fn insert_user(&self, user: &NewUser) -> Result<i64> {
        let result = sqlx::query("INSERT INTO users (first_name, last_name, email) VALUES (?, ?, ?)")
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .execute(&self.pool)
            .await
            .map_err(Error::Sqlx)?;

        Ok(result.last_insert_rowid())
    }

    /// Insert a quiz session
    pub async fn insert_session(&self, session: &NewSession) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, total_marks, topic, session_date)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(session.id.as_str())
        .bind(session.user_id)
        .bind(session.total_marks)
        .bind(&session.topic)
        .bind(session.session_date)
        .execute(&self.pool)
        .await
        .map_err(Error::Sqlx)?;

        Ok(())
    }

    /// Get a session joined with its owner
    ///
    /// Returns `Ok(None)` when no session has this id.
    pub async fn get_session(&self, id: &SessionId) -> Result<Option<SessionRecord>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT s.id, s.total_marks, s.topic, s.session_date,
                   u.first_name, u.last_name, u.email
            FROM sessions s
            JOIN users u ON s.user_id = u.id
            WHERE s.id = ?
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Sqlx)?;

        Ok(row.map(SessionRecord::from))
    }
}
