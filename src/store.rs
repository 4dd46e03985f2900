//! Record store seam
//!
//! The pipeline only needs two reads from persistence: the session by id and
//! the session's ordered records. [`RecordStore`] names those reads and the
//! types they produce, so the same pipeline serves any key or record type.

use async_trait::async_trait;
use std::fmt::Display;

/// Read access to sessions and their ordered records
///
/// Implementations must be safe to call concurrently: the aggregator issues
/// both reads at the same time for the same key.
///
/// # Examples
///
/// ```no_run
/// use quiz_report::store::RecordStore;
/// use quiz_report::{Database, SessionId};
/// use std::path::Path;
///
/// # async fn example() -> quiz_report::Result<()> {
/// let db = Database::new(Path::new("quiz-report.db")).await?;
/// let id = SessionId::parse("s1")?;
/// if let Some(session) = db.fetch_session(&id).await? {
///     let attempts = db.fetch_records(&id).await?;
///     println!("{} answered {} questions", session.user_name, attempts.len());
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Key identifying one session
    type Key: Clone + Display + Send + Sync + 'static;

    /// Session metadata
    type Session: Send + Sync + 'static;

    /// One ordered record belonging to a session
    type Record: Send + Sync + 'static;

    /// Fetch session metadata
    ///
    /// `Ok(None)` means the query ran and found no session; errors are
    /// infrastructure failures only.
    async fn fetch_session(&self, key: &Self::Key) -> crate::Result<Option<Self::Session>>;

    /// Fetch the session's records in their stable order
    ///
    /// An empty vector is a valid answer.
    async fn fetch_records(&self, key: &Self::Key) -> crate::Result<Vec<Self::Record>>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
