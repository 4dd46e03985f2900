//! Concurrent session and record reads
//!
//! Both reads are spawned before either is awaited, and the outcome is only
//! classified once both have resolved.

use crate::error::{Error, FetchError, Result};
use crate::store::RecordStore;
use std::sync::Arc;
use tokio::task::JoinError;

/// Session metadata and its ordered records, read together
#[derive(Debug)]
pub struct Fetched<S, R> {
    /// Session metadata
    pub session: S,
    /// Records in store order (may be empty)
    pub records: Vec<R>,
}

/// Issues the two store reads for a key and joins them
pub struct Aggregator<S: RecordStore> {
    store: Arc<S>,
}

impl<S: RecordStore> Clone for Aggregator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: RecordStore> Aggregator<S> {
    /// Create an aggregator over `store`
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Read the session and its records concurrently
    ///
    /// # Errors
    ///
    /// - [`Error::Fetch`] when either read fails, naming the failed side(s).
    ///   A read that succeeded alongside a failed one is discarded.
    /// - [`Error::NotFound`] when both reads succeed but there is no session,
    ///   even if records came back.
    pub async fn fetch(&self, key: &S::Key) -> Result<Fetched<S::Session, S::Record>> {
        let session_task = {
            let store = Arc::clone(&self.store);
            let key = key.clone();
            tokio::spawn(async move { store.fetch_session(&key).await })
        };
        let records_task = {
            let store = Arc::clone(&self.store);
            let key = key.clone();
            tokio::spawn(async move { store.fetch_records(&key).await })
        };

        let session = flatten(session_task.await);
        let records = flatten(records_task.await);

        let session_id = key.to_string();
        match (session, records) {
            (Ok(Some(session)), Ok(records)) => {
                tracing::debug!(
                    session_id = %session_id,
                    store = self.store.name(),
                    records = records.len(),
                    "Fetched session and records"
                );
                Ok(Fetched { session, records })
            }
            (Ok(None), Ok(_)) => {
                tracing::info!(session_id = %session_id, "Session not found");
                Err(Error::NotFound { session_id })
            }
            (Err(e), Ok(_)) => {
                tracing::error!(session_id = %session_id, error = %e, "Session read failed");
                Err(FetchError::Session {
                    session_id,
                    source: Box::new(e),
                }
                .into())
            }
            (Ok(_), Err(e)) => {
                tracing::error!(session_id = %session_id, error = %e, "Records read failed");
                Err(FetchError::Attempts {
                    session_id,
                    source: Box::new(e),
                }
                .into())
            }
            (Err(session), Err(attempts)) => {
                tracing::error!(
                    session_id = %session_id,
                    session_error = %session,
                    attempts_error = %attempts,
                    "Both reads failed"
                );
                Err(FetchError::Both {
                    session_id,
                    session: Box::new(session),
                    attempts: Box::new(attempts),
                }
                .into())
            }
        }
    }
}

/// A read task that panicked counts as a failed read
fn flatten<T>(joined: std::result::Result<Result<T>, JoinError>) -> Result<T> {
    joined.unwrap_or_else(|e| Err(Error::Other(format!("read task aborted: {}", e))))
}
