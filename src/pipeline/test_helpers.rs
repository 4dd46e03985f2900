//! Scriptable store and producer for pipeline tests.

use crate::error::{Error, Result};
use crate::pagination::Page;
use crate::pipeline::dispatch::UnitProducer;
use crate::store::RecordStore;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Barrier;

/// In-memory store keyed by session name with numbered records.
#[derive(Default)]
pub(crate) struct MockStore {
    pub session: Option<String>,
    pub records: Vec<u32>,
    pub session_error: Option<&'static str>,
    pub records_error: Option<&'static str>,
    pub session_delay: Duration,
    pub records_delay: Duration,
    /// When set, each read waits here until the other read has started
    pub rendezvous: Option<Barrier>,
    pub session_done: AtomicBool,
    pub records_done: AtomicBool,
}

impl MockStore {
    /// Store holding one session named `name` with records `1..=records`
    pub fn with_session(name: &str, records: u32) -> Self {
        Self {
            session: Some(name.to_string()),
            records: (1..=records).collect(),
            ..Default::default()
        }
    }

    /// Store with no session at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Require both reads to be in flight at the same time
    pub fn rendezvous(mut self) -> Self {
        self.rendezvous = Some(Barrier::new(2));
        self
    }
}

#[async_trait]
impl RecordStore for MockStore {
    type Key = String;
    type Session = String;
    type Record = u32;

    async fn fetch_session(&self, key: &String) -> Result<Option<String>> {
        if let Some(barrier) = &self.rendezvous {
            barrier.wait().await;
        }
        tokio::time::sleep(self.session_delay).await;
        self.session_done.store(true, Ordering::SeqCst);

        if let Some(error) = self.session_error {
            return Err(Error::Other(error.to_string()));
        }
        Ok(self.session.clone().filter(|name| name == key))
    }

    async fn fetch_records(&self, _key: &String) -> Result<Vec<u32>> {
        if let Some(barrier) = &self.rendezvous {
            barrier.wait().await;
        }
        tokio::time::sleep(self.records_delay).await;
        self.records_done.store(true, Ordering::SeqCst);

        if let Some(error) = self.records_error {
            return Err(Error::Other(error.to_string()));
        }
        Ok(self.records.clone())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Producer that echoes page records, with per-page delays and failures.
#[derive(Default)]
pub(crate) struct ScriptedProducer {
    fail_pages: HashSet<usize>,
    panic_pages: HashSet<usize>,
    delays: HashMap<usize, Duration>,
    completed: Mutex<Vec<usize>>,
}

impl ScriptedProducer {
    /// Fail `page` with a transport error
    pub fn fail(mut self, page: usize) -> Self {
        self.fail_pages.insert(page);
        self
    }

    /// Panic inside the task for `page`
    pub fn panic_on(mut self, page: usize) -> Self {
        self.panic_pages.insert(page);
        self
    }

    /// Delay `page` by `millis` before it completes
    pub fn delay(mut self, page: usize, millis: u64) -> Self {
        self.delays.insert(page, Duration::from_millis(millis));
        self
    }

    /// Page numbers in the order their tasks finished
    pub fn completed(&self) -> Vec<usize> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl UnitProducer<String, u32> for ScriptedProducer {
    type Output = Vec<u32>;

    async fn produce(&self, _session: &String, page: &Page<u32>) -> Result<Vec<u32>> {
        let number = page.number();
        if let Some(delay) = self.delays.get(&number) {
            tokio::time::sleep(*delay).await;
        }

        if self.panic_pages.contains(&number) {
            panic!("scripted panic on page {number}");
        }

        self.completed.lock().unwrap().push(number);

        if self.fail_pages.contains(&number) {
            return Err(Error::Transport(format!("page {} rejected", number)));
        }
        Ok(page.records().to_vec())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
