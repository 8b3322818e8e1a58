// src/store/mod.rs
//
// Persistence boundary for scanned samples. The scan pipeline only ever
// talks to `SampleStore`; the backing database (and its migrations, query
// API and so on) lives outside this crate. `MemoryStore` is the in-process
// implementation used by the binary default and by tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A sample as handed to the store: everything except the store-assigned
/// id and creation timestamp. Title/content arrive already truncated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSample {
    pub source: String,
    pub url: String,
    pub title: String,
    pub content: String,
    /// Arbitrary structured attributes, e.g. {"length": <untruncated chars>}.
    pub metadata: Value,
}

/// A persisted sample. Append-only; the only mutation the core performs is
/// the post-match `flagged` update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub id: i64,
    pub source: String,
    pub url: String,
    pub title: String,
    pub content: String,
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
    pub flagged: bool,
}

#[async_trait]
pub trait SampleStore: Send + Sync {
    /// Persist a new sample; assigns id and `created_at`, `flagged` starts
    /// false.
    async fn create(&self, sample: NewSample) -> Result<Sample>;

    /// Idempotent single-field update; unknown ids are a no-op.
    async fn flag(&self, id: i64, flagged: bool) -> Result<()>;
}

/// Simple in-memory store. Concurrent writers are fine: creation appends
/// under the lock, flagging touches one record by id.
#[derive(Default)]
pub struct MemoryStore {
    next_id: AtomicI64,
    samples: Mutex<Vec<Sample>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            samples: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of everything stored, oldest first. Test/inspection surface;
    /// the query API proper is the host application's concern.
    pub fn samples(&self) -> Vec<Sample> {
        self.samples.lock().expect("store mutex poisoned").clone()
    }
}

#[async_trait]
impl SampleStore for MemoryStore {
    async fn create(&self, sample: NewSample) -> Result<Sample> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let persisted = Sample {
            id,
            source: sample.source,
            url: sample.url,
            title: sample.title,
            content: sample.content,
            metadata: sample.metadata,
            created_at: Utc::now(),
            flagged: false,
        };
        self.samples
            .lock()
            .expect("store mutex poisoned")
            .push(persisted.clone());
        Ok(persisted)
    }

    async fn flag(&self, id: i64, flagged: bool) -> Result<()> {
        let mut samples = self.samples.lock().expect("store mutex poisoned");
        if let Some(s) = samples.iter_mut().find(|s| s.id == id) {
            s.flagged = flagged;
        }
        Ok(())
    }
}
