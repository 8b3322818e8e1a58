// src/scan/scheduler.rs
//
// Owns the process's recurring-scan state. One job per id: starting again
// under the same id supersedes the previous registration instead of
// stacking a second timer, mirroring the replace-existing registration the
// deployment relies on.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::scan::types::Target;
use crate::scan::ScanPipeline;

pub const SCAN_JOB_ID: &str = "scan_job";

pub struct ScanScheduler {
    interval: Duration,
    targets: Arc<Vec<Target>>,
    pipeline: Arc<ScanPipeline>,
    jobs: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl ScanScheduler {
    /// Target and keyword lists are fixed at construction; ticks only ever
    /// read them, so parallelizing ticks later needs no extra locking.
    pub fn new(interval: Duration, targets: Vec<Target>, pipeline: ScanPipeline) -> Self {
        Self {
            interval,
            targets: Arc::new(targets),
            pipeline: Arc::new(pipeline),
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Start (or restart) the recurring job under `job_id`. Idempotent with
    /// replace-existing semantics: any live job with the same id is aborted
    /// first, so exactly one timer per id is ever active. The first tick
    /// fires one interval after start.
    pub fn start(&self, job_id: &str) {
        let interval = self.interval;
        let targets = self.targets.clone();
        let pipeline = self.pipeline.clone();

        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            // An overrunning batch delays, it never bursts to catch up.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                pipeline.run_tick(&targets).await;
            }
        });

        let mut jobs = self.jobs.lock().expect("job table mutex poisoned");
        if let Some(old) = jobs.insert(job_id.to_string(), handle) {
            old.abort();
            tracing::info!(job_id, "replaced existing scan job");
        }
        tracing::info!(
            job_id,
            interval_secs = interval.as_secs(),
            targets = self.targets.len(),
            "scheduler started"
        );
    }

    pub fn is_running(&self, job_id: &str) -> bool {
        self.jobs
            .lock()
            .expect("job table mutex poisoned")
            .get(job_id)
            .is_some_and(|h| !h.is_finished())
    }

    /// Abort the job registered under `job_id`, if any. An in-flight tick is
    /// abandoned; side effects already applied stay applied. Returns whether
    /// a job was removed.
    pub fn stop(&self, job_id: &str) -> bool {
        let mut jobs = self.jobs.lock().expect("job table mutex poisoned");
        match jobs.remove(job_id) {
            Some(h) => {
                h.abort();
                tracing::info!(job_id, "scheduler stopped");
                true
            }
            None => false,
        }
    }

    /// Run one batch immediately, outside the timer. Used by the binary for
    /// an optional scan-at-boot and by tests.
    pub async fn run_now(&self) -> crate::scan::types::TickSummary {
        self.pipeline.run_tick(&self.targets).await
    }
}

impl Drop for ScanScheduler {
    fn drop(&mut self) {
        let jobs = self.jobs.lock().expect("job table mutex poisoned");
        for handle in jobs.values() {
            handle.abort();
        }
    }
}
