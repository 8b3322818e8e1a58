// src/scan/types.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One scan target: a URL plus the source label it is filed under
/// (e.g. "paste", "forum", "manual"). Supplied at startup, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Target {
    pub url: String,
    pub source: String,
}

impl Target {
    pub fn new(url: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
        }
    }
}

/// Why a single target's pipeline was abandoned this tick. Contained at the
/// target boundary; the batch driver logs it and moves on.
#[derive(Debug, Error)]
pub enum TargetFailure {
    #[error("fetch failed: {0:#}")]
    Fetch(anyhow::Error),
    #[error("persist failed: {0:#}")]
    Persist(anyhow::Error),
}

/// Per-target result of a completed pipeline run.
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub sample_id: i64,
    pub matched: Vec<String>,
    /// Whether an alert was handed to the dispatcher and accepted.
    pub alerted: bool,
}

/// Aggregate counts for one tick, for logging/metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub scanned: usize,
    pub failed: usize,
    pub alerts_sent: usize,
    pub alerts_failed: usize,
}
