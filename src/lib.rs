// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod config;
pub mod notify;
pub mod scan;
pub mod store;

// ---- Re-exports for stable public API ----
pub use crate::notify::{AlertDispatcher, AlertEvent};
pub use crate::scan::scheduler::{ScanScheduler, SCAN_JOB_ID};
pub use crate::scan::types::{Target, TargetFailure, TargetReport, TickSummary};
pub use crate::scan::ScanPipeline;
pub use crate::store::{MemoryStore, NewSample, Sample, SampleStore};
