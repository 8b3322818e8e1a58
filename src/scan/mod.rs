// src/scan/mod.rs
pub mod extractor;
pub mod fetcher;
pub mod matcher;
pub mod scheduler;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use serde_json::json;

use crate::notify::{AlertDispatcher, AlertEvent};
use crate::scan::extractor::extract;
use crate::scan::fetcher::ContentFetcher;
use crate::scan::matcher::match_keywords;
use crate::scan::types::{Target, TargetFailure, TargetReport, TickSummary};
use crate::store::{NewSample, SampleStore};

/// One-time metrics registration (so series show up on the host's recorder).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scan_targets_total", "Targets processed across all ticks.");
        describe_counter!(
            "scan_target_failures_total",
            "Targets whose pipeline aborted (fetch/persist failure)."
        );
        describe_counter!("scan_samples_created_total", "Samples persisted.");
        describe_counter!("scan_alerts_sent_total", "Alerts accepted by the dispatcher.");
        describe_counter!(
            "scan_alerts_failed_total",
            "Alert dispatches that returned failure."
        );
        describe_histogram!("scan_fetch_ms", "Per-target fetch time in milliseconds.");
        describe_gauge!("scan_last_run_ts", "Unix ts when the scan batch last ran.");
    });
}

/// The per-target pipeline: fetch -> extract -> persist -> match -> flag ->
/// alert. Everything behind trait seams so tests drive it with canned
/// fetchers, an in-memory store and a recording dispatcher.
pub struct ScanPipeline {
    fetcher: Arc<dyn ContentFetcher>,
    store: Arc<dyn SampleStore>,
    dispatcher: Arc<dyn AlertDispatcher>,
    keywords: Arc<Vec<String>>,
    fetch_timeout: Duration,
}

impl ScanPipeline {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        store: Arc<dyn SampleStore>,
        dispatcher: Arc<dyn AlertDispatcher>,
        keywords: Vec<String>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            store,
            dispatcher,
            keywords: Arc::new(keywords),
            fetch_timeout,
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Run the full pipeline for one target. A fetch or persist failure
    /// aborts this target only; a flag-update failure is logged and
    /// swallowed; dispatch failure is reported in the returned outcome.
    pub async fn scan_target(&self, target: &Target) -> Result<TargetReport, TargetFailure> {
        tracing::info!(url = %target.url, source = %target.source, "scanning target");

        let t0 = std::time::Instant::now();
        let raw = self
            .fetcher
            .fetch(&target.url, self.fetch_timeout)
            .await
            .map_err(TargetFailure::Fetch)?;
        histogram!("scan_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);

        let doc = extract(&raw, &target.url);
        let sample = self
            .store
            .create(NewSample {
                source: target.source.clone(),
                url: target.url.clone(),
                title: doc.title,
                content: doc.text,
                metadata: json!({ "length": doc.text_len }),
            })
            .await
            .map_err(TargetFailure::Persist)?;
        counter!("scan_samples_created_total").increment(1);

        // Match against what actually got persisted, not the raw extract.
        let matched = match_keywords(&sample.content, &self.keywords);
        if matched.is_empty() {
            tracing::info!(url = %sample.url, "no sensitive data found");
            return Ok(TargetReport {
                sample_id: sample.id,
                matched,
                alerted: false,
            });
        }

        // Best-effort flagging; a failure here never blocks the alert.
        if let Err(e) = self.store.flag(sample.id, true).await {
            tracing::warn!(error = ?e, id = sample.id, "failed to flag sample");
        }

        let event = AlertEvent {
            source: target.source.clone(),
            url: target.url.clone(),
            matched: matched.clone(),
            ts: Utc::now(),
        };
        let alerted = self.dispatcher.dispatch(&event).await;
        if alerted {
            tracing::info!(url = %event.url, keywords = ?matched, "alert dispatched");
        } else {
            tracing::warn!(url = %event.url, "alert dispatch failed");
        }

        Ok(TargetReport {
            sample_id: sample.id,
            matched,
            alerted,
        })
    }

    /// Drive one batch over `targets`, in list order. Each target's failure
    /// is contained here: logged with the target identity, counted, and the
    /// batch moves on.
    pub async fn run_tick(&self, targets: &[Target]) -> TickSummary {
        ensure_metrics_described();

        let mut summary = TickSummary::default();
        for target in targets {
            counter!("scan_targets_total").increment(1);
            match self.scan_target(target).await {
                Ok(report) => {
                    summary.scanned += 1;
                    if !report.matched.is_empty() {
                        if report.alerted {
                            summary.alerts_sent += 1;
                            counter!("scan_alerts_sent_total").increment(1);
                        } else {
                            summary.alerts_failed += 1;
                            counter!("scan_alerts_failed_total").increment(1);
                        }
                    }
                }
                Err(e) => {
                    summary.failed += 1;
                    counter!("scan_target_failures_total").increment(1);
                    tracing::warn!(
                        url = %target.url,
                        source = %target.source,
                        error = %e,
                        "target scan failed"
                    );
                }
            }
        }

        gauge!("scan_last_run_ts").set(Utc::now().timestamp().max(0) as f64);
        tracing::info!(
            scanned = summary.scanned,
            failed = summary.failed,
            alerts = summary.alerts_sent,
            "scan tick finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::store::MemoryStore;

    struct CannedFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl ContentFetcher for CannedFetcher {
        async fn fetch(&self, url: &str, _timeout: Duration) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow!("connection refused"))
        }
    }

    #[derive(Default)]
    struct RecordingDispatcher {
        calls: AtomicUsize,
        events: Mutex<Vec<AlertEvent>>,
    }

    #[async_trait]
    impl AlertDispatcher for RecordingDispatcher {
        async fn dispatch(&self, event: &AlertEvent) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.events.lock().unwrap().push(event.clone());
            true
        }
    }

    fn pipeline(
        pages: &[(&str, &str)],
        keywords: &[&str],
    ) -> (ScanPipeline, Arc<MemoryStore>, Arc<RecordingDispatcher>) {
        let fetcher = Arc::new(CannedFetcher {
            pages: pages
                .iter()
                .map(|(u, b)| (u.to_string(), b.to_string()))
                .collect(),
        });
        let store = Arc::new(MemoryStore::new());
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let p = ScanPipeline::new(
            fetcher,
            store.clone(),
            dispatcher.clone(),
            keywords.iter().map(|s| s.to_string()).collect(),
            Duration::from_secs(5),
        );
        (p, store, dispatcher)
    }

    #[tokio::test]
    async fn matching_target_is_flagged_and_alerted() {
        let (p, store, dispatcher) = pipeline(
            &[(
                "https://leaktest.example",
                "<title>dump</title><body>password leaked database</body>",
            )],
            &["password", "leak", "ssn"],
        );
        let report = p
            .scan_target(&Target::new("https://leaktest.example", "paste"))
            .await
            .unwrap();

        assert_eq!(report.matched, vec!["password", "leak"]);
        assert!(report.alerted);
        assert!(store.samples()[0].flagged);
        assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn clean_target_is_stored_unflagged_with_no_dispatch() {
        let (p, store, dispatcher) = pipeline(
            &[("https://ok.example", "<body>nothing to see</body>")],
            &["password"],
        );
        let report = p
            .scan_target(&Target::new("https://ok.example", "manual"))
            .await
            .unwrap();

        assert!(report.matched.is_empty());
        assert!(!report.alerted);
        assert!(!store.samples()[0].flagged);
        assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fetch_failure_creates_no_sample_and_no_alert() {
        let (p, store, dispatcher) = pipeline(&[], &["password"]);
        let err = p
            .scan_target(&Target::new("https://down.example", "manual"))
            .await
            .unwrap_err();

        assert!(matches!(err, TargetFailure::Fetch(_)));
        assert!(store.samples().is_empty());
        assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn one_bad_target_does_not_disturb_the_batch() {
        let (p, store, dispatcher) = pipeline(
            &[
                ("https://a.example", "<body>password here</body>"),
                ("https://c.example", "<body>clean</body>"),
            ],
            &["password"],
        );
        let targets = vec![
            Target::new("https://a.example", "paste"),
            Target::new("https://b.example", "forum"), // not served -> fetch fails
            Target::new("https://c.example", "manual"),
        ];
        let summary = p.run_tick(&targets).await;

        assert_eq!(summary.scanned, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.alerts_sent, 1);
        assert_eq!(store.samples().len(), 2);
        assert_eq!(dispatcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn metadata_records_untruncated_length() {
        let body = "z".repeat(40_000);
        let page = format!("<body>{body}</body>");
        let (p, store, _) = pipeline(&[("https://big.example", page.as_str())], &[]);
        p.scan_target(&Target::new("https://big.example", "paste"))
            .await
            .unwrap();

        let sample = &store.samples()[0];
        assert_eq!(sample.content.chars().count(), extractor::CONTENT_MAX_CHARS);
        assert_eq!(sample.metadata["length"], 40_000);
    }
}
