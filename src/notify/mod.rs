// src/notify/mod.rs
pub mod telegram;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// One detection, as handed to a dispatcher. Transient: built when the
/// matcher finds keywords, discarded after dispatch.
#[derive(Debug, Clone)]
pub struct AlertEvent {
    pub source: String,
    pub url: String,
    pub matched: Vec<String>, // keyword-list order, no duplicates
    pub ts: DateTime<Utc>,
}

/// Outbound notification seam. One method, boolean outcome, never raises:
/// alerting is best-effort and the pipeline never treats a failed dispatch
/// as fatal. Tests substitute a recording implementation.
#[async_trait]
pub trait AlertDispatcher: Send + Sync {
    async fn dispatch(&self, event: &AlertEvent) -> bool;
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Render the Telegram-HTML alert body: banner, keywords, URL, source,
/// detection timestamp.
pub fn render_message(ev: &AlertEvent) -> String {
    format!(
        "\u{1F6A8} <b>Alert:</b> Sensitive keywords found!\n\
         <b>Keywords:</b> {}\n\
         <b>URL:</b> {}\n\
         <b>Source:</b> {}\n\
         <b>Detected at:</b> {}",
        ev.matched.join(", "),
        ev.url,
        title_case(&ev.source),
        ev.ts.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}
