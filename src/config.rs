// src/config.rs
//
// Process-wide configuration, read once at startup. Environment variables
// keep the names the deployment already uses (USE_TOR, TOR_SOCKS,
// TELEGRAM_*); the target and keyword lists come from config files in TOML
// or JSON form, with env-var path overrides and built-in fallbacks.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::scan::types::Target;

pub const ENV_TARGETS_PATH: &str = "SCAN_TARGETS_PATH";
pub const ENV_KEYWORDS_PATH: &str = "SCAN_KEYWORDS_PATH";

const DEFAULT_INTERVAL_SECS: u64 = 600; // 10 minutes
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TOR_SOCKS: &str = "socks5h://127.0.0.1:9050";

/// Sensitive keywords scanned for when no keywords file is configured.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "password",
    "credit card",
    "leak",
    "ssn",
    "credentials",
    "bank",
    "exploit",
    "ransomware",
    "private key",
    "data breach",
];

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub enabled: bool,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub interval: Duration,
    pub fetch_timeout: Duration,
    pub proxy: ProxyConfig,
}

impl MonitorConfig {
    /// Read scheduler/fetch settings from the environment, with defaults
    /// matching the reference deployment (10 min ticks, 30 s fetches).
    pub fn from_env() -> Self {
        let interval = env_u64("SCAN_INTERVAL_SECS").unwrap_or(DEFAULT_INTERVAL_SECS);
        let fetch_timeout =
            env_u64("FETCH_TIMEOUT_SECS").unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);
        let enabled = std::env::var("USE_TOR")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);
        let url =
            std::env::var("TOR_SOCKS").unwrap_or_else(|_| DEFAULT_TOR_SOCKS.to_string());

        Self {
            interval: Duration::from_secs(interval),
            fetch_timeout: Duration::from_secs(fetch_timeout),
            proxy: ProxyConfig { enabled, url },
        }
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

// ---- target list ----

/// Load targets from an explicit path. Supports TOML or JSON formats.
pub fn load_targets_from(path: &Path) -> Result<Vec<Target>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading targets from {}", path.display()))?;
    parse_targets(&content, ext_of(path).as_str())
}

/// Load targets using env var + fallback:
/// 1) $SCAN_TARGETS_PATH
/// 2) config/targets.toml
pub fn load_targets_default() -> Result<Vec<Target>> {
    if let Ok(p) = std::env::var(ENV_TARGETS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_targets_from(&pb);
        }
        return Err(anyhow!("SCAN_TARGETS_PATH points to non-existent path"));
    }
    let toml_p = PathBuf::from("config/targets.toml");
    if toml_p.exists() {
        return load_targets_from(&toml_p);
    }
    Ok(Vec::new())
}

fn parse_targets(s: &str, hint_ext: &str) -> Result<Vec<Target>> {
    #[derive(Deserialize)]
    struct TomlTargets {
        targets: Vec<Target>,
    }
    if hint_ext == "toml" || s.contains("targets") {
        if let Ok(v) = toml::from_str::<TomlTargets>(s) {
            return Ok(clean_targets(v.targets));
        }
    }
    if let Ok(v) = serde_json::from_str::<Vec<Target>>(s) {
        return Ok(clean_targets(v));
    }
    Err(anyhow!("unsupported targets format"))
}

fn clean_targets(items: Vec<Target>) -> Vec<Target> {
    items
        .into_iter()
        .filter(|t| !t.url.trim().is_empty())
        .collect()
}

// ---- keyword list ----

/// Load keywords from an explicit path. Supports TOML or JSON formats.
pub fn load_keywords_from(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading keywords from {}", path.display()))?;
    parse_keywords(&content, ext_of(path).as_str())
}

/// Load keywords using env var + fallbacks:
/// 1) $SCAN_KEYWORDS_PATH
/// 2) config/keywords.toml
/// 3) built-in DEFAULT_KEYWORDS
pub fn load_keywords_default() -> Result<Vec<String>> {
    if let Ok(p) = std::env::var(ENV_KEYWORDS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_keywords_from(&pb);
        }
        return Err(anyhow!("SCAN_KEYWORDS_PATH points to non-existent path"));
    }
    let toml_p = PathBuf::from("config/keywords.toml");
    if toml_p.exists() {
        return load_keywords_from(&toml_p);
    }
    Ok(DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect())
}

fn parse_keywords(s: &str, hint_ext: &str) -> Result<Vec<String>> {
    #[derive(Deserialize)]
    struct TomlKw {
        keywords: Vec<String>,
    }
    if hint_ext == "toml" || s.contains("keywords") {
        if let Ok(v) = toml::from_str::<TomlKw>(s) {
            return Ok(clean_keywords(v.keywords));
        }
    }
    if let Ok(v) = serde_json::from_str::<Vec<String>>(s) {
        return Ok(clean_keywords(v));
    }
    Err(anyhow!("unsupported keywords format"))
}

/// Trim and drop empties; declaration order is preserved (it defines match
/// order downstream), duplicates removed keeping the first occurrence.
fn clean_keywords(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim();
        if !t.is_empty() && !out.iter().any(|x| x == t) {
            out.push(t.to_string());
        }
    }
    out
}

fn ext_of(path: &Path) -> String {
    path.extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}
