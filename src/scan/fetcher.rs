// src/scan/fetcher.rs
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::config::ProxyConfig;

const USER_AGENT: &str = "DarkwebMonitorBot/2.0 (+https://github.com/darkweb-monitor)";

/// Retrieves raw content for one target URL. Abstracted so the pipeline can
/// be driven by a canned fetcher in tests.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch the body at `url`, bounded by `timeout`. Any transport error or
    /// non-2xx status is an `Err`; nothing past the `Result` boundary.
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String>;
}

/// Shared reqwest-backed fetcher, built once at process start. When the
/// proxy toggle is on, every request is routed through the configured
/// SOCKS proxy (`socks5h` so DNS resolves on the proxy side too).
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(proxy: &ProxyConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if proxy.enabled {
            let p = reqwest::Proxy::all(&proxy.url)
                .with_context(|| format!("invalid proxy url {}", proxy.url))?;
            builder = builder.proxy(p);
        }
        let client = builder.build().context("building http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ContentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("non-2xx from {url}"))?;
        resp.text().await.with_context(|| format!("reading body of {url}"))
    }
}
