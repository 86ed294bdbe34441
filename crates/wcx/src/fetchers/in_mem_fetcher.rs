//! 🧪 In-memory fetcher: a map of target → canned fragments (or canned failure).
//!
//! ⚠️ This is NOT for production. This is for tests. Unknown targets fail like a 404 would.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Result, bail};
use async_trait::async_trait;

use super::Fetcher;

#[derive(Debug, Clone)]
enum CannedPage {
    Fragments(Vec<String>),
    Failure(String),
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryFetcher {
    pages: HashMap<String, CannedPage>,
    latency: Option<Duration>,
    latencies: HashMap<String, Duration>,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 📄 `target` will answer with these fragments.
    pub fn with_page<I, S>(mut self, target: impl Into<String>, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fragments = fragments.into_iter().map(Into::into).collect();
        self.pages.insert(target.into(), CannedPage::Fragments(fragments));
        self
    }

    /// 💀 `target` will fail with this message.
    pub fn with_failure(mut self, target: impl Into<String>, error: impl Into<String>) -> Self {
        self.pages.insert(target.into(), CannedPage::Failure(error.into()));
        self
    }

    /// 🐢 Every fetch sleeps this long first. Handy for timeouts and overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// 🐌 Only `target` sleeps this long. Wins over [`InMemoryFetcher::with_latency`].
    pub fn with_latency_for(mut self, target: impl Into<String>, latency: Duration) -> Self {
        self.latencies.insert(target.into(), latency);
        self
    }
}

#[async_trait]
impl Fetcher for InMemoryFetcher {
    async fn fetch(&self, target: &str) -> Result<Vec<String>> {
        if let Some(latency) = self.latencies.get(target).copied().or(self.latency) {
            tokio::time::sleep(latency).await;
        }
        match self.pages.get(target) {
            Some(CannedPage::Fragments(fragments)) => Ok(fragments.clone()),
            Some(CannedPage::Failure(error)) => bail!("{error}"),
            None => bail!("💀 no canned page for {target}"),
        }
    }
}
