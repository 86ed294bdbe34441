//! 📡 The HTTP fetcher: GET the page, parse the HTML, pull out the text under the selector.
//!
//! One hop only. Links are never followed, robots.txt is never consulted, and every
//! request carries the configured timeout. Each element matching the selection query
//! becomes one fragment: the concatenation of all its descendant text nodes.

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::trace;

use super::Fetcher;
use crate::app_config::CrawlerConfig;

#[derive(Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    selector: Selector,
}

impl HttpFetcher {
    /// 🚀 Builds the client and compiles the selector. A bad selector fails here, not per page.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("💀 The HTTP client refused to be born. Probably the TLS stack having a moment.")?;
        Self::with_client(client, &config.selection_query)
    }

    pub fn with_client(client: reqwest::Client, selection_query: &str) -> Result<Self> {
        let selector = Selector::parse(selection_query)
            .map_err(|err| anyhow!("💀 '{selection_query}' is not a selector we can use: {err}"))?;
        Ok(Self { client, selector })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, target: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .get(target)
            .send()
            .await
            .with_context(|| format!("💀 GET {target} failed before a status code showed up"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("💀 GET {target} answered {status}");
        }
        let body = response
            .text()
            .await
            .with_context(|| format!("💀 GET {target} sent headers and then lost the plot on the body"))?;
        let fragments = extract_fragments(&body, &self.selector);
        trace!("🕸️ {} fragments from {}", fragments.len(), target);
        Ok(fragments)
    }
}

/// 🧵 Text of every element matching `selector`, in document order.
///
/// Sync on purpose: `scraper::Html` is not `Send`, so it must never live across an `.await`.
pub(crate) fn extract_fragments(html: &str, selector: &Selector) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(selector)
        .map(|element| element.text().collect::<String>())
        .collect()
}
