//! 🔌 Fetchers: the part that actually talks to the internet.
//!
//! 🎬 *[a URL walks into a bar. the bar returns 200 OK and a lot of `<div>`s.]*
//!
//! A fetcher takes one target and returns the text fragments that matched the
//! selection query, or an error for that one target. That's the entire contract.
//! It does not count words, cap concurrency, or keep score; the
//! [`Crawler`](crate::crawler::Crawler) wraps it and handles all that.
//!
//! Backends:
//! - [`HttpFetcher`]: `reqwest` + `scraper`, the real deal
//! - [`InMemoryFetcher`]: canned pages and canned failures, for tests
//!
//! ⚠️ Failures are per target. One 500 never takes down its siblings.

use anyhow::Result;
use async_trait::async_trait;

pub(crate) mod http_fetcher;
pub(crate) mod in_mem_fetcher;

pub use http_fetcher::HttpFetcher;
pub use in_mem_fetcher::InMemoryFetcher;

/// 🕸️ One target in, matching text fragments out.
#[async_trait]
pub trait Fetcher: std::fmt::Debug + Send + Sync {
    async fn fetch(&self, target: &str) -> Result<Vec<String>>;
}

/// 🎭 The many faces of a fetcher. The crawler never needs to know which one it got.
#[derive(Debug)]
pub enum FetcherBackend {
    Http(HttpFetcher),
    InMemory(InMemoryFetcher),
}

#[async_trait]
impl Fetcher for FetcherBackend {
    async fn fetch(&self, target: &str) -> Result<Vec<String>> {
        match self {
            FetcherBackend::Http(f) => f.fetch(target).await,
            FetcherBackend::InMemory(f) => f.fetch(target).await,
        }
    }
}
