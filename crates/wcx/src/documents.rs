//! 📜 Documents: where the job list and the word list come from, one line at a time.
//!
//! 🎭 This module is the casting agency for line-oriented inputs. Need to read from a
//! local file? A URL? A `Vec<String>` you made up in a test? We've got a backend for that.
//!
//! 🧠 Knowledge graph:
//! - [`LineSource`]: the trait. `next_line()` until it says `None`.
//! - [`DocumentBackend`]: the enum that dispatches to the concrete backends.
//! - [`DocumentBackend::open`]: `http://` / `https://` → HTTP, anything else → file path.
//! - Opening can fail (404, missing file, no network). That's fatal for the run.
//!   Reading can fail too (bad UTF-8, connection reset mid-stream). That's the caller's call.
//!
//! 🦆 The duck reads one line at a time. The duck has never been overwhelmed.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

pub(crate) mod file_lines;
pub(crate) mod http_lines;
pub(crate) mod in_mem_lines;

pub(crate) use file_lines::FileLines;
pub(crate) use http_lines::HttpLines;
pub(crate) use in_mem_lines::InMemoryLines;

/// 📜 A source of text lines, consumed front to back exactly once.
///
/// # Contract
/// - `Ok(Some(line))` while lines remain, without the trailing `\n` / `\r\n`
/// - `Ok(None)` once the document is exhausted, and on every call after that
/// - `Err(..)` when the next line could not be decoded or read
#[async_trait]
pub(crate) trait LineSource: std::fmt::Debug + Send {
    async fn next_line(&mut self) -> Result<Option<String>>;
}

/// 🎭 The many faces of a document.
#[derive(Debug)]
pub(crate) enum DocumentBackend {
    File(FileLines),
    Http(HttpLines),
    InMemory(InMemoryLines),
}

impl DocumentBackend {
    /// 🚀 Opens `source` as a URL when it looks like one, as a file path otherwise.
    pub(crate) async fn open(source: &str, client: &reqwest::Client) -> Result<Self> {
        if is_remote(source) {
            info!("📡 streaming document from {}", source);
            let lines = HttpLines::open(client, source)
                .await
                .with_context(|| format!("💀 Could not start streaming '{source}'. The URL did not answer the way URLs are supposed to."))?;
            Ok(Self::Http(lines))
        } else {
            info!("📂 reading document from {}", source);
            let lines = FileLines::open(source)
                .await
                .with_context(|| format!("💀 Could not open '{source}' as a local file. Check the path, check the cwd, check your assumptions."))?;
            Ok(Self::File(lines))
        }
    }
}

fn is_remote(source: &str) -> bool {
    let lowered = source.trim_start().to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}

#[async_trait]
impl LineSource for DocumentBackend {
    async fn next_line(&mut self) -> Result<Option<String>> {
        match self {
            DocumentBackend::File(f) => f.next_line().await,
            DocumentBackend::Http(h) => h.next_line().await,
            DocumentBackend::InMemory(m) => m.next_line().await,
        }
    }
}

/// ✂️ Drops one trailing `\n` and then one trailing `\r`, and nothing else.
pub(crate) fn strip_line_ending(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}
