//! 🕷️ wcx: crawl a list of pages, count the words worth counting, report the top K.
//!
//! 🎬 *[a job list, a dictionary, and six HTTP requests walk into a bar]*
//!
//! The moving parts, leaves first:
//! - [`filters`]: composable `accept(word) -> bool` predicates
//! - [`word_bank`]: the dictionary the filters check against
//! - `documents` (private): line-by-line readers over files, URLs and test fixtures
//! - [`fetchers`]: one target in, matching text fragments out
//! - [`aggregator`]: one page's fragments in, one page's word tallies out
//! - [`crawler`]: bounded-parallelism visits, timeouts, failure collection
//! - [`top_k`]: the streaming candidate heap and the exact tie-inclusive answer
//! - the supervisor and its workers (private): everything above, wired together
//!
//! Call [`run`] with an [`AppConfig`] and a [`Cancellation`] and get a [`RunReport`] back.

use anyhow::{Context, Result};

pub mod aggregator;
pub mod app_config;
pub mod cancellation;
pub mod common;
pub mod crawler;
pub(crate) mod documents;
pub mod fetchers;
pub mod filters;
pub mod progress;
pub(crate) mod supervisors;
pub mod top_k;
pub mod word_bank;

pub use app_config::{AppConfig, CrawlerConfig, JobLoaderConfig, load_config};
pub use cancellation::{CancelHandle, Cancellation, cancellation};
pub use common::{ErrorReport, RunReport, WordCount};

use supervisors::Supervisor;

/// 🚀 One complete crawl: load the word bank, stream the job list, count, report.
///
/// Fatal: a source that can't be opened, a word bank that never resolves.
/// Not fatal: everything per target, which ends up in [`RunReport::errors`].
/// Cancellation is not an error either; the report comes back with `cancelled` set.
pub async fn run(app_config: AppConfig, cancel: Cancellation) -> Result<RunReport> {
    let supervisor = Supervisor::new(app_config, cancel);
    supervisor.run().await.context("💀 The crawl did not make it to the end")
}
