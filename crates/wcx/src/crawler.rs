//! 🕷️ The Crawler: `visit(target)` to send one out, `drain()` to wait for everyone to come home.
//!
//! 🎬 *[six spiders. six hundred URLs. one semaphore with a clipboard at the door.]*
//!
//! Each visit is its own task. It waits for one of the P permits, fetches under the
//! request timeout, runs the page through [`aggregate_page`] right there on its own
//! task, and pushes the non-empty local tallies into the merge queue. The permit is held
//! until that push completes, so a full merge queue slows the crawl down instead of
//! piling up finished pages in memory.
//!
//! 🧠 Knowledge graph:
//! - the semaphore is acquired inside the spawned task, so up to `PENDING_PER_PERMIT * P`
//!   visits may be parked waiting for a permit; past that, `visit` waits for one to finish,
//!   which pushes back on the job queue instead of piling up tasks
//! - failures (fetch errors, timeouts) are per target and go to a failure mailbox
//! - cancellation does not abort in-flight fetches; it only makes the aggregator drop
//!   the page it is scanning
//! - `drain` consumes the crawler: once it returns, no visit is running, this crawler's
//!   merge sender is gone, and every failure has been collected
//!
//! 🦆 The duck waits by the door with the clipboard. The duck lets exactly P spiders out.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_channel::{Receiver, Sender};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, trace, warn};

use crate::aggregator::aggregate_page;
use crate::app_config::CrawlerConfig;
use crate::cancellation::Cancellation;
use crate::common::LocalCounts;
use crate::fetchers::{Fetcher, FetcherBackend};
use crate::filters::FilterChain;
use crate::progress::CrawlProgress;

type Failure = (String, String);

/// 🅿️ Parked visits allowed per permit before `visit` starts waiting.
const PENDING_PER_PERMIT: usize = 4;

#[derive(Debug)]
pub struct Crawler {
    fetcher: Arc<FetcherBackend>,
    filter: Arc<FilterChain>,
    permits: Arc<Semaphore>,
    max_pending: usize,
    request_timeout: Duration,
    merge_tx: Sender<LocalCounts>,
    failures_tx: Sender<Failure>,
    failures_rx: Receiver<Failure>,
    visits: JoinSet<()>,
    cancel: Cancellation,
    progress: CrawlProgress,
}

impl Crawler {
    /// 🏗️ `merge_tx` is the producer end of the merge queue the reducer is reading.
    pub fn new(
        fetcher: FetcherBackend,
        filter: FilterChain,
        config: &CrawlerConfig,
        merge_tx: Sender<LocalCounts>,
        cancel: Cancellation,
        progress: CrawlProgress,
    ) -> Self {
        let (failures_tx, failures_rx) = async_channel::unbounded();
        let parallelism = config.parallelism.max(1);
        Self {
            fetcher: Arc::new(fetcher),
            filter: Arc::new(filter),
            permits: Arc::new(Semaphore::new(parallelism)),
            max_pending: parallelism * PENDING_PER_PERMIT,
            request_timeout: Duration::from_millis(config.request_timeout_ms),
            merge_tx,
            failures_tx,
            failures_rx,
            visits: JoinSet::new(),
            cancel,
            progress,
        }
    }

    /// 🧵 Visits dispatched but not yet reaped. Includes the ones still waiting for a permit.
    pub fn in_flight(&self) -> usize {
        self.visits.len()
    }

    /// 🚀 Dispatch one target. The visit runs on its own task; this only waits when
    /// too many visits are already parked.
    pub async fn visit(&mut self, target: String) {
        // -- 🧹 reap whatever already finished so the set doesn't grow with the job list
        while let Some(done) = self.visits.try_join_next() {
            report_panicked_visit(done);
        }
        while self.visits.len() >= self.max_pending {
            match self.visits.join_next().await {
                Some(done) => report_panicked_visit(done),
                None => break,
            }
        }

        self.progress.target_dispatched();
        let fetcher = Arc::clone(&self.fetcher);
        let filter = Arc::clone(&self.filter);
        let permits = Arc::clone(&self.permits);
        let request_timeout = self.request_timeout;
        let merge_tx = self.merge_tx.clone();
        let failures_tx = self.failures_tx.clone();
        let cancel = self.cancel.clone();
        let progress = self.progress.clone();

        self.visits.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                // -- the semaphore is never closed, but if it were there'd be nothing to do
                return;
            };
            trace!("🕷️ visiting {}", target);

            let fragments = match tokio::time::timeout(request_timeout, fetcher.fetch(&target)).await {
                Ok(Ok(fragments)) => fragments,
                Ok(Err(err)) => {
                    let reason = format!("{err:#}");
                    warn!("💀 could not scrape {}: {}", target, reason);
                    progress.page_failed();
                    mail_failure(&failures_tx, target, reason);
                    return;
                }
                Err(_) => {
                    let reason = format!("timed out after {}ms", request_timeout.as_millis());
                    warn!("⏱️ could not scrape {}: {}", target, reason);
                    progress.page_failed();
                    mail_failure(&failures_tx, target, reason);
                    return;
                }
            };
            progress.page_fetched();

            let Some(local) = aggregate_page(&fragments, filter.as_ref(), &cancel) else {
                debug!("🛑 dropped the half-counted page from {}", target);
                return;
            };
            if local.is_empty() {
                trace!("🫥 nothing worth counting on {}", target);
                return;
            }
            if merge_tx.send(local).await.is_err() {
                warn!("💀 the merge queue closed before {} could be merged", target);
            }
        });
    }

    /// ⏳ Wait for every dispatched visit to finish, close this crawler's side of the merge
    /// queue, and return the per-target failures.
    pub async fn drain(mut self) -> BTreeMap<String, String> {
        debug!("⏳ draining {} visits", self.visits.len());
        while let Some(done) = self.visits.join_next().await {
            report_panicked_visit(done);
        }

        let Crawler {
            merge_tx,
            failures_tx,
            failures_rx,
            ..
        } = self;
        drop(merge_tx);
        drop(failures_tx);

        let mut scrape_errors = BTreeMap::new();
        while let Ok((target, reason)) = failures_rx.try_recv() {
            scrape_errors.insert(target, reason);
        }
        debug!("🏁 crawler drained, {} targets failed", scrape_errors.len());
        scrape_errors
    }
}

fn mail_failure(failures_tx: &Sender<Failure>, target: String, reason: String) {
    // -- unbounded and the crawler holds the receiver, so this only fails after drain
    if let Err(err) = failures_tx.try_send((target, reason)) {
        warn!("💀 lost a scrape failure report: {}", err);
    }
}

fn report_panicked_visit(done: Result<(), JoinError>) {
    if let Err(err) = done {
        warn!("💀 a visit task died without reporting back: {}", err);
    }
}
