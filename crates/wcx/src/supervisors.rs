//! 🎬 *[camera pans across a dimly lit server room]*
//! 🎬 "In a world where six spiders share one word count..."
//! 🎬 "One supervisor dared to keep score."
//! 🎬 *[record scratch]* 🦆
//!
//! 📦 The Supervisor: wires the job list, the word bank, the crawler and the reducer
//! together, then stands in the doorway until everyone is done.
//!
//! 🧠 The order of operations:
//! 1. open both documents (a missing word list or job list ends the run right here)
//! 2. start the BankWorker and the JobWorker
//! 3. wait for the bank; no bank, no crawl
//! 4. pull targets until the job queue closes or someone presses the big red button,
//!    dispatching each one to the crawler and writing load errors down
//! 5. drain the crawler, which closes the merge queue, then wait for the reducer
//! 6. materialize the tie-inclusive top-K
//!
//! ⚠️ The workers stay private. The supervisor is the only one who talks to them.

mod workers;

use anyhow::{Context, Result};
use async_channel::Receiver;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::app_config::AppConfig;
use crate::cancellation::Cancellation;
use crate::common::{ErrorReport, RunReport, Target};
use crate::crawler::Crawler;
use crate::documents::DocumentBackend;
use crate::fetchers::{FetcherBackend, HttpFetcher};
use crate::filters::FilterChain;
use crate::progress::CrawlProgress;
use workers::{BankWorker, JobWorker, ReducerWorker, Worker};

/// 📦 The Supervisor: asks "is it done yet?" so the workers don't have to.
#[derive(Debug)]
pub(crate) struct Supervisor {
    app_config: AppConfig,
    cancel: Cancellation,
    progress: CrawlProgress,
}

impl Supervisor {
    pub(crate) fn new(app_config: AppConfig, cancel: Cancellation) -> Self {
        let progress = if app_config.show_progress {
            CrawlProgress::new()
        } else {
            CrawlProgress::hidden()
        };
        Self {
            app_config,
            cancel,
            progress,
        }
    }

    /// 🚀 The whole run, from two document sources to one report.
    pub(crate) async fn run(&self) -> Result<RunReport> {
        let config = &self.app_config;
        info!(
            "🔧 using config:\n{}",
            serde_json::to_string_pretty(config).context("💀 The config refused to be written down.")?
        );
        if config.job_loader.cutoff > 0 {
            info!("✂️ loading partial pages: only the first {} targets will be crawled", config.job_loader.cutoff);
        }

        let client = reqwest::Client::builder()
            .build()
            .context("💀 The HTTP client for the documents refused to be born.")?;

        let bank_source = DocumentBackend::open(&config.word_bank_source, &client)
            .await
            .context("💀 Could not open the word bank")?;
        let bank = BankWorker::spawn(bank_source, FilterChain::prefilter(config.min_word_length), self.cancel.clone());

        let job_source = DocumentBackend::open(&config.job_list_source, &client)
            .await
            .context("💀 Could not open the job list")?;
        let (jobs_tx, jobs_rx) = async_channel::bounded(config.job_loader.effective_backpressure());
        let job_worker = JobWorker::new(jobs_tx, job_source, &config.job_loader, self.cancel.clone()).start();

        let bank = bank.resolve().await?;
        let filter = FilterChain::with_bank(FilterChain::prefilter(config.min_word_length), Arc::new(bank));
        let fetcher = HttpFetcher::new(&config.crawler)?;

        let report = self.crawl(jobs_rx, FetcherBackend::Http(fetcher), filter).await?;
        job_worker.await.context("💀 the JobWorker panicked")??;
        Ok(report)
    }

    /// 🕷️ Everything after the bank resolves: dispatch, drain, reduce, materialize.
    pub(crate) async fn crawl(&self, jobs: Receiver<Target>, fetcher: FetcherBackend, filter: FilterChain) -> Result<RunReport> {
        let config = &self.app_config;
        let (merge_tx, merge_rx) = async_channel::bounded(config.crawler.effective_merge_queue_capacity());
        let reducer = ReducerWorker::new(merge_rx, config.top_k, self.progress.clone()).start();
        let mut crawler = Crawler::new(
            fetcher,
            filter,
            &config.crawler,
            merge_tx,
            self.cancel.clone(),
            self.progress.clone(),
        );

        let mut load_errors = Vec::new();
        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            tokio::select! {
                next = jobs.recv() => match next {
                    Ok(target) => match target.unpack() {
                        Ok(id) => crawler.visit(id).await,
                        Err(load_error) => {
                            warn!("💀 could not load a target: {}", load_error);
                            load_errors.push(load_error);
                        }
                    },
                    Err(_) => {
                        debug!("📭 job queue closed, no more targets");
                        break;
                    }
                },
                _ = self.cancel.cancelled() => break,
            }
        }
        // -- 🚪 stop listening so a parked JobWorker notices and leaves
        drop(jobs);

        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            info!("🛑 cancelled, draining the {} visits already out the door", crawler.in_flight());
        }
        let scrape_errors = crawler.drain().await;
        let tally = reducer.await.context("💀 the ReducerWorker panicked")??;

        let report = RunReport {
            top_k: tally.top_k(config.top_k),
            counts: tally.into_counts(),
            errors: ErrorReport {
                load_errors,
                scrape_errors,
            },
            cancelled,
        };
        self.progress.finish();
        info!(
            "🏁 crawl finished: {} distinct words, {} load errors, {} scrape errors",
            report.counts.len(),
            report.errors.load_errors.len(),
            report.errors.scrape_errors.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::cancellation;
    use crate::common::WordCount;
    use crate::fetchers::InMemoryFetcher;
    use std::time::Duration;

    fn quiet_config(top_k: usize, parallelism: usize) -> AppConfig {
        let mut config = AppConfig {
            top_k,
            show_progress: false,
            ..Default::default()
        };
        config.crawler.parallelism = parallelism;
        config.crawler.request_timeout_ms = 5_000;
        config
    }

    fn queued(targets: Vec<Target>) -> Receiver<Target> {
        let (tx, rx) = async_channel::unbounded();
        for target in targets {
            // -- unbounded and the receiver is right here, so this can't fail
            tx.try_send(target).expect("💀 the test queue refused a target");
        }
        rx
    }

    #[tokio::test]
    async fn the_one_where_a_broken_line_does_not_stop_the_next_one() -> Result<()> {
        let fetcher = InMemoryFetcher::new()
            .with_page("https://a.example", ["apple banana"])
            .with_page("https://b.example", ["cherry"]);
        let jobs = queued(vec![
            Target::new("https://a.example"),
            Target::failed("line 2 is not UTF-8"),
            Target::new("https://b.example"),
        ]);
        let supervisor = Supervisor::new(quiet_config(10, 2), Cancellation::never());

        let report = supervisor
            .crawl(jobs, FetcherBackend::InMemory(fetcher), FilterChain::prefilter(3))
            .await?;

        assert_eq!(report.errors.load_errors, vec!["line 2 is not UTF-8".to_string()]);
        assert!(report.errors.scrape_errors.is_empty());
        assert_eq!(report.counts.get("cherry"), Some(&1));
        assert_eq!(report.counts.len(), 3);
        assert!(!report.cancelled);
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_the_tie_for_second_gets_two_medals() -> Result<()> {
        let fetcher = InMemoryFetcher::new()
            .with_page("one", ["alpha alpha bravo charlie", "delta"])
            .with_page("two", ["alpha bravo charlie"])
            .with_page("three", ["alpha bravo", "charlie"])
            .with_failure("four", "connection reset by peer");
        let jobs = queued(["one", "two", "three", "four"].into_iter().map(Target::new).collect());
        let supervisor = Supervisor::new(quiet_config(2, 3), Cancellation::never());

        let report = supervisor
            .crawl(jobs, FetcherBackend::InMemory(fetcher), FilterChain::prefilter(3))
            .await?;

        assert_eq!(
            report.top_k,
            vec![
                WordCount::new("alpha", 4),
                WordCount::new("bravo", 3),
                WordCount::new("charlie", 3),
            ]
        );
        assert_eq!(report.counts.get("delta"), Some(&1));
        assert!(report.errors.scrape_errors["four"].contains("connection reset"));
        assert_eq!(
            report.top_k_json()?,
            "{\n  \"alpha\": 4,\n  \"bravo\": 3,\n  \"charlie\": 3\n}"
        );
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_the_red_button_leaves_no_half_counted_pages() -> Result<()> {
        const DOCS: usize = 20;
        const FAST: usize = 2;
        const DISPATCHED: usize = 6;
        const REPEATS: usize = 50;

        // -- 🐇 the first FAST docs come back at once, the rest are still out when the button is pressed
        let mut fetcher = InMemoryFetcher::new().with_latency(Duration::from_millis(300));
        for i in 0..DOCS {
            let mut fragments = vec![format!("unique{i} ").repeat(REPEATS)];
            fragments.push("shared".to_string());
            fetcher = fetcher.with_page(format!("doc-{i}"), fragments);
        }
        for i in 0..FAST {
            fetcher = fetcher.with_latency_for(format!("doc-{i}"), Duration::ZERO);
        }

        let (button, cancel) = cancellation();
        let supervisor = Supervisor::new(quiet_config(5, 4), cancel);
        let progress = supervisor.progress.clone();
        let (tx, jobs) = async_channel::bounded(1);
        let feeder = tokio::spawn(async move {
            for i in 0..DISPATCHED {
                tx.send(Target::new(format!("doc-{i}"))).await?;
            }
            // -- ⏳ wait until the reducer has merged both fast pages, then pull the cord
            let merged_words = (FAST * (REPEATS + 1)) as u64;
            tokio::time::timeout(Duration::from_secs(5), async {
                while progress.snapshot().words < merged_words {
                    tokio::time::sleep(Duration::from_millis(2)).await;
                }
            })
            .await?;
            button.cancel();
            // -- 🧍 keep the queue open so cancellation, not closure, ends the loop
            tokio::time::sleep(Duration::from_millis(50)).await;
            anyhow::Ok(())
        });

        let report = supervisor
            .crawl(jobs, FetcherBackend::InMemory(fetcher), FilterChain::all(Vec::new()))
            .await?;
        feeder.await??;

        assert!(report.cancelled);
        let mut whole_pages = 0u64;
        for i in 0..DOCS {
            let count = report.counts.get(&format!("unique{i}")).copied().unwrap_or(0);
            if i < FAST {
                assert_eq!(count, REPEATS as u64, "doc-{i} finished before the cancel and must be kept");
            } else if i < DISPATCHED {
                assert!(count == 0 || count == REPEATS as u64, "doc-{i} was half counted: {count}");
            } else {
                assert_eq!(count, 0, "doc-{i} was never dispatched");
            }
            if count > 0 {
                whole_pages += 1;
            }
        }
        assert!(whole_pages >= FAST as u64);
        assert_eq!(report.counts.get("shared").copied().unwrap_or(0), whole_pages);
        assert!(report.errors.is_empty(), "cancellation is not an error: {:?}", report.errors);
        Ok(())
    }
}
