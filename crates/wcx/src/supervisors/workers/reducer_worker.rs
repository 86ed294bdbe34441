//! 🧮 The ReducerWorker: the one task allowed to touch the global counts.
//!
//! 🎬 *[thousands of little word maps arrive in envelopes. one accountant opens them all.]*
//!
//! Every page's local tallies come through the merge queue and land here, one map at a
//! time. Nobody else holds a `&mut` to the global state, so there is nothing to lock.
//! When the merge queue is closed and empty, the worker hands its [`Tally`] back
//! through its join handle. That handle resolving is the "reducer is done" signal.

use std::collections::HashMap;

use anyhow::Result;
use async_channel::Receiver;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::Worker;
use crate::common::{LocalCounts, WordCount};
use crate::progress::CrawlProgress;
use crate::top_k::{TopKSelector, materialize};

/// 📒 The global word counts plus the streaming top-K candidates.
#[derive(Debug, Clone)]
pub(crate) struct Tally {
    counts: HashMap<String, u64>,
    leaders: TopKSelector,
}

impl Tally {
    pub(crate) fn new(k: usize) -> Self {
        Self {
            counts: HashMap::new(),
            leaders: TopKSelector::new(k),
        }
    }

    /// ➕ Fold one page's counts in. Returns how many word occurrences were added.
    ///
    /// Addition commutes, so the order pages arrive in never changes the totals.
    pub(crate) fn merge(&mut self, local: LocalCounts) -> u64 {
        let mut added = 0;
        for (word, delta) in local {
            added += delta;
            let new_count = match self.counts.get_mut(&word) {
                Some(total) => {
                    *total += delta;
                    *total
                }
                None => {
                    self.counts.insert(word.clone(), delta);
                    delta
                }
            };
            self.leaders.offer(&word, new_count);
        }
        added
    }

    pub(crate) fn counts(&self) -> &HashMap<String, u64> {
        &self.counts
    }

    /// 🏃 The streaming candidates. Can miss words tied at the margin; use [`Tally::top_k`]
    /// for the real answer.
    pub(crate) fn leaders(&self) -> &TopKSelector {
        &self.leaders
    }

    /// 🏁 The exact, tie-inclusive answer over everything merged so far.
    pub(crate) fn top_k(&self, k: usize) -> Vec<WordCount> {
        materialize(&self.counts, k)
    }

    pub(crate) fn into_counts(self) -> HashMap<String, u64> {
        self.counts
    }
}

#[derive(Debug)]
pub(crate) struct ReducerWorker {
    rx: Receiver<LocalCounts>,
    tally: Tally,
    progress: CrawlProgress,
}

impl ReducerWorker {
    pub(crate) fn new(rx: Receiver<LocalCounts>, top_k: usize, progress: CrawlProgress) -> Self {
        Self {
            rx,
            tally: Tally::new(top_k),
            progress,
        }
    }
}

impl Worker for ReducerWorker {
    type Output = Tally;

    fn start(mut self) -> JoinHandle<Result<Tally>> {
        tokio::spawn(async move {
            debug!("🧮 ReducerWorker started draining the merge queue...");
            let mut pages = 0usize;
            while let Ok(local) = self.rx.recv().await {
                pages += 1;
                trace!("🧮 ReducerWorker merging {} distinct words", local.len());
                let added = self.tally.merge(local);
                self.progress.words_counted(added);
            }
            debug!(
                "🏁 ReducerWorker: merge queue closed after {} pages, {} distinct words, weakest leader {:?}",
                pages,
                self.tally.counts().len(),
                self.tally.leaders().peek_min()
            );
            Ok(self.tally)
        })
    }
}
