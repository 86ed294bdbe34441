//! 📖 The BankWorker: reads the reference word list and builds the [`WordBank`].
//!
//! 🎬 *[a librarian receives four hundred thousand words. she files each one. she does not read them.]*
//!
//! The bank is a hard prerequisite for the crawl's filter chain, so the worker hands it
//! over through a one-shot channel wrapped in a [`BankFuture`]. Three ways this ends:
//! - the list is read to the end: the bank is sent, the future resolves with it
//! - cancellation shows up mid-scan: nothing is sent, the future resolves to an error
//! - a line can't be read or decoded: nothing is sent, the future resolves to that error
//!
//! An empty word list is a perfectly valid (if sad) empty bank. "Never resolved" is not
//! the same thing, and the caller has to treat it as fatal.

use anyhow::{Context, Result, bail};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::Worker;
use crate::cancellation::Cancellation;
use crate::documents::{DocumentBackend, LineSource};
use crate::filters::{FilterChain, WordFilter};
use crate::word_bank::WordBank;

#[derive(Debug)]
pub(crate) struct BankWorker {
    source: DocumentBackend,
    filter: FilterChain,
    cancel: Cancellation,
    tx: oneshot::Sender<WordBank>,
}

impl BankWorker {
    /// 🏗️ `filter` must not depend on the bank itself. Length and alphabet checks only,
    /// unless you enjoy chicken-and-egg problems.
    pub(crate) fn new(source: DocumentBackend, filter: FilterChain, cancel: Cancellation, tx: oneshot::Sender<WordBank>) -> Self {
        Self {
            source,
            filter,
            cancel,
            tx,
        }
    }

    /// 🚀 Wire up the one-shot, start the worker, and hand back the future end.
    pub(crate) fn spawn(source: DocumentBackend, filter: FilterChain, cancel: Cancellation) -> BankFuture {
        let (tx, rx) = oneshot::channel();
        let handle = Self::new(source, filter, cancel, tx).start();
        BankFuture { rx, handle }
    }
}

impl Worker for BankWorker {
    type Output = ();

    fn start(mut self) -> JoinHandle<Result<()>> {
        tokio::spawn(async move {
            debug!("📖 BankWorker started reading the word list...");
            let mut bank = WordBank::new();
            let mut line_number = 0usize;
            loop {
                if self.cancel.is_cancelled() {
                    debug!("🛑 BankWorker: cancelled at line {}, the bank stays unresolved", line_number);
                    return Ok(());
                }
                let line = self
                    .source
                    .next_line()
                    .await
                    .with_context(|| format!("💀 BankWorker could not read line {} of the word list", line_number + 1))?;
                let Some(line) = line else {
                    break;
                };
                line_number += 1;
                for token in line.split_whitespace() {
                    if self.cancel.is_cancelled() {
                        debug!("🛑 BankWorker: cancelled mid-line {}, the bank stays unresolved", line_number);
                        return Ok(());
                    }
                    if self.filter.accept(token) {
                        bank.add(token);
                    }
                }
            }

            info!("📖 word bank loaded: {} words from {} lines", bank.len(), line_number);
            if self.tx.send(bank).is_err() {
                debug!("🤷 BankWorker: nobody was waiting for the bank anymore");
            }
            Ok(())
        })
    }
}

/// ⏳ A word bank that hasn't arrived yet. Resolves exactly once.
#[derive(Debug)]
pub(crate) struct BankFuture {
    rx: oneshot::Receiver<WordBank>,
    handle: JoinHandle<Result<()>>,
}

impl BankFuture {
    /// 📬 Wait for the bank. An error here means the bank was never built; it does
    /// not mean the bank is empty.
    pub(crate) async fn resolve(self) -> Result<WordBank> {
        let BankFuture { rx, handle } = self;
        if let Ok(bank) = rx.await {
            return Ok(bank);
        }
        // -- 🔍 the sender was dropped unsent, ask the worker why
        match handle.await.context("💀 the word bank loader panicked")? {
            Err(err) => Err(err.context("💀 the word bank did not resolve")),
            Ok(()) => bail!("💀 the word bank did not resolve: cancelled before the word list was fully read"),
        }
    }
}
