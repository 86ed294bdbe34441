//! 🎬 *[a job list scrolls by. each line is a URL. each URL is a promise.]*
//!
//! 📜 The JobWorker: reads the job list line by line and pushes one [`Target`] per
//! non-blank line into a bounded channel.
//!
//! 🧠 Knowledge graph:
//! - Backpressure is the channel's capacity. When it's full, `send` parks the worker.
//! - `cutoff > 0` stops after that many targets. `0` means read until the well runs dry.
//! - Cancellation is checked before every emission (non-blocking) and raced against
//!   every parked `send`. Targets already in the queue stay there; nothing is retracted.
//! - A read/decode error becomes one final `Target::failed(..)` and then the stream ends.
//! - The end of the stream is the channel closing (the sender dropping), never a sentinel.

use anyhow::Result;
use async_channel::Sender;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::Worker;
use crate::app_config::JobLoaderConfig;
use crate::cancellation::Cancellation;
use crate::common::Target;
use crate::documents::{DocumentBackend, LineSource};

#[derive(Debug)]
pub(crate) struct JobWorker {
    tx: Sender<Target>,
    source: DocumentBackend,
    cutoff: usize,
    cancel: Cancellation,
}

impl JobWorker {
    /// 🏗️ The caller owns the receiving end; the capacity of `tx` is the backpressure.
    pub(crate) fn new(tx: Sender<Target>, source: DocumentBackend, config: &JobLoaderConfig, cancel: Cancellation) -> Self {
        Self {
            tx,
            source,
            cutoff: config.cutoff,
            cancel,
        }
    }
}

/// 📬 Ships one target, unless cancellation or a vanished consumer gets there first.
/// Returns `false` when the worker should stop.
async fn emit(tx: &Sender<Target>, cancel: &Cancellation, target: Target) -> bool {
    tokio::select! {
        sent = tx.send(target) => sent.is_ok(),
        _ = cancel.cancelled() => false,
    }
}

impl Worker for JobWorker {
    type Output = ();

    fn start(mut self) -> JoinHandle<Result<()>> {
        tokio::spawn(async move {
            debug!("📜 JobWorker started streaming targets...");
            let mut emitted = 0usize;
            loop {
                if self.cutoff > 0 && emitted >= self.cutoff {
                    info!("✂️ JobWorker: cutoff of {} targets reached, the rest of the list stays unread", self.cutoff);
                    break;
                }
                if self.cancel.is_cancelled() {
                    debug!("🛑 JobWorker: cancelled after {} targets", emitted);
                    break;
                }
                match self.source.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        if !emit(&self.tx, &self.cancel, Target::new(line)).await {
                            debug!("🛑 JobWorker: nobody is listening anymore, stopping after {} targets", emitted);
                            break;
                        }
                        emitted += 1;
                    }
                    Ok(None) => {
                        debug!("🏁 JobWorker: job list exhausted after {} targets", emitted);
                        break;
                    }
                    Err(err) => {
                        warn!("💀 JobWorker: could not read the next target: {:#}", err);
                        emit(&self.tx, &self.cancel, Target::failed(format!("{err:#}"))).await;
                        break;
                    }
                }
            }
            // -- 🚪 dropping `self` drops the sender, which is how the consumer learns we're done
            Ok(())
        })
    }
}
