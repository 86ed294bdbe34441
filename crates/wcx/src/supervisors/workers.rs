//! 🧵 Workers: the backbone of wcx, the ones who actually do the work while the
//! Supervisor takes all the credit in the sprint retro.
//!
//! Three of them, each a single spawned task:
//! - [`JobWorker`]: streams the job list into the bounded job queue
//! - [`BankWorker`]: streams the reference word list into a [`WordBank`](crate::word_bank::WordBank)
//!   and hands it over through a one-shot [`BankFuture`]
//! - [`ReducerWorker`]: the one and only writer of the global counts and the top-K
//!
//! They talk through channels. None of them shares a mutable anything with anyone. 🦆

use anyhow::Result;
use tokio::task::JoinHandle;

mod bank_worker;
mod job_worker;
mod reducer_worker;

pub(crate) use bank_worker::{BankFuture, BankWorker};
pub(crate) use job_worker::JobWorker;
pub(crate) use reducer_worker::ReducerWorker;

/// 🏗️ A background worker, that does work. duh.
///
/// `start` consumes the worker and spawns it. The handle resolves exactly once, with
/// whatever the worker produced when it ran out of things to do.
pub(crate) trait Worker {
    type Output: Send + 'static;

    fn start(self) -> JoinHandle<Result<Self::Output>>;
}
