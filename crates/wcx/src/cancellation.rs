//! 🛑 Cooperative cancellation: a polite tap on the shoulder, never a tackle.
//!
//! Every long-running loop in wcx checks [`Cancellation::is_cancelled`] at a well-defined
//! point (before emitting a target, before scanning a token) and wanders off quietly when
//! it comes back `true`. In-flight fetches are never aborted, only new work stops.
//!
//! Built on a `tokio::sync::watch` channel holding a single `bool`. Once it flips to
//! `true` it stays `true`. There is no un-cancel. Much like sending an email.

use tokio::sync::watch;

/// 🔴 The big red button. Hold on to it; dropping it does NOT cancel anything.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// 👂 The ear that listens for the big red button. Cheap to clone, hand it to everyone.
#[derive(Debug, Clone)]
pub struct Cancellation {
    rx: watch::Receiver<bool>,
}

/// 🚀 A fresh button and its first listener.
pub fn cancellation() -> (CancelHandle, Cancellation) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, Cancellation { rx })
}

impl CancelHandle {
    /// 🛑 Press it. Idempotent. Pressing it twice does not cancel harder.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// 👂 Another listener for the same button.
    pub fn listener(&self) -> Cancellation {
        Cancellation {
            rx: self.tx.subscribe(),
        }
    }
}

impl Cancellation {
    /// 🧘 A listener whose button has already been thrown into the sea. Never fires.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    /// 🔍 Non-blocking check. Safe to call in a hot loop.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// ⏳ Resolves once cancellation is requested. Pends forever if the handle is gone.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            // -- 💤 the sender dropped without cancelling, so nothing will ever cancel us
            std::future::pending::<()>().await;
        }
    }
}
