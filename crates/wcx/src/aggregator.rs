//! 🧮 Page aggregation: fragments in, one document's word tallies out.
//!
//! Runs on whatever task fetched the page; it is not scheduled separately.
//! Tokens are whitespace-separated runs, checked against the filter chain, and
//! counted in a local map that starts every word at zero the first time it's seen.
//!
//! If cancellation shows up halfway through, the half-counted page is thrown away.
//! A page is merged whole or not at all.

use tracing::trace;

use crate::cancellation::Cancellation;
use crate::common::LocalCounts;
use crate::filters::WordFilter;

/// 🧮 Tally every accepted token across `fragments`.
///
/// Returns `None` when cancellation was observed mid-scan; the partial map is dropped.
pub fn aggregate_page<S, F>(fragments: &[S], filter: &F, cancel: &Cancellation) -> Option<LocalCounts>
where
    S: AsRef<str>,
    F: WordFilter + ?Sized,
{
    let mut local = LocalCounts::new();
    for fragment in fragments {
        for token in fragment.as_ref().split_whitespace() {
            if cancel.is_cancelled() {
                trace!("🛑 cancelled mid-page, dropping {} partial tallies", local.len());
                return None;
            }
            if filter.accept(token) {
                *local.entry(token.to_owned()).or_default() += 1;
            }
        }
    }
    Some(local)
}
