//! 📊 progress.rs: "Are we there yet?" Every crawl, every time, forever.
//!
//! 🚀 A spinner with a small comfy table under it: how many targets went out, how many
//! came back with words, how many came back with excuses, and how many words we've
//! counted so far.
//!
//! ⚠️ Watching this spinner will not make the internet faster. We've tried.
//!
//! Counters are atomics so every fetch task can bump them without asking anyone.
//! Cloning a [`CrawlProgress`] clones the `Arc`, not the numbers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::NOTHING};
use indicatif::{ProgressBar, ProgressStyle};

/// ⏱️ MM:SS, or HH:MM:SS if you should probably go outside.
fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

#[derive(Debug, Default)]
struct Counters {
    dispatched: AtomicU64,
    fetched: AtomicU64,
    failed: AtomicU64,
    words: AtomicU64,
}

/// 📸 A frozen copy of the counters, for logs and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub dispatched: u64,
    pub fetched: u64,
    pub failed: u64,
    pub words: u64,
}

#[derive(Clone)]
pub struct CrawlProgress {
    counters: Arc<Counters>,
    spinner: ProgressBar,
    start_time: Instant,
}

impl std::fmt::Debug for CrawlProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // -- 🎭 ProgressBar is a diva and doesn't derive Debug, so the snapshot speaks for it
        f.debug_struct("CrawlProgress")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

impl CrawlProgress {
    /// 🎨 A visible spinner on stderr, ticking on its own.
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} crawling\n{msg}") {
            spinner.set_style(style);
        }
        spinner.enable_steady_tick(Duration::from_millis(120));
        Self::with_bar(spinner)
    }

    /// 🙈 Same counters, nothing drawn. Tests and pipes prefer this one.
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(spinner: ProgressBar) -> Self {
        Self {
            counters: Arc::new(Counters::default()),
            spinner,
            start_time: Instant::now(),
        }
    }

    pub fn target_dispatched(&self) {
        self.counters.dispatched.fetch_add(1, Ordering::Relaxed);
        self.render();
    }

    pub fn page_fetched(&self) {
        self.counters.fetched.fetch_add(1, Ordering::Relaxed);
        self.render();
    }

    pub fn page_failed(&self) {
        self.counters.failed.fetch_add(1, Ordering::Relaxed);
        self.render();
    }

    pub fn words_counted(&self, words: u64) {
        self.counters.words.fetch_add(words, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            dispatched: self.counters.dispatched.load(Ordering::Relaxed),
            fetched: self.counters.fetched.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            words: self.counters.words.load(Ordering::Relaxed),
        }
    }

    /// ✅ Stop the spinner and leave the last table on screen.
    pub fn finish(&self) {
        self.render();
        self.spinner.finish();
    }

    fn render(&self) {
        if self.spinner.is_hidden() {
            return;
        }
        let snapshot = self.snapshot();
        let elapsed = self.start_time.elapsed();
        let finished = snapshot.fetched + snapshot.failed;
        let pages_per_sec = if elapsed.as_secs_f64() > 0.0 {
            finished as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        // 🍽️ borderless two-column table, right aligned, same as it ever was
        let mut table = Table::new();
        table.load_preset(NOTHING);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.add_row(vec![
            Cell::new(format!("{} dispatched", snapshot.dispatched)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{} fetched", snapshot.fetched)).set_alignment(CellAlignment::Right),
        ]);
        table.add_row(vec![
            Cell::new(format!("{} failed", snapshot.failed)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{} words", snapshot.words)).set_alignment(CellAlignment::Right),
        ]);
        table.add_row(vec![
            Cell::new(format!("{:.2} pages/s", pages_per_sec)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{} elapsed", format_duration(elapsed))).set_alignment(CellAlignment::Right),
        ]);
        self.spinner.set_message(table.to_string());
    }
}

impl Default for CrawlProgress {
    fn default() -> Self {
        Self::new()
    }
}
