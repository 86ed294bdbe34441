//! 📦 Common data structures, the building blocks of wcx.
//!
//! 🎬 COLD OPEN: INT. SOMEBODY'S BLOG POST, 2:13 AM
//!
//! A paragraph sits in an `<article>` tag, minding its own business. It has no idea
//! that in about 400 milliseconds it will be fetched, shredded into words, filtered
//! against a dictionary, and reduced into a single number next to the word "the".
//! Actually "the" gets filtered out by nobody, it's three letters and alphabetic and in
//! every dictionary ever printed. "the" always wins. "the" is undefeated. 🦆
//!
//! This module holds the plain types that travel between the stages of the pipeline:
//! [`Target`]s out of the job list, [`LocalCounts`] out of each page, [`WordCount`]s
//! out of the top-K, and the [`ErrorReport`] that collects everything that went wrong
//! along the way without stopping anything.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

/// 📊 One document's worth of word tallies. Keys are filtered words, values are >= 1.
///
/// Produced by the page aggregator, shipped over the merge queue, consumed by the
/// reducer. Exactly one owner at a time, the borrow checker makes sure of that.
pub type LocalCounts = HashMap<String, u64>;

/// 🎯 One crawlable unit out of the job list: a URL (or whatever the line said),
/// or the error that happened while trying to read the next line.
///
/// Immutable once produced. The job worker makes them, the supervisor eats them,
/// nobody else gets a bite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// 📡 The identifier, usually a URL. Empty when `load_error` is set.
    pub id: String,
    /// 💀 Why this target could not be loaded, if it could not.
    pub load_error: Option<String>,
}

impl Target {
    /// 🚀 A perfectly healthy target. Go forth and be fetched.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            load_error: None,
        }
    }

    /// 💀 A target that is really just an error wearing a target costume.
    pub fn failed(load_error: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            load_error: Some(load_error.into()),
        }
    }

    /// 🔄 Either the identifier to visit, or the load error to report.
    pub fn unpack(self) -> Result<String, String> {
        match self.load_error {
            Some(err) => Err(err),
            None => Ok(self.id),
        }
    }
}

/// 🏆 A word and how many times it showed up. The atomic unit of bragging rights.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

impl WordCount {
    pub fn new(word: impl Into<String>, count: u64) -> Self {
        Self {
            word: word.into(),
            count,
        }
    }
}

/// 💀 Everything that went sideways, collected instead of thrown.
///
/// Two independent buckets:
/// - `load_errors`: the job list itself choked (order preserved, keyed by nothing)
/// - `scrape_errors`: a specific target could not be fetched or extracted, keyed by target
///
/// Append-only while the pipeline runs. Only read after the pipeline has drained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub load_errors: Vec<String>,
    pub scrape_errors: BTreeMap<String, String>,
}

impl ErrorReport {
    /// ✅ No news is good news.
    pub fn is_empty(&self) -> bool {
        self.load_errors.is_empty() && self.scrape_errors.is_empty()
    }

    /// 📋 Pretty JSON for the humans reading stderr.
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// 🎁 What a run hands back once every queue is closed and every task has gone home.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// 🏆 Tie-inclusive top-K, sorted by count descending (word ascending on ties).
    pub top_k: Vec<WordCount>,
    /// 📊 The full global mapping, every filtered word and its total.
    pub counts: HashMap<String, u64>,
    /// 💀 Load and scrape errors, reported alongside, never instead of, the result.
    pub errors: ErrorReport,
    /// 🛑 Whether the run stopped early because someone pulled the cord.
    pub cancelled: bool,
}

impl RunReport {
    /// 📋 The top-K as a JSON object, word → count. Keys come out sorted.
    pub fn top_k_json(&self) -> anyhow::Result<String> {
        let as_map: BTreeMap<&str, u64> = self
            .top_k
            .iter()
            .map(|entry| (entry.word.as_str(), entry.count))
            .collect();
        Ok(serde_json::to_string_pretty(&as_map)?)
    }
}
