//! 📖 WordBank: the dictionary that decides which words are real words.
//!
//! Written once (while the bank worker streams a reference word list into it),
//! read a few million times afterwards (by the filter chain, from every fetch task).
//! After construction nobody mutates it, so it travels around in an `Arc` and
//! never needs a lock.

use std::collections::{HashMap, HashSet};

/// 📖 A set of words. That's it. That's the struct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordBank {
    words: HashSet<String>,
}

impl WordBank {
    /// 🫙 An empty bank. Rejects everything, which is a kind of integrity.
    pub fn new() -> Self {
        Self::default()
    }

    /// 🔑 A bank built from the keys of an existing map.
    pub fn from_keys<V>(map: &HashMap<String, V>) -> Self {
        map.keys().cloned().collect()
    }

    /// 🔑 A bank built from the values of an existing map.
    pub fn from_values<K>(map: &HashMap<K, String>) -> Self {
        map.values().cloned().collect()
    }

    /// ➕ Adds a word. Adding it again changes nothing.
    pub fn add(&mut self, word: impl Into<String>) {
        self.words.insert(word.into());
    }

    /// 🔍 Case-sensitive membership, exactly as tokenized.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for WordBank {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            words: iter.into_iter().map(Into::into).collect(),
        }
    }
}
