//! 🧹 Word filters: small predicates that decide whether a token gets counted.
//!
//! 🎬 *[a token approaches the velvet rope]*
//! *["Name?" "foo1." "You have a digit in your name. Not tonight."]*
//!
//! Three primitives and one way to glue them together:
//! - [`MinLength`]: too short, go home
//! - [`AlphaOnly`]: letters only, full Unicode, not just ASCII
//! - [`InBank`]: must appear in the [`WordBank`]
//! - [`FilterChain::all`]: every child must say yes, evaluated in order, stops at the first no
//!
//! Order changes speed, never the answer. Put the cheap checks before the bank lookup.
//! All filters are pure; they see words exactly as the tokenizer produced them.

use std::sync::Arc;

use crate::word_bank::WordBank;

/// 🎯 A predicate over a word. `true` means "count it".
pub trait WordFilter: Send + Sync + std::fmt::Debug {
    fn accept(&self, word: &str) -> bool;
}

/// 📏 Rejects words shorter than N characters (Unicode scalar values, not bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinLength(pub usize);

impl WordFilter for MinLength {
    fn accept(&self, word: &str) -> bool {
        // -- 🚀 byte length is an upper bound on char count, so short-circuit the obvious rejects
        word.len() >= self.0 && word.chars().count() >= self.0
    }
}

/// 🔤 Rejects any word containing a code point that is not a letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlphaOnly;

impl WordFilter for AlphaOnly {
    fn accept(&self, word: &str) -> bool {
        word.chars().all(char::is_alphabetic)
    }
}

/// 📖 Accepts only words present in the bank.
#[derive(Debug, Clone)]
pub struct InBank(pub Arc<WordBank>);

impl WordFilter for InBank {
    fn accept(&self, word: &str) -> bool {
        self.0.contains(word)
    }
}

/// 🎭 The many faces of a filter, dispatched without a vtable.
///
/// Same trick as the backend enums: the chain is a tree of concrete filters and
/// `accept` just matches on the variant.
#[derive(Debug, Clone)]
pub enum FilterChain {
    MinLength(MinLength),
    AlphaOnly(AlphaOnly),
    InBank(InBank),
    All(Vec<FilterChain>),
}

impl FilterChain {
    pub fn min_length(n: usize) -> Self {
        Self::MinLength(MinLength(n))
    }

    pub fn alpha_only() -> Self {
        Self::AlphaOnly(AlphaOnly)
    }

    pub fn in_bank(bank: Arc<WordBank>) -> Self {
        Self::InBank(InBank(bank))
    }

    /// 🔗 Every child must accept. Empty chain accepts everything.
    pub fn all(filters: impl IntoIterator<Item = FilterChain>) -> Self {
        Self::All(filters.into_iter().collect())
    }

    /// 🧹 Length + alphabet, the bank-free prefilter used while the bank is still loading.
    pub fn prefilter(min_word_length: usize) -> Self {
        Self::all([Self::min_length(min_word_length), Self::alpha_only()])
    }

    /// 🏁 The full chain the crawler runs: the prefilter first, the bank lookup last.
    pub fn with_bank(prefilter: FilterChain, bank: Arc<WordBank>) -> Self {
        Self::all([prefilter, Self::in_bank(bank)])
    }
}

impl WordFilter for FilterChain {
    fn accept(&self, word: &str) -> bool {
        match self {
            FilterChain::MinLength(f) => f.accept(word),
            FilterChain::AlphaOnly(f) => f.accept(word),
            FilterChain::InBank(f) => f.accept(word),
            FilterChain::All(children) => children.iter().all(|child| child.accept(word)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank_of(words: &[&str]) -> Arc<WordBank> {
        Arc::new(words.iter().copied().collect())
    }

    #[test]
    fn the_one_where_the_bank_filter_knows_its_friends() {
        let filter = InBank(bank_of(&["hello", "world"]));
        assert!(filter.accept("hello"));
        assert!(filter.accept("world"));
        assert!(!filter.accept("foo"));
    }

    #[test]
    fn the_one_where_short_words_are_turned_away() {
        let filter = MinLength(3);
        assert!(filter.accept("foo"));
        assert!(filter.accept("foobar"));
        assert!(!filter.accept("fo"));
    }

    #[test]
    fn the_one_where_min_length_counts_characters_not_bytes() {
        // -- "été" is 3 chars and 5 bytes; "日本" is 2 chars and 6 bytes
        let filter = MinLength(3);
        assert!(filter.accept("été"));
        assert!(!filter.accept("日本"));
    }

    #[test]
    fn the_one_where_digits_are_not_letters() {
        let filter = AlphaOnly;
        assert!(filter.accept("foo"));
        assert!(filter.accept("foobar"));
        assert!(!filter.accept("foo1"));
        assert!(!filter.accept("don't"));
    }

    #[test]
    fn the_one_where_letters_from_everywhere_are_still_letters() {
        let filter = AlphaOnly;
        assert!(filter.accept("naïve"));
        assert!(filter.accept("Straße"));
        assert!(filter.accept("привет"));
        assert!(filter.accept("日本語"));
    }

    #[test]
    fn the_one_where_the_aggregate_needs_everyone_to_agree() {
        let bank = bank_of(&["foo", "fo", "bar", "foo1"]);
        let filter = FilterChain::with_bank(FilterChain::prefilter(3), bank);

        assert!(filter.accept("foo"));
        assert!(filter.accept("bar"));
        // -- not in the bank
        assert!(!filter.accept("foobar"));
        // -- in the bank and long enough, but has a digit
        assert!(!filter.accept("foo1"));
        // -- in the bank and alphabetic, but too short
        assert!(!filter.accept("fo"));
    }

    #[test]
    fn the_one_where_order_changes_nothing_but_speed() {
        let bank = bank_of(&["alpha", "be", "gamma2"]);
        let cheap_first = FilterChain::all([
            FilterChain::min_length(3),
            FilterChain::alpha_only(),
            FilterChain::in_bank(bank.clone()),
        ]);
        let bank_first = FilterChain::all([
            FilterChain::in_bank(bank),
            FilterChain::alpha_only(),
            FilterChain::min_length(3),
        ]);
        for word in ["alpha", "be", "gamma2", "delta", ""] {
            assert_eq!(cheap_first.accept(word), bank_first.accept(word), "disagreement on {word:?}");
        }
    }

    #[test]
    fn the_one_where_an_empty_chain_is_a_pushover() {
        assert!(FilterChain::all(Vec::new()).accept("anything123"));
    }
}
