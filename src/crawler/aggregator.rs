//! Global symbol set
//!
//! The set only grows. Merging is a plain union, so it is idempotent and the
//! order in which prefixes are merged does not matter.

use crate::crawler::parser::Symbol;
use std::collections::BTreeSet;

/// Deduplicating accumulator of every symbol seen during a crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolSet {
    symbols: BTreeSet<Symbol>,
}

impl SymbolSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one symbol, trimming it first
    ///
    /// Returns true if the symbol was not already present. Blank input is
    /// ignored.
    pub fn insert(&mut self, symbol: &str) -> bool {
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return false;
        }
        self.symbols.insert(symbol.to_string())
    }

    /// Folds `incoming` into the set and returns how many symbols were new
    pub fn merge<I, T>(&mut self, incoming: I) -> usize
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        incoming
            .into_iter()
            .filter(|symbol| self.insert(symbol.as_ref()))
            .count()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    /// Iterates the symbols in ascending order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }
}

impl<T: AsRef<str>> FromIterator<T> for SymbolSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.merge(iter);
        set
    }
}

impl<T: AsRef<str>> Extend<T> for SymbolSet {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.merge(iter);
    }
}

impl IntoIterator for SymbolSet {
    type Item = Symbol;
    type IntoIter = std::collections::btree_set::IntoIter<Symbol>;

    fn into_iter(self) -> Self::IntoIter {
        self.symbols.into_iter()
    }
}
