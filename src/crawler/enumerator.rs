//! Query enumeration
//!
//! Prefixes are drawn from an ordered alphabet. The top-level sequence is the
//! full cross product at a fixed length, ordered with the first character as
//! the outermost loop (`AA, AB, ..., A9, BA, ...`). Saturated prefixes are
//! refined by appending each alphabet character in order.

use crate::config::{CrawlConfig, DEFAULT_ALPHABET};

/// Ordered set of characters used to build search prefixes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    /// Creates an alphabet from characters in the order they should be tried
    pub fn new(chars: impl IntoIterator<Item = char>) -> Self {
        Self {
            chars: chars.into_iter().collect(),
        }
    }

    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(config.alphabet_chars())
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Number of prefixes of exactly `length` characters
    pub fn prefix_count(&self, length: usize) -> usize {
        u32::try_from(length)
            .ok()
            .and_then(|exp| self.chars.len().checked_pow(exp))
            .unwrap_or(usize::MAX)
    }

    /// Lazily yields every prefix of `length` characters in alphabet order
    ///
    /// Each call starts a fresh sequence.
    ///
    /// # Example
    ///
    /// ```
    /// use ticker_sweep::crawler::Alphabet;
    ///
    /// let alphabet = Alphabet::new(['A', 'B']);
    /// let prefixes: Vec<String> = alphabet.prefixes(2).collect();
    /// assert_eq!(prefixes, ["AA", "AB", "BA", "BB"]);
    /// ```
    pub fn prefixes(&self, length: usize) -> PrefixSequence<'_> {
        PrefixSequence {
            alphabet: self,
            indices: vec![0; length],
            exhausted: length == 0 || self.chars.is_empty(),
            lead: None,
        }
    }

    /// Yields `prefix` extended by each alphabet character, in order
    pub fn extensions<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = String> + 'a {
        self.chars.iter().map(move |c| {
            let mut extended = String::with_capacity(prefix.len() + c.len_utf8());
            extended.push_str(prefix);
            extended.push(*c);
            extended
        })
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHABET.chars())
    }
}

/// Lazy, finite sequence of fixed-length prefixes
///
/// Works like an odometer: the last position turns fastest, the first
/// position slowest.
#[derive(Debug, Clone)]
pub struct PrefixSequence<'a> {
    alphabet: &'a Alphabet,
    indices: Vec<usize>,
    exhausted: bool,
    lead: Option<char>,
}

impl PrefixSequence<'_> {
    /// Outer character of the prefix most recently yielded
    pub fn current_lead(&self) -> Option<char> {
        self.lead
    }
}

impl Iterator for PrefixSequence<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.exhausted {
            return None;
        }

        let chars = self.alphabet.chars();
        let prefix: String = self.indices.iter().map(|&i| chars[i]).collect();
        self.lead = prefix.chars().next();

        // Advance, carrying into more significant positions
        let mut position = self.indices.len();
        loop {
            if position == 0 {
                self.exhausted = true;
                break;
            }
            position -= 1;
            self.indices[position] += 1;
            if self.indices[position] < chars.len() {
                break;
            }
            self.indices[position] = 0;
        }

        Some(prefix)
    }
}
