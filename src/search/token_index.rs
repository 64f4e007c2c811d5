//! Sorted word-token table answering prefix lookups over artist or album names.

use std::collections::HashMap;
use std::ops::Range;

use crate::model::CatalogEntry;

/// Splits a display name or query into normalized words.
///
/// Words are lowercased and `-` counts as a separator, so "Jean-Michel" yields
/// `["jean", "michel"]`.
pub fn normalize_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace('-', " ")
        .split_whitespace()
        .map(ToOwned::to_owned)
        .collect()
}

/// A normalized word and the ids of every entity whose name contains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub ids: Vec<String>,
}

/// Immutable token table sorted by `value`; each value appears once.
#[derive(Debug, Clone, Default)]
pub struct TokenIndex {
    tokens: Vec<Token>,
}

impl TokenIndex {
    pub fn build(entries: &[CatalogEntry]) -> Self {
        let mut buckets: HashMap<String, Vec<String>> = HashMap::new();
        for entry in entries {
            for word in normalize_words(&entry.name) {
                buckets.entry(word).or_default().push(entry.url.clone());
            }
        }
        let mut tokens: Vec<Token> = buckets
            .into_iter()
            .map(|(value, ids)| Token { value, ids })
            .collect();
        tokens.sort_unstable_by(|left, right| left.value.cmp(&right.value));
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[cfg(test)]
    pub fn token(&self, position: usize) -> Option<&Token> {
        self.tokens.get(position)
    }

    /// Returns the positions of every token starting with `text`.
    ///
    /// Tokens sharing a prefix are contiguous in sorted order, so the match set
    /// is a range. `text` must be non-empty.
    pub fn prefix_search(&self, text: &str) -> Range<usize> {
        let Some(hit) = self.find_any_prefixed(text) else {
            return 0..0;
        };
        let mut start = hit;
        while start > 0 && self.tokens[start - 1].value.starts_with(text) {
            start -= 1;
        }
        let mut end = hit + 1;
        while end < self.tokens.len() && self.tokens[end].value.starts_with(text) {
            end += 1;
        }
        start..end
    }

    /// Sorted, deduplicated union of the posting lists at `positions`.
    pub fn ids_at(&self, positions: Range<usize>) -> Vec<String> {
        let mut ids: Vec<String> = self.tokens[positions]
            .iter()
            .flat_map(|token| token.ids.iter().cloned())
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    // Lands on any token having `text` as prefix; not necessarily the first one.
    fn find_any_prefixed(&self, text: &str) -> Option<usize> {
        let mut low = 0usize;
        let mut high = self.tokens.len();
        while low < high {
            let mid = low + (high - low) / 2;
            let value = self.tokens[mid].value.as_str();
            if value.starts_with(text) {
                return Some(mid);
            }
            if value < text {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        None
    }
}
