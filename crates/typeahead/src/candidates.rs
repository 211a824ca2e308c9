//! Candidate store: the latest accepted fetch result, keyed by label.

use indexmap::IndexMap;

/// Mapping from formatted label to candidate value.
///
/// The store is rebuilt wholesale by [`CandidateStore::replace`] and has no
/// other mutating operation. Iteration follows the order in which the source
/// returned the candidates; a label repeated within one result keeps its
/// first position but takes the value of its last occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateStore<T> {
    entries: IndexMap<String, T>,
}

impl<T> Default for CandidateStore<T> {
    fn default() -> Self {
        Self { entries: IndexMap::new() }
    }
}

impl<T> CandidateStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the store and repopulate it from `(label, value)` pairs.
    pub fn replace<I>(&mut self, labeled_values: I)
    where
        I: IntoIterator<Item = (String, T)>,
    {
        self.entries.clear();
        for (label, value) in labeled_values {
            self.entries.insert(label, value);
        }
    }

    /// Exact-match lookup of `text` as a label.
    pub fn resolve(&self, text: &str) -> Option<&T> {
        self.entries.get(text)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(label, value)| (label.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
