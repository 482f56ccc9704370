use indexmap::IndexMap;
use indexmap::map::{Iter, Keys, Values};
use serde::{Deserialize, Serialize};

/// A map that remembers insertion order.
///
/// Used wherever the model's ordering is observable: character maps are
/// grouped in first-seen order, and histograms report keys in encounter
/// order unless explicitly sorted. Serializes as a JSON object with keys in
/// iteration order.
pub type OrderedMap<K, V> = IndexMap<K, V>;

/// Count histogram keyed by label, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Histogram(IndexMap<String, usize>);

impl Histogram {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one to the count for `key`.
    pub fn bump(&mut self, key: &str) {
        match self.0.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                self.0.insert(key.to_string(), 1);
            }
        }
    }

    /// Sorts by descending count; ties keep first-seen order.
    pub fn sort_by_count_desc(&mut self) {
        self.0.sort_by(|_, a, _, b| b.cmp(a));
    }

    /// Sum of all counts.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&usize> {
        self.0.get(key)
    }

    pub fn iter(&self) -> Iter<'_, String, usize> {
        self.0.iter()
    }

    pub fn keys(&self) -> Keys<'_, String, usize> {
        self.0.keys()
    }

    pub fn values(&self) -> Values<'_, String, usize> {
        self.0.values()
    }
}
