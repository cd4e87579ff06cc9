//! Named diagnostic values (operating points, characteristics).

use indexmap::IndexMap;

/// Insertion-ordered map of named scalars.
///
/// Lookups of missing names yield 0.0; these values are reported, never used
/// for control flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMap {
    values: IndexMap<String, f64>,
}

impl ValueMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value, or 0.0 if it was never recorded.
    pub fn get(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(0.0)
    }

    /// Set a value, inserting it if missing.
    pub fn set(&mut self, name: &str, value: f64) {
        match self.values.get_mut(name) {
            Some(v) => *v = value,
            None => {
                self.values.insert(name.to_string(), value);
            }
        }
    }

    /// Record a value unless one with this name already exists.
    pub fn add(&mut self, name: impl Into<String>, value: f64) {
        self.values.entry(name.into()).or_insert(value);
    }

    /// Check whether a value was recorded.
    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of recorded values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Remove every value.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
