//! Message header collection.

use std::ops::Index;

/// Collection of message headers.
///
/// Keys are kept exactly as they appear in the archive (case-sensitive) and
/// iterate in order of first appearance. Each key maps to the ordered list of
/// its value lines: the first value from the `key: value` line, followed by
/// one entry per continuation line with its leading whitespace intact. A key
/// repeated later in the block appends to the existing entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Headers {
    entries: Vec<(String, Vec<String>)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds a value under `name`, returning the entry's index.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> usize {
        let name = name.into();
        let value = value.into();
        if let Some(index) = self.position(&name) {
            self.entries[index].1.push(value);
            index
        } else {
            self.entries.push((name, vec![value]));
            self.entries.len() - 1
        }
    }

    /// Appends a continuation value to the entry at `index`.
    pub(crate) fn extend_at(&mut self, index: usize, value: String) {
        if let Some((_, values)) = self.entries.get_mut(index) {
            values.push(value);
        }
    }

    /// Gets all values for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.position(name).map(|i| self.entries[i].1.as_slice())
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|values| values.first().map(String::as_str))
    }

    /// Returns true if the header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no headers are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns an iterator over the keys in order of first appearance.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Returns an iterator over `(key, values)` in order of first appearance.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }
}

impl Index<&str> for Headers {
    type Output = [String];

    /// # Panics
    ///
    /// Panics if the header is not present.
    fn index(&self, name: &str) -> &Self::Output {
        self.get(name)
            .unwrap_or_else(|| panic!("header {name:?} not present"))
    }
}
