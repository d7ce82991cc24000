//! Live key tracking.
//!
//! Keys become live in two ways: the allocator hands them out for a template
//! placeholder, or a raw source file mentions them directly (for example a
//! controller that reads `MSG_FOO_5` at runtime).

use std::collections::HashSet;

use regex::Regex;

/// Set of keys that are live in the current run.
///
/// Keys are only ever added. Call [`UsageTracker::finish`] once every
/// template and raw source has been processed to get the set pruning uses.
#[derive(Debug, Default)]
pub struct UsageTracker {
    used: HashSet<String>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the key was not already live.
    pub fn mark_used(&mut self, key: impl Into<String>) -> bool {
        self.used.insert(key.into())
    }

    pub fn is_used(&self, key: &str) -> bool {
        self.used.contains(key)
    }

    pub fn all_used(&self) -> &HashSet<String> {
        &self.used
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    pub fn finish(self) -> LiveSet {
        LiveSet(self.used)
    }
}

impl<S: Into<String>> Extend<S> for UsageTracker {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        for key in iter {
            self.mark_used(key);
        }
    }
}

/// Frozen set of live keys. Only obtainable from a finished tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveSet(HashSet<String>);

impl LiveSet {
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Finds direct key references (`MSG_` followed by word characters) in raw
/// source text.
#[derive(Debug, Clone)]
pub struct KeyReferenceScanner {
    pattern: Regex,
}

impl KeyReferenceScanner {
    pub fn new(prefix: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!("{}[0-9A-Za-z_]+", regex::escape(prefix)))?;
        Ok(Self { pattern })
    }

    /// Every reference in `source`, in order, duplicates included.
    pub fn references<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pattern.find_iter(source).map(|m| m.as_str())
    }

    /// Distinct references in `source`.
    pub fn collect_references(&self, source: &str) -> HashSet<String> {
        self.references(source).map(str::to_string).collect()
    }
}
