//! In-memory translation bundle for one locale.

use std::collections::HashMap;

/// A single translation record.
///
/// `used` is never read from or written to disk: it starts `false` every run
/// and is only flipped by the key allocator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationEntry {
    pub key: String,
    pub text: String,
    pub description: String,
    /// Closure message fingerprint, preserved when present.
    pub id: Option<String>,
    /// Source file attribute written by some generators, preserved when present.
    pub source: Option<String>,
    pub used: bool,
}

impl TranslationEntry {
    pub fn new(
        key: impl Into<String>,
        text: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
            description: description.into(),
            id: None,
            source: None,
            used: false,
        }
    }
}

/// Ordered set of translation records for one locale.
///
/// Keys are unique. Insertion order is kept so that rewriting an unchanged
/// bundle produces identical output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bundle {
    pub lang: String,
    entries: Vec<TranslationEntry>,
    positions: HashMap<String, usize>,
}

impl Bundle {
    pub fn new(lang: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    pub fn entries(&self) -> &[TranslationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&TranslationEntry> {
        self.positions.get(key).map(|&i| &self.entries[i])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }

    /// Append a record. Returns the rejected entry if the key already exists.
    pub fn push(&mut self, entry: TranslationEntry) -> Result<(), TranslationEntry> {
        if self.positions.contains_key(&entry.key) {
            return Err(entry);
        }
        self.positions.insert(entry.key.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Replace the record with the same key in place, or append it.
    pub fn upsert(&mut self, entry: TranslationEntry) {
        match self.positions.get(&entry.key) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.positions.insert(entry.key.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Keep only the records matching `keep`, returning the removed ones in order.
    pub fn retain_by<F>(&mut self, mut keep: F) -> Vec<TranslationEntry>
    where
        F: FnMut(&TranslationEntry) -> bool,
    {
        let (kept, removed): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| keep(entry));
        self.entries = kept;
        self.reindex();
        removed
    }

    fn reindex(&mut self) {
        self.positions = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.key.clone(), i))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::core::bundle::*;

    #[test]
    fn test_push_rejects_duplicate_key() {
        let mut bundle = Bundle::new("en");
        assert!(bundle.push(TranslationEntry::new("MSG_A_0", "A", "a")).is_ok());

        let rejected = bundle
            .push(TranslationEntry::new("MSG_A_0", "other", "a"))
            .unwrap_err();

        assert_eq!(rejected.text, "other");
        assert_eq!(bundle.len(), 1);
        assert_eq!(bundle.get("MSG_A_0").unwrap().text, "A");
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut bundle = Bundle::new("en");
        bundle.upsert(TranslationEntry::new("MSG_A_0", "A", "a"));
        bundle.upsert(TranslationEntry::new("MSG_A_1", "B", "b"));
        bundle.upsert(TranslationEntry::new("MSG_A_0", "A2", "a"));

        let keys: Vec<&str> = bundle.entries().iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["MSG_A_0", "MSG_A_1"]);
        assert_eq!(bundle.get("MSG_A_0").unwrap().text, "A2");
    }

    #[test]
    fn test_retain_by_keeps_lookup_consistent() {
        let mut bundle = Bundle::new("en");
        for key in ["MSG_A_0", "MSG_A_1", "MSG_A_2"] {
            bundle.upsert(TranslationEntry::new(key, key, ""));
        }

        let removed = bundle.retain_by(|e| e.key != "MSG_A_1");

        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].key, "MSG_A_1");
        assert!(!bundle.contains_key("MSG_A_1"));
        assert_eq!(bundle.get("MSG_A_2").unwrap().key, "MSG_A_2");
    }
}
