//! Reuse index built from a previously generated bundle.

use std::collections::HashMap;

use crate::core::{bundle::Bundle, namespace::Namespace};

/// A stored record that can be claimed by a new placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedEntry {
    pub ordinal: u64,
    pub key: String,
    pub text: String,
    pub description: String,
    pub used: bool,
}

/// Stored records grouped by namespace, in bundle order.
///
/// Built once per run. Only records whose key ends in `_<digits>` are
/// indexed; the rest can never be claimed by a placeholder but remain in the
/// bundle and are handled by pruning.
#[derive(Debug, Clone, Default)]
pub struct BundleIndex {
    namespaces: HashMap<Namespace, Vec<IndexedEntry>>,
}

impl BundleIndex {
    /// Index with no stored records (first run, or no bundle on disk).
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_bundle(bundle: &Bundle) -> Self {
        let mut namespaces: HashMap<Namespace, Vec<IndexedEntry>> = HashMap::new();

        for entry in bundle.entries() {
            let Some((namespace, ordinal)) = Namespace::parse_key(&entry.key) else {
                continue;
            };
            namespaces.entry(namespace).or_default().push(IndexedEntry {
                ordinal,
                key: entry.key.clone(),
                text: entry.text.clone(),
                description: entry.description.clone(),
                used: false,
            });
        }

        Self { namespaces }
    }

    pub fn entries(&self, namespace: &Namespace) -> &[IndexedEntry] {
        self.namespaces
            .get(namespace)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Claim the first unused entry with exactly this text and description.
    ///
    /// The claimed entry is marked used so the next identical placeholder
    /// binds to a different stored record.
    pub fn claim(
        &mut self,
        namespace: &Namespace,
        text: &str,
        description: &str,
    ) -> Option<&IndexedEntry> {
        self.claim_where(namespace, text, description, |_| true)
    }

    /// Like [`BundleIndex::claim`], skipping entries `eligible` rejects.
    pub fn claim_where<F>(
        &mut self,
        namespace: &Namespace,
        text: &str,
        description: &str,
        eligible: F,
    ) -> Option<&IndexedEntry>
    where
        F: Fn(&IndexedEntry) -> bool,
    {
        let entries = self.namespaces.get_mut(namespace)?;
        let entry = entries.iter_mut().find(|e| {
            !e.used && e.text == text && e.description == description && eligible(e)
        })?;
        entry.used = true;
        Some(&*entry)
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}
