//! Key assignment for template placeholders.

use std::collections::{BTreeSet, HashMap};

use crate::core::{
    index::BundleIndex, namespace::Namespace, placeholder::PlaceholderMatch,
    usage::UsageTracker,
};

/// How a key was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyOrigin {
    /// Claimed from the previous bundle; existing translations stay valid.
    Reused,
    /// Fresh ordinal in the namespace.
    Allocated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub key: String,
    pub ordinal: u64,
    pub origin: KeyOrigin,
}

/// Assigns keys to placeholders, preferring stored keys with identical text
/// and description.
///
/// Owns the reuse index and the usage tracker for the duration of the
/// extraction phase; every key handed out is marked live immediately.
/// Ordinals consumed in a namespace are remembered for the whole run, so two
/// templates that map to the same namespace still get distinct keys.
#[derive(Debug)]
pub struct KeyAllocator {
    index: BundleIndex,
    consumed: HashMap<Namespace, BTreeSet<u64>>,
    tracker: UsageTracker,
}

impl KeyAllocator {
    pub fn new(index: BundleIndex) -> Self {
        Self::with_tracker(index, UsageTracker::new())
    }

    pub fn with_tracker(index: BundleIndex, tracker: UsageTracker) -> Self {
        Self {
            index,
            consumed: HashMap::new(),
            tracker,
        }
    }

    /// Resolve a single placeholder: reuse if possible, otherwise allocate.
    pub fn allocate(&mut self, namespace: &Namespace, placeholder: &PlaceholderMatch) -> Allocation {
        match self.try_reuse(namespace, placeholder) {
            Some(allocation) => allocation,
            None => self.allocate_new(namespace),
        }
    }

    /// Resolve every placeholder of one template.
    ///
    /// All reuse matches are made first, in source order, and only then are
    /// fresh ordinals handed out to the rest. A fresh ordinal can therefore
    /// never take a stored key that a later placeholder of the same template
    /// would have claimed.
    pub fn allocate_template(
        &mut self,
        namespace: &Namespace,
        placeholders: &[PlaceholderMatch],
    ) -> Vec<Allocation> {
        let reused: Vec<Option<Allocation>> = placeholders
            .iter()
            .map(|placeholder| self.try_reuse(namespace, placeholder))
            .collect();

        reused
            .into_iter()
            .map(|allocation| match allocation {
                Some(allocation) => allocation,
                None => self.allocate_new(namespace),
            })
            .collect()
    }

    pub fn tracker(&self) -> &UsageTracker {
        &self.tracker
    }

    pub fn index(&self) -> &BundleIndex {
        &self.index
    }

    /// Ordinals consumed so far in `namespace`.
    pub fn consumed(&self, namespace: &Namespace) -> Vec<u64> {
        self.consumed
            .get(namespace)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// End of the extraction phase: hand the tracker over for source scanning.
    pub fn into_tracker(self) -> UsageTracker {
        self.tracker
    }

    fn try_reuse(
        &mut self,
        namespace: &Namespace,
        placeholder: &PlaceholderMatch,
    ) -> Option<Allocation> {
        let consumed = self.consumed.entry(namespace.clone()).or_default();
        let entry = self.index.claim_where(
            namespace,
            &placeholder.text,
            placeholder.description(),
            |entry| !consumed.contains(&entry.ordinal),
        )?;

        consumed.insert(entry.ordinal);
        let allocation = Allocation {
            key: entry.key.clone(),
            ordinal: entry.ordinal,
            origin: KeyOrigin::Reused,
        };
        self.tracker.mark_used(allocation.key.clone());
        Some(allocation)
    }

    fn allocate_new(&mut self, namespace: &Namespace) -> Allocation {
        let consumed = self.consumed.entry(namespace.clone()).or_default();
        let ordinal = (0u64..)
            .find(|ordinal| !consumed.contains(ordinal))
            .unwrap_or_default();
        consumed.insert(ordinal);

        let key = namespace.key(ordinal);
        self.tracker.mark_used(key.clone());
        Allocation {
            key,
            ordinal,
            origin: KeyOrigin::Allocated,
        }
    }
}
