//! Removal of bundle records that are no longer referenced.

use crate::core::{
    bundle::{Bundle, TranslationEntry},
    usage::LiveSet,
};

/// Result of pruning one bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneOutcome {
    pub bundle: Bundle,
    /// Records dropped, in their original bundle order.
    pub removed: Vec<TranslationEntry>,
}

/// Keep exactly the records whose key is live.
///
/// Takes a [`LiveSet`], which can only be produced by finishing the usage
/// tracker, so pruning cannot start while keys are still being collected.
pub fn prune(mut bundle: Bundle, live: &LiveSet) -> PruneOutcome {
    let removed = bundle.retain_by(|entry| live.contains(&entry.key));
    PruneOutcome { bundle, removed }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::core::{prune::*, usage::UsageTracker};

    fn bundle(keys: &[&str]) -> Bundle {
        let mut bundle = Bundle::new("en");
        for key in keys {
            bundle.upsert(TranslationEntry::new(*key, format!("text {}", key), ""));
        }
        bundle
    }

    fn live(keys: &[&str]) -> LiveSet {
        let mut tracker = UsageTracker::new();
        tracker.extend(keys.iter().copied());
        tracker.finish()
    }

    fn keys(bundle: &Bundle) -> Vec<&str> {
        bundle.entries().iter().map(|e| e.key.as_str()).collect()
    }

    #[test]
    fn test_keeps_only_live_entries() {
        let outcome = prune(
            bundle(&["MSG_A_0", "MSG_A_1", "MSG_B_0", "MSG_TITLE"]),
            &live(&["MSG_A_1", "MSG_B_0", "MSG_UNRELATED_9"]),
        );

        assert_eq!(keys(&outcome.bundle), vec!["MSG_A_1", "MSG_B_0"]);
        let removed: Vec<&str> = outcome.removed.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(removed, vec!["MSG_A_0", "MSG_TITLE"]);
    }

    #[test]
    fn test_idempotent() {
        let live = live(&["MSG_A_1"]);
        let once = prune(bundle(&["MSG_A_0", "MSG_A_1"]), &live);
        let twice = prune(once.bundle.clone(), &live);

        assert_eq!(twice.bundle, once.bundle);
        assert!(twice.removed.is_empty());
    }

    #[test]
    fn test_empty_live_set_removes_everything() {
        let outcome = prune(bundle(&["MSG_A_0"]), &live(&[]));
        assert!(outcome.bundle.is_empty());
        assert_eq!(outcome.bundle.lang, "en");
    }
}
