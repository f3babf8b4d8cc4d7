//! Fold of uncommitted per-window inventory adjustments.

use std::collections::BTreeMap;

use panel_contract::AdjustmentMap;

use crate::model::WindowId;

/// Uncommitted adjustment contributions keyed by reporting window.
///
/// Each window writes exactly its own key; the combined view is computed
/// on read. Removing an entry (window closed, or its edits committed)
/// drops the contribution entirely rather than zeroing it, so nothing
/// stale can linger in the fold.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdjustmentLedger {
    by_window: BTreeMap<WindowId, AdjustmentMap>,
}

impl AdjustmentLedger {
    /// Replaces `window_id`'s contribution with its latest full map.
    ///
    /// An empty map means the window currently has no pending edits and
    /// clears its entry.
    pub fn report(&mut self, window_id: WindowId, deltas: AdjustmentMap) {
        if deltas.is_empty() {
            self.by_window.remove(&window_id);
        } else {
            self.by_window.insert(window_id, deltas);
        }
    }

    /// Drops `window_id`'s contribution (close or commit).
    pub fn remove(&mut self, window_id: WindowId) {
        self.by_window.remove(&window_id);
    }

    /// Drops every contribution.
    pub fn clear(&mut self) {
        self.by_window.clear();
    }

    /// The map last reported by one window, if any.
    pub fn contribution(&self, window_id: WindowId) -> Option<&AdjustmentMap> {
        self.by_window.get(&window_id)
    }

    /// Per-item sums across all windows. Items whose deltas cancel to
    /// exactly zero are omitted.
    pub fn merged(&self) -> AdjustmentMap {
        let mut merged = AdjustmentMap::new();
        for deltas in self.by_window.values() {
            for (item, delta) in deltas {
                *merged.entry(item.clone()).or_insert(0) += delta;
            }
        }
        merged.retain(|_, delta| *delta != 0);
        merged
    }

    pub fn is_empty(&self) -> bool {
        self.by_window.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn deltas(entries: &[(&str, i64)]) -> AdjustmentMap {
        entries
            .iter()
            .map(|(item, delta)| (item.to_string(), *delta))
            .collect()
    }

    #[test]
    fn merged_sums_per_item_and_close_drops_a_contribution() {
        let mut ledger = AdjustmentLedger::default();
        ledger.report(WindowId(1), deltas(&[("item7", -3)]));
        ledger.report(WindowId(2), deltas(&[("item7", -2)]));

        assert_eq!(ledger.merged(), deltas(&[("item7", -5)]));

        ledger.remove(WindowId(1));
        assert_eq!(ledger.merged(), deltas(&[("item7", -2)]));
    }

    #[test]
    fn a_fresh_report_replaces_the_previous_one() {
        let mut ledger = AdjustmentLedger::default();
        ledger.report(WindowId(5), deltas(&[("item1", -4), ("item2", 6)]));
        ledger.report(WindowId(5), deltas(&[("item2", 1)]));

        assert_eq!(ledger.merged(), deltas(&[("item2", 1)]));
        assert_eq!(ledger.contribution(WindowId(5)), Some(&deltas(&[("item2", 1)])));
    }

    #[test]
    fn exact_cancellation_disappears_from_the_fold() {
        let mut ledger = AdjustmentLedger::default();
        ledger.report(WindowId(1), deltas(&[("item9", -8), ("item3", 1)]));
        ledger.report(WindowId(2), deltas(&[("item9", 8)]));

        assert_eq!(ledger.merged(), deltas(&[("item3", 1)]));
    }

    #[test]
    fn empty_report_clears_the_window_entry() {
        let mut ledger = AdjustmentLedger::default();
        ledger.report(WindowId(3), deltas(&[("item1", 2)]));
        ledger.report(WindowId(3), AdjustmentMap::new());

        assert!(ledger.is_empty());
        assert_eq!(ledger.contribution(WindowId(3)), None);
    }
}
