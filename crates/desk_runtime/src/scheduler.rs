//! Debounce bookkeeping for persistence writes.

use std::collections::BTreeMap;

use panel_contract::AppKind;

/// Debounce interval for full-layout snapshots, in ms.
pub const LAYOUT_WRITE_DEBOUNCE_MS: u64 = 1_000;
/// Debounce interval for per-app geometry writes, in ms.
pub const GEOMETRY_WRITE_DEBOUNCE_MS: u64 = 300;

/// One debounced persistence resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WriteKey {
    /// The full layout snapshot (coarse cadence).
    Layout,
    /// The geometry override for one app kind (fine cadence).
    Geometry(AppKind),
}

impl WriteKey {
    /// Cadence for this resource.
    pub const fn debounce_ms(self) -> u64 {
        match self {
            Self::Layout => LAYOUT_WRITE_DEBOUNCE_MS,
            Self::Geometry(_) => GEOMETRY_WRITE_DEBOUNCE_MS,
        }
    }
}

/// Last-event-wins deadline tracker for debounced writes.
///
/// At most one deadline exists per key: `schedule` replaces any prior one
/// (cancel-and-reschedule), `due` drains keys whose deadline has passed,
/// and `flush` drains everything immediately so close/unmount paths never
/// drop a pending write. The caller supplies `now` so the bookkeeping
/// stays clock-free and testable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WriteScheduler {
    pending: BTreeMap<WriteKey, u64>,
}

impl WriteScheduler {
    /// (Re)schedules `key`, returning its new deadline.
    pub fn schedule(&mut self, key: WriteKey, now_ms: u64) -> u64 {
        let due_at = now_ms + key.debounce_ms();
        self.pending.insert(key, due_at);
        due_at
    }

    /// Drops the pending deadline for `key`; returns whether one existed.
    pub fn cancel(&mut self, key: WriteKey) -> bool {
        self.pending.remove(&key).is_some()
    }

    /// Removes and returns every key whose deadline is at or before `now`.
    pub fn due(&mut self, now_ms: u64) -> Vec<WriteKey> {
        let ripe: Vec<WriteKey> = self
            .pending
            .iter()
            .filter(|(_, due_at)| **due_at <= now_ms)
            .map(|(key, _)| *key)
            .collect();
        for key in &ripe {
            self.pending.remove(key);
        }
        ripe
    }

    /// Removes and returns every pending key regardless of deadline.
    pub fn flush(&mut self) -> Vec<WriteKey> {
        let keys: Vec<WriteKey> = self.pending.keys().copied().collect();
        self.pending.clear();
        keys
    }

    /// Whether `key` currently has a pending deadline.
    pub fn has_pending(&self, key: WriteKey) -> bool {
        self.pending.contains_key(&key)
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.values().copied().min()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reschedule_replaces_the_pending_deadline() {
        let mut scheduler = WriteScheduler::default();
        scheduler.schedule(WriteKey::Layout, 0);
        // Ten rapid mutations later only one write is pending, due after
        // the latest event.
        for tick in 1..=10 {
            scheduler.schedule(WriteKey::Layout, tick * 50);
        }

        assert_eq!(scheduler.due(500 + LAYOUT_WRITE_DEBOUNCE_MS - 1), vec![]);
        assert_eq!(
            scheduler.due(500 + LAYOUT_WRITE_DEBOUNCE_MS),
            vec![WriteKey::Layout]
        );
        assert!(scheduler.is_idle());
    }

    #[test]
    fn cadences_are_independent_per_key() {
        let mut scheduler = WriteScheduler::default();
        scheduler.schedule(WriteKey::Geometry(AppKind::TradeEdit), 0);
        scheduler.schedule(WriteKey::Layout, 0);

        assert_eq!(
            scheduler.due(GEOMETRY_WRITE_DEBOUNCE_MS),
            vec![WriteKey::Geometry(AppKind::TradeEdit)]
        );
        assert!(scheduler.has_pending(WriteKey::Layout));
        assert_eq!(scheduler.due(LAYOUT_WRITE_DEBOUNCE_MS), vec![WriteKey::Layout]);
    }

    #[test]
    fn geometry_keys_do_not_collide_across_kinds() {
        let mut scheduler = WriteScheduler::default();
        scheduler.schedule(WriteKey::Geometry(AppKind::TradeEdit), 0);
        scheduler.schedule(WriteKey::Geometry(AppKind::Settings), 100);

        let due = scheduler.due(100 + GEOMETRY_WRITE_DEBOUNCE_MS);
        assert_eq!(due.len(), 2);
    }

    #[test]
    fn flush_drains_everything_immediately() {
        let mut scheduler = WriteScheduler::default();
        scheduler.schedule(WriteKey::Layout, 0);
        scheduler.schedule(WriteKey::Geometry(AppKind::Settings), 0);

        let flushed = scheduler.flush();
        assert_eq!(flushed.len(), 2);
        assert!(scheduler.is_idle());
        assert_eq!(scheduler.flush(), vec![]);
    }

    #[test]
    fn cancel_forgets_a_pending_write() {
        let mut scheduler = WriteScheduler::default();
        scheduler.schedule(WriteKey::Geometry(AppKind::TradeEdit), 0);
        assert!(scheduler.cancel(WriteKey::Geometry(AppKind::TradeEdit)));
        assert!(!scheduler.cancel(WriteKey::Geometry(AppKind::TradeEdit)));
        assert_eq!(scheduler.due(u64::MAX), vec![]);
    }
}
