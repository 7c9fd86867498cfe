//! One-shot deadline arena driven by the host event loop.
//!
//! # Responsibility
//! - Hand out opaque handles for armed deadlines.
//! - Release due entries in deadline order when the loop ticks.
//!
//! # Invariants
//! - A disarmed handle is never returned by `take_due`.
//! - Handles are never reused within one arena.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Opaque cancellation handle for one armed deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct ArmedTimer<K> {
    key: K,
    deadline: NaiveDateTime,
}

/// Arena of one-shot timers carrying a caller-defined key.
#[derive(Debug, Clone)]
pub struct TimerArena<K> {
    next_handle: u64,
    armed: BTreeMap<TimerHandle, ArmedTimer<K>>,
}

impl<K> Default for TimerArena<K> {
    fn default() -> Self {
        Self {
            next_handle: 1,
            armed: BTreeMap::new(),
        }
    }
}

impl<K: Clone> TimerArena<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, key: K, deadline: NaiveDateTime) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.armed.insert(handle, ArmedTimer { key, deadline });
        handle
    }

    /// Returns `true` when the handle was still armed.
    pub fn disarm(&mut self, handle: TimerHandle) -> bool {
        self.armed.remove(&handle).is_some()
    }

    pub fn next_deadline(&self) -> Option<NaiveDateTime> {
        self.armed.values().map(|timer| timer.deadline).min()
    }

    /// Removes and returns every entry whose deadline is at or before `now`,
    /// ordered by deadline, then by arming order.
    pub fn take_due(&mut self, now: NaiveDateTime) -> Vec<(TimerHandle, K)> {
        let mut due = self
            .armed
            .iter()
            .filter(|(_, timer)| timer.deadline <= now)
            .map(|(handle, timer)| (timer.deadline, *handle))
            .collect::<Vec<_>>();
        due.sort();

        due.into_iter()
            .filter_map(|(_, handle)| {
                self.armed
                    .remove(&handle)
                    .map(|timer| (handle, timer.key))
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.armed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::TimerArena;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn base() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 14)
            .and_then(|date| date.and_hms_opt(7, 0, 0))
            .expect("valid test datetime")
    }

    #[test]
    fn take_due_orders_by_deadline_then_arming_order() {
        let mut arena = TimerArena::new();
        arena.arm("late", base() + Duration::minutes(10));
        arena.arm("first", base() + Duration::minutes(5));
        arena.arm("second", base() + Duration::minutes(5));

        let due = arena.take_due(base() + Duration::minutes(10));
        let keys = due.into_iter().map(|(_, key)| key).collect::<Vec<_>>();
        assert_eq!(keys, vec!["first", "second", "late"]);
        assert_eq!(arena.next_deadline(), None);
    }

    #[test]
    fn disarmed_timers_never_come_due() {
        let mut arena = TimerArena::new();
        let handle = arena.arm("cancelled", base());
        arena.arm("kept", base());

        assert!(arena.disarm(handle));
        assert!(!arena.disarm(handle));

        let due = arena.take_due(base() + Duration::hours(1));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].1, "kept");
    }

    #[test]
    fn future_timers_stay_armed() {
        let mut arena = TimerArena::new();
        arena.arm(1_u8, base() + Duration::seconds(1));

        assert!(arena.take_due(base()).is_empty());
        assert_eq!(arena.next_deadline(), Some(base() + Duration::seconds(1)));
        assert_eq!(arena.take_due(base() + Duration::seconds(1)).len(), 1);
    }
}
