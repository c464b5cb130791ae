//! Arena of pending timers on a virtual timeline.
//!
//! Timers are keyed by an owner (a session) so every timer an owner armed
//! can be invalidated at once. Firing order is due time first, then arming
//! order.

use std::collections::BTreeMap;
use std::time::Duration;

/// Handle for one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A timer that reached its due time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredTimer<K, T> {
    pub id: TimerId,
    pub owner: K,
    pub due: Duration,
    pub payload: T,
}

#[derive(Debug, Clone)]
struct PendingTimer<K, T> {
    owner: K,
    payload: T,
}

/// Pending timers ordered by `(due, sequence)`.
#[derive(Debug, Clone)]
pub struct TimerArena<K, T> {
    pending: BTreeMap<(Duration, u64), PendingTimer<K, T>>,
    next_sequence: u64,
}

impl<K: Clone + PartialEq, T> TimerArena<K, T> {
    pub fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            next_sequence: 0,
        }
    }

    /// Arms a timer that fires once `due` is reached.
    pub fn arm(&mut self, owner: K, due: Duration, payload: T) -> TimerId {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.pending
            .insert((due, sequence), PendingTimer { owner, payload });
        TimerId(sequence)
    }

    /// Invalidates a single timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let key = self
            .pending
            .keys()
            .find(|(_, seq)| *seq == id.0)
            .copied();
        match key {
            Some(key) => self.pending.remove(&key).is_some(),
            None => false,
        }
    }

    /// Invalidates every pending timer of `owner`, returning how many were dropped.
    pub fn cancel_owner(&mut self, owner: &K) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, timer| timer.owner != *owner);
        before - self.pending.len()
    }

    /// Removes and returns every timer due at or before `now`, in firing order.
    pub fn fire_due(&mut self, now: Duration) -> Vec<FiredTimer<K, T>> {
        let later = self.pending.split_off(&(now, u64::MAX));
        let due = std::mem::replace(&mut self.pending, later);
        due.into_iter()
            .map(|((due, seq), timer)| FiredTimer {
                id: TimerId(seq),
                owner: timer.owner,
                due,
                payload: timer.payload,
            })
            .collect()
    }

    /// Due time of the earliest pending timer.
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(due, _)| *due)
    }

    /// Number of pending timers owned by `owner`.
    pub fn pending_for(&self, owner: &K) -> usize {
        self.pending.values().filter(|t| t.owner == *owner).count()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<K: Clone + PartialEq, T> Default for TimerArena<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn fires_in_due_order() {
        let mut arena = TimerArena::new();
        arena.arm("s", ms(300), "late");
        arena.arm("s", ms(100), "early");

        let fired: Vec<_> = arena.fire_due(ms(500)).into_iter().map(|f| f.payload).collect();
        assert_eq!(fired, vec!["early", "late"]);
        assert!(arena.is_empty());
    }

    #[test]
    fn equal_due_times_fire_in_arming_order() {
        let mut arena = TimerArena::new();
        arena.arm("s", ms(100), "first");
        arena.arm("s", ms(100), "second");
        arena.arm("s", ms(100), "third");

        let fired: Vec<_> = arena.fire_due(ms(100)).into_iter().map(|f| f.payload).collect();
        assert_eq!(fired, vec!["first", "second", "third"]);
    }

    #[test]
    fn timers_not_yet_due_stay_pending() {
        let mut arena = TimerArena::new();
        arena.arm("s", ms(100), 1);
        arena.arm("s", ms(101), 2);

        assert_eq!(arena.fire_due(ms(100)).len(), 1);
        assert_eq!(arena.next_due(), Some(ms(101)));
    }

    #[test]
    fn cancel_owner_only_drops_that_owner() {
        let mut arena = TimerArena::new();
        arena.arm("a", ms(10), 1);
        arena.arm("b", ms(20), 2);
        arena.arm("a", ms(30), 3);

        assert_eq!(arena.cancel_owner(&"a"), 2);
        let fired = arena.fire_due(ms(100));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].owner, "b");
    }

    #[test]
    fn cancel_single_timer() {
        let mut arena = TimerArena::new();
        let id = arena.arm("a", ms(10), ());
        assert!(arena.cancel(id));
        assert!(!arena.cancel(id));
        assert!(arena.fire_due(ms(100)).is_empty());
    }
}
