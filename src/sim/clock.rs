//! Virtual-time timer scheduler
//!
//! Stands in for `setTimeout`/`setInterval` style timers. Time only moves when
//! the caller asks for due timers, so a run is reproducible tick for tick.
//! Timers due at the same millisecond fire in creation order.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Handle for cancelling a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(u64);

/// Queue key: fire order is (due, seq)
type Key = (u64, u64);

#[derive(Debug, Clone)]
struct Entry<T> {
    id: TimerId,
    /// Repeat period for intervals
    period: Option<u64>,
    payload: T,
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: u64,
    next_id: u64,
    next_seq: u64,
    queue: BTreeMap<Key, Entry<T>>,
    keys: HashMap<TimerId, Key>,
}

impl<T: Clone> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0,
            next_id: 1,
            next_seq: 0,
            queue: BTreeMap::new(),
            keys: HashMap::new(),
        }
    }

    /// Current virtual time (ms)
    pub fn now_ms(&self) -> u64 {
        self.now
    }

    /// Number of armed timers
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.keys.contains_key(&id)
    }

    /// Fire once after `delay_ms`
    pub fn set_timeout(&mut self, delay_ms: u64, payload: T) -> TimerId {
        self.arm(delay_ms, None, payload)
    }

    /// Fire every `period_ms` until cancelled. A zero period is bumped to 1ms.
    pub fn set_interval(&mut self, period_ms: u64, payload: T) -> TimerId {
        let period = period_ms.max(1);
        self.arm(period, Some(period), payload)
    }

    /// Disarm a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.keys.remove(&id) {
            Some(key) => {
                self.queue.remove(&key);
                true
            }
            None => false,
        }
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to
    /// its due time. Intervals are re-armed one period later.
    pub fn pop_due(&mut self, until: u64) -> Option<(TimerId, T)> {
        let (&key, _) = self.queue.first_key_value()?;
        if key.0 > until {
            return None;
        }
        let entry = self.queue.remove(&key)?;
        self.keys.remove(&entry.id);
        self.now = self.now.max(key.0);

        if let Some(period) = entry.period {
            let next = (key.0 + period, self.bump_seq());
            self.queue.insert(next, entry.clone());
            self.keys.insert(entry.id, next);
        }

        Some((entry.id, entry.payload))
    }

    /// Move the clock forward once all due timers have been handled
    pub fn settle(&mut self, until: u64) {
        self.now = self.now.max(until);
    }

    fn arm(&mut self, delay_ms: u64, period: Option<u64>, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let key = (self.now + delay_ms, self.bump_seq());
        self.queue.insert(key, Entry { id, period, payload });
        self.keys.insert(id, key);
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(sched: &mut Scheduler<&'static str>, until: u64) -> Vec<(u64, &'static str)> {
        let mut fired = Vec::new();
        while let Some((_, p)) = sched.pop_due(until) {
            fired.push((sched.now_ms(), p));
        }
        sched.settle(until);
        fired
    }

    #[test]
    fn test_timeout_fires_once() {
        let mut sched = Scheduler::new();
        sched.set_timeout(100, "a");
        assert!(drain(&mut sched, 99).is_empty());
        assert_eq!(drain(&mut sched, 100), vec![(100, "a")]);
        assert!(drain(&mut sched, 1000).is_empty());
        assert!(sched.is_empty());
    }

    #[test]
    fn test_interval_repeats() {
        let mut sched = Scheduler::new();
        sched.set_interval(300, "tick");
        let fired = drain(&mut sched, 1000);
        assert_eq!(fired, vec![(300, "tick"), (600, "tick"), (900, "tick")]);
        assert_eq!(sched.now_ms(), 1000);
    }

    #[test]
    fn test_cancel() {
        let mut sched = Scheduler::new();
        let a = sched.set_timeout(50, "a");
        let b = sched.set_interval(20, "b");
        assert_eq!(sched.len(), 2);
        assert!(sched.cancel(a));
        assert!(!sched.cancel(a));
        assert_eq!(sched.len(), 1);
        let fired = drain(&mut sched, 45);
        assert_eq!(fired.len(), 2);
        assert!(sched.is_armed(b));
        assert_eq!(sched.len(), 1);
        assert!(sched.cancel(b));
        assert!(sched.is_empty());
        assert!(drain(&mut sched, 500).is_empty());
    }

    #[test]
    fn test_same_time_fires_in_creation_order() {
        let mut sched = Scheduler::new();
        sched.set_timeout(10, "first");
        sched.set_timeout(10, "second");
        sched.set_timeout(5, "early");
        let fired: Vec<_> = drain(&mut sched, 10).into_iter().map(|(_, p)| p).collect();
        assert_eq!(fired, vec!["early", "first", "second"]);
    }

    #[test]
    fn test_delays_are_relative_to_now() {
        let mut sched = Scheduler::new();
        drain(&mut sched, 250);
        sched.set_timeout(100, "late");
        assert_eq!(drain(&mut sched, 400), vec![(350, "late")]);
    }
}
