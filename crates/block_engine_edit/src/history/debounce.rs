//! Trailing-edge coalescing of history commits.
//!
//! Continuous controls (sliders, drags) produce a burst of values. Each value
//! replaces the pending value of its stream and pushes the deadline back; only
//! when a stream stays quiet until its deadline does the last value get
//! committed. Time is passed in explicitly so callers (and tests) decide when
//! "now" is.

use std::collections::HashMap;
use std::time::Instant;

pub const DEFAULT_STREAM: &str = "default";

#[derive(Debug)]
struct PendingCommit<S> {
    value: S,
    deadline: Instant,
    seq: u64,
}

/// Pending debounced values, one per stream.
#[derive(Debug)]
pub struct DebounceQueue<S> {
    streams: HashMap<String, PendingCommit<S>>,
    seq: u64,
}

impl<S> Default for DebounceQueue<S> {
    fn default() -> Self {
        Self {
            streams: HashMap::new(),
            seq: 0,
        }
    }
}

impl<S> DebounceQueue<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the pending value of `stream` (last write wins) and moves its deadline.
    pub fn schedule(&mut self, stream: &str, value: S, deadline: Instant) {
        self.seq += 1;
        let seq = self.seq;
        if self.streams.insert(stream.to_string(), PendingCommit { value, deadline, seq }).is_some() {
            log::trace!("debounce: replaced pending value of stream '{stream}'");
        }
    }

    /// Removes and returns the values whose deadline has passed, earliest deadline first.
    pub fn take_due(&mut self, now: Instant) -> Vec<(String, S)> {
        let due: Vec<String> = self.streams.iter().filter(|(_, p)| p.deadline <= now).map(|(k, _)| k.clone()).collect();
        self.drain_ordered(due, |p| (p.deadline, p.seq))
    }

    /// Removes and returns every pending value, earliest deadline first.
    pub fn take_all(&mut self) -> Vec<(String, S)> {
        let all: Vec<String> = self.streams.keys().cloned().collect();
        self.drain_ordered(all, |p| (p.deadline, p.seq))
    }

    pub fn take(&mut self, stream: &str) -> Option<S> {
        self.streams.remove(stream).map(|p| p.value)
    }

    pub fn cancel(&mut self, stream: &str) -> bool {
        self.streams.remove(stream).is_some()
    }

    pub fn clear(&mut self) {
        self.streams.clear();
    }

    pub fn contains(&self, stream: &str) -> bool {
        self.streams.contains_key(stream)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.streams.values().map(|p| p.deadline).min()
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    fn drain_ordered<K: Ord>(&mut self, keys: Vec<String>, key: impl Fn(&PendingCommit<S>) -> K) -> Vec<(String, S)> {
        let mut taken: Vec<(String, PendingCommit<S>)> = keys.into_iter().filter_map(|k| self.streams.remove(&k).map(|p| (k, p))).collect();
        taken.sort_by_key(|(_, p)| key(p));
        taken.into_iter().map(|(k, p)| (k, p.value)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_last_write_wins_per_stream() {
        let start = Instant::now();
        let mut queue = DebounceQueue::new();
        queue.schedule("opacity", 1, start + Duration::from_millis(300));
        queue.schedule("opacity", 2, start + Duration::from_millis(310));

        assert_eq!(queue.len(), 1);
        assert!(queue.take_due(start + Duration::from_millis(305)).is_empty());
        assert_eq!(queue.take_due(start + Duration::from_millis(310)), vec![("opacity".to_string(), 2)]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_streams_are_independent() {
        let start = Instant::now();
        let mut queue = DebounceQueue::new();
        queue.schedule("color", "red", start + Duration::from_millis(200));
        queue.schedule("border", "2px", start + Duration::from_millis(100));

        assert_eq!(queue.next_deadline(), Some(start + Duration::from_millis(100)));
        let due = queue.take_due(start + Duration::from_millis(500));
        assert_eq!(due, vec![("border".to_string(), "2px"), ("color".to_string(), "red")]);
    }

    #[test]
    fn test_cancel_and_take() {
        let start = Instant::now();
        let mut queue = DebounceQueue::new();
        queue.schedule(DEFAULT_STREAM, 5, start);
        queue.schedule("other", 6, start);

        assert!(queue.cancel(DEFAULT_STREAM));
        assert!(!queue.cancel(DEFAULT_STREAM));
        assert_eq!(queue.take("other"), Some(6));
        assert!(queue.is_empty());
    }
}
