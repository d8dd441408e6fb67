//! Snapshot history with undo/redo.
//!
//! [`HistoryManager`] keeps every committed state as a full snapshot plus a
//! cursor pointing at the current one:
//!
//! ```text
//! commit(s3)              entries: [s0, s1, s2, s3]   cursor: 3
//! undo() x2               entries: [s0, s1, s2, s3]   cursor: 1
//! commit(s4)              entries: [s0, s1, s4]       cursor: 2   (redo branch dropped)
//! ```
//!
//! History is change driven: committing a value equal to the current entry is a
//! no-op. Undo/redo at either end of the history are no-ops as well; nothing in
//! here panics or returns an error for a boundary condition.

use std::fmt;
use std::time::{Duration, Instant};

use block_engine::Result;

mod debounce;
pub use debounce::{DEFAULT_STREAM, DebounceQueue};

mod persisted;
pub use persisted::PersistedHistory;

/// Called with the new current entry whenever it changes (commit, undo, redo, load).
pub type ChangeListener<S> = Box<dyn FnMut(&S) + Send>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of retained entries. `None` keeps everything.
    /// The oldest entries are evicted first; the current entry is never evicted.
    pub max_depth: Option<usize>,
}

impl HistoryConfig {
    pub fn unlimited() -> Self {
        Self { max_depth: None }
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth.max(1)),
        }
    }
}

pub struct HistoryManager<S> {
    entries: Vec<S>,
    cursor: usize,
    config: HistoryConfig,
    pending: DebounceQueue<S>,
    listener: Option<ChangeListener<S>>,
}

impl<S> fmt::Debug for HistoryManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryManager")
            .field("len", &self.entries.len())
            .field("cursor", &self.cursor)
            .field("pending", &self.pending.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<S: Clone + PartialEq> HistoryManager<S> {
    pub fn new(initial: S) -> Self {
        Self::with_config(initial, HistoryConfig::default())
    }

    pub fn with_config(initial: S, config: HistoryConfig) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            config,
            pending: DebounceQueue::new(),
            listener: None,
        }
    }

    /// Rebuilds a history from its persisted form.
    ///
    /// # Errors
    ///
    /// Refuses empty histories and out of range indices.
    pub fn restore(persisted: PersistedHistory<S>) -> Result<Self> {
        Self::restore_with_config(persisted, HistoryConfig::default())
    }

    pub fn restore_with_config(persisted: PersistedHistory<S>, config: HistoryConfig) -> Result<Self> {
        persisted.validate()?;
        Ok(Self {
            entries: persisted.history,
            cursor: persisted.index,
            config,
            pending: DebounceQueue::new(),
            listener: None,
        })
    }

    pub fn save(&self) -> PersistedHistory<S> {
        PersistedHistory {
            history: self.entries.clone(),
            index: self.cursor,
        }
    }

    /// Replaces entries and cursor of this instance with a persisted history.
    /// Pending debounced values are dropped, the listener is kept and notified.
    ///
    /// # Errors
    ///
    /// Refuses malformed input without touching the current state.
    pub fn load(&mut self, persisted: PersistedHistory<S>) -> Result<()> {
        persisted.validate()?;
        self.entries = persisted.history;
        self.cursor = persisted.index;
        self.pending.clear();
        self.notify();
        Ok(())
    }

    pub fn set_change_listener(&mut self, listener: ChangeListener<S>) {
        self.listener = Some(listener);
    }

    pub fn clear_change_listener(&mut self) {
        self.listener = None;
    }

    pub fn current(&self) -> &S {
        &self.entries[self.cursor]
    }

    pub fn entries(&self) -> &[S] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn config(&self) -> HistoryConfig {
        self.config
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Appends `next` as the new current entry, dropping everything after the cursor.
    /// Returns `false` (and does nothing) when `next` equals the current entry.
    pub fn commit(&mut self, next: S) -> bool {
        if next == *self.current() {
            log::trace!("history: skipping commit equal to current entry");
            return false;
        }
        let dropped = self.entries.len() - self.cursor - 1;
        if dropped > 0 {
            log::debug!("history: discarding {dropped} redo entries");
        }
        self.entries.truncate(self.cursor + 1);
        self.entries.push(next);
        self.cursor = self.entries.len() - 1;
        self.enforce_depth();
        self.notify();
        true
    }

    /// Injects a state that originates outside this history's own edit stream
    /// (loading persisted state, global undo of a composite editor).
    ///
    /// Goes through exactly the same path as [`commit`](Self::commit), so
    /// applying the same external state twice only adds one entry.
    pub fn apply_external(&mut self, next: S) -> bool {
        self.commit(next)
    }

    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.cursor -= 1;
        self.notify();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.cursor += 1;
        self.notify();
        true
    }

    // ====================================================================
    // Debounced commits
    // ====================================================================

    /// Schedules `next` on the default stream, `delay` from now.
    pub fn commit_debounced(&mut self, next: S, delay: Duration) {
        self.commit_debounced_at(DEFAULT_STREAM, next, delay, Instant::now());
    }

    /// Schedules `next` to be committed at `now + delay` unless another value for
    /// `stream` arrives first, which replaces it and restarts the delay.
    pub fn commit_debounced_at(&mut self, stream: &str, next: S, delay: Duration, now: Instant) {
        self.pending.schedule(stream, next, now + delay);
    }

    pub fn poll(&mut self) -> usize {
        self.poll_at(Instant::now())
    }

    /// Commits every pending value whose stream has been quiet until `now`.
    /// Returns the number of commits that changed the history.
    pub fn poll_at(&mut self, now: Instant) -> usize {
        let due = self.pending.take_due(now);
        self.commit_all(due)
    }

    /// Commits the pending value of `stream` right away (end of a continuous gesture).
    pub fn flush(&mut self, stream: &str) -> bool {
        match self.pending.take(stream) {
            Some(value) => self.commit(value),
            None => false,
        }
    }

    pub fn flush_all(&mut self) -> usize {
        let all = self.pending.take_all();
        self.commit_all(all)
    }

    pub fn cancel(&mut self, stream: &str) -> bool {
        self.pending.cancel(stream)
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_pending(&self, stream: &str) -> bool {
        self.pending.contains(stream)
    }

    /// Earliest deadline of all pending streams, for event loops that sleep until then.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.next_deadline()
    }

    fn commit_all(&mut self, values: Vec<(String, S)>) -> usize {
        let mut committed = 0;
        for (stream, value) in values {
            if self.commit(value) {
                log::debug!("history: debounced commit on stream '{stream}'");
                committed += 1;
            }
        }
        committed
    }

    fn enforce_depth(&mut self) {
        let Some(max_depth) = self.config.max_depth else {
            return;
        };
        let max_depth = max_depth.max(1);
        if self.entries.len() <= max_depth {
            return;
        }
        let excess = (self.entries.len() - max_depth).min(self.cursor);
        self.entries.drain(..excess);
        self.cursor -= excess;
    }

    fn notify(&mut self) {
        let current = &self.entries[self.cursor];
        if let Some(listener) = self.listener.as_mut() {
            listener(current);
        }
    }
}
