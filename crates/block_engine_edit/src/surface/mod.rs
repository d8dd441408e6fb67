//! Surface controller: one editable region (header, content or footer).
//!
//! A controller turns gestures into new [`SurfaceSnapshot`]s and commits them to
//! the [`HistoryManager`] it owns. It keeps two views of its state:
//!
//! - the *committed* state, `history.current()`
//! - the *live* state the UI renders, which runs ahead of history while a
//!   drag/resize gesture is in progress or a debounced edit is pending
//!
//! Debounced streams only decide *when* to commit. What gets committed is
//! always the live state, which already holds the latest value of every
//! stream. No commit happens while a gesture is in progress.
//!
//! Every change of the committed state is published into a [`PublishedQueue`]
//! for whoever aggregates surfaces (see [`crate::CompositeEditor`]).

use std::time::{Duration, Instant};

use block_engine::{BlockGeometry, Result, SurfaceKind, SurfaceSnapshot, layout};

use crate::{DebounceQueue, HistoryConfig, HistoryManager, PersistedHistory, PublishedQueue};

mod block_operations;
mod gesture;
pub use gesture::{GestureKind, GestureState};

pub struct SurfaceController {
    kind: SurfaceKind,
    history: HistoryManager<SurfaceSnapshot>,
    live: SurfaceSnapshot,
    /// Deadlines of the open debounced streams.
    pending: DebounceQueue<()>,
    gesture: GestureState,
    pre_gesture: Option<SurfaceSnapshot>,
    /// Running count used for generated block ids.
    id_counter: usize,
    published: PublishedQueue<SurfaceSnapshot>,
}

impl SurfaceController {
    pub fn new(kind: SurfaceKind) -> Self {
        Self::with_snapshot(kind, SurfaceSnapshot::for_surface(kind), HistoryConfig::default())
    }

    pub fn with_snapshot(kind: SurfaceKind, initial: SurfaceSnapshot, config: HistoryConfig) -> Self {
        let history = HistoryManager::with_config(initial, config);
        Self::from_history(kind, history)
    }

    /// Restores a surface together with its local history.
    ///
    /// # Errors
    ///
    /// Refuses malformed persisted histories.
    pub fn restore(kind: SurfaceKind, persisted: PersistedHistory<SurfaceSnapshot>, config: HistoryConfig) -> Result<Self> {
        let history = HistoryManager::restore_with_config(persisted, config)?;
        Ok(Self::from_history(kind, history))
    }

    fn from_history(kind: SurfaceKind, mut history: HistoryManager<SurfaceSnapshot>) -> Self {
        let published = PublishedQueue::new();
        let queue = published.clone();
        history.set_change_listener(Box::new(move |state: &SurfaceSnapshot| queue.publish(state.clone())));
        let live = history.current().clone();
        let id_counter = live.blocks.len();
        Self {
            kind,
            history,
            live,
            pending: DebounceQueue::new(),
            gesture: GestureState::Idle,
            pre_gesture: None,
            id_counter,
            published,
        }
    }

    pub fn kind(&self) -> SurfaceKind {
        self.kind
    }

    /// State the UI should render.
    pub fn snapshot(&self) -> &SurfaceSnapshot {
        &self.live
    }

    /// State at the history cursor.
    pub fn committed(&self) -> &SurfaceSnapshot {
        self.history.current()
    }

    pub fn history(&self) -> &HistoryManager<SurfaceSnapshot> {
        &self.history
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gesture
    }

    /// True during drag/resize; contextual menus should stay hidden.
    pub fn is_interacting(&self) -> bool {
        self.gesture.is_interacting()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo() || self.has_pending_edits()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo() && !self.has_pending_edits()
    }

    // ====================================================================
    // Publishing
    // ====================================================================

    /// Handle to the queue this surface publishes its committed states into.
    pub fn published_queue(&self) -> PublishedQueue<SurfaceSnapshot> {
        self.published.clone()
    }

    /// Oldest committed state not picked up yet.
    pub fn take_published(&self) -> Option<SurfaceSnapshot> {
        self.published.take()
    }

    pub fn drain_published(&self) -> Vec<SurfaceSnapshot> {
        self.published.drain()
    }

    /// Publishes the committed state even though it did not change, used when the
    /// surface signals readiness.
    pub fn publish_current(&self) {
        self.published.publish(self.history.current().clone());
    }

    // ====================================================================
    // Commit paths
    // ====================================================================

    /// Routes a new snapshot: deferred into the live state while a gesture is in
    /// progress, committed right away otherwise.
    pub(crate) fn apply(&mut self, next: SurfaceSnapshot) -> bool {
        if self.gesture.is_interacting() {
            self.live = next;
            return false;
        }
        // pending slider values land before the discrete edit that follows them
        self.flush_pending();
        self.live = next.clone();
        self.history.commit(next)
    }

    /// Updates the live state now and commits it once `stream` stays quiet for `delay`.
    pub(crate) fn apply_debounced(&mut self, stream: &str, next: SurfaceSnapshot, delay: Duration, now: Instant) {
        self.live = next;
        self.pending.schedule(stream, (), now + delay);
    }

    fn commit_live(&mut self) -> bool {
        self.history.commit(self.live.clone())
    }

    /// Commits the final value of a continuous edit (slider release) even if its
    /// debounce window is still open. During a gesture the stream stays pending.
    pub fn end_continuous_edit(&mut self, stream: &str) -> bool {
        if self.gesture.is_interacting() || self.pending.take(stream).is_none() {
            return false;
        }
        self.commit_live()
    }

    pub fn has_pending_edits(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.next_deadline()
    }

    pub fn poll(&mut self) -> usize {
        self.poll_at(Instant::now())
    }

    /// Fires debounced commits that are due at `now`. Nothing fires while a
    /// gesture is in progress; due streams wait for the gesture to end.
    pub fn poll_at(&mut self, now: Instant) -> usize {
        if self.gesture.is_interacting() {
            return 0;
        }
        let due = self.pending.take_due(now);
        if due.is_empty() {
            return 0;
        }
        log::debug!("{}: debounced commit of {} stream(s)", self.kind, due.len());
        usize::from(self.commit_live())
    }

    /// Commits every open debounced stream right away.
    pub fn flush_pending(&mut self) -> usize {
        if self.gesture.is_interacting() || self.pending.is_empty() {
            return 0;
        }
        self.pending.clear();
        usize::from(self.commit_live())
    }

    // ====================================================================
    // Undo / redo / external state
    // ====================================================================

    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        self.flush_pending();
        let changed = self.history.undo();
        self.live = self.history.current().clone();
        changed
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        self.flush_pending();
        let changed = self.history.redo();
        self.live = self.history.current().clone();
        changed
    }

    /// Injects a snapshot from outside this surface's gesture stream.
    ///
    /// An interaction in progress is cancelled and pending debounced values are
    /// dropped, then the snapshot takes the normal commit path (deduplicated
    /// against the current entry).
    pub fn apply_external(&mut self, snapshot: SurfaceSnapshot) -> bool {
        self.cancel_gesture();
        self.pending.clear();
        let changed = self.history.apply_external(snapshot);
        self.live = self.history.current().clone();
        changed
    }

    pub fn save_history(&self) -> PersistedHistory<SurfaceSnapshot> {
        self.history.save()
    }

    /// Replaces the local history with a persisted one.
    ///
    /// # Errors
    ///
    /// Refuses malformed input; the surface is left untouched in that case.
    pub fn load_history(&mut self, persisted: PersistedHistory<SurfaceSnapshot>) -> Result<()> {
        self.history.load(persisted)?;
        self.pending.clear();
        self.gesture = GestureState::Idle;
        self.pre_gesture = None;
        self.live = self.history.current().clone();
        Ok(())
    }

    // ====================================================================
    // Gestures
    // ====================================================================

    /// Starts a drag or resize. History commits are suspended until the gesture ends.
    pub fn begin_gesture(&mut self, kind: GestureKind) {
        if !self.gesture.is_idle() {
            log::debug!("{}: begin_gesture while {}, ignored", self.kind, self.gesture);
            return;
        }
        self.flush_pending();
        self.pre_gesture = Some(self.live.clone());
        self.gesture = GestureState::Interacting(kind);
    }

    /// Full geometry report of the drag/resize engine.
    ///
    /// Geometry is merged with the attributes of the current blocks (see
    /// [`layout::merge_geometry`]). Commits immediately when idle, only updates
    /// the live state during a gesture.
    pub fn replace_layout(&mut self, geometries: &[BlockGeometry]) -> bool {
        let merged = layout::merge_geometry(&self.live.blocks, geometries, self.live.rows());
        let next = self.live.with_blocks(merged);
        self.apply(next)
    }

    /// Intermediate geometry report during a gesture. Outside a gesture this is
    /// the same as [`replace_layout`](Self::replace_layout).
    pub fn update_gesture(&mut self, geometries: &[BlockGeometry]) -> bool {
        self.replace_layout(geometries)
    }

    /// Applies the final geometry report and commits the whole gesture as one entry.
    pub fn end_gesture(&mut self, geometries: &[BlockGeometry]) -> bool {
        if !self.gesture.is_interacting() {
            return self.replace_layout(geometries);
        }
        self.replace_layout(geometries);
        self.finish_gesture()
    }

    /// Ends the gesture and commits whatever layout was last reported.
    ///
    /// Debounced edits made during the gesture are part of that layout; their
    /// streams stay open and commit nothing new unless they change again.
    pub fn finish_gesture(&mut self) -> bool {
        let GestureState::Interacting(kind) = self.gesture else {
            return false;
        };
        self.gesture = GestureState::CommittingGesture(kind);
        self.pre_gesture = None;
        let changed = self.commit_live();
        self.gesture = GestureState::Idle;
        changed
    }

    /// Aborts the gesture and restores the layout from before it started.
    /// Nothing is committed; debounced edits made during the gesture are dropped.
    pub fn cancel_gesture(&mut self) -> bool {
        if !self.gesture.is_interacting() {
            return false;
        }
        if let Some(previous) = self.pre_gesture.take() {
            self.live = previous;
        }
        // streams open at begin_gesture were flushed there
        self.pending.clear();
        self.gesture = GestureState::Idle;
        true
    }
}

impl std::fmt::Debug for SurfaceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceController")
            .field("kind", &self.kind)
            .field("blocks", &self.live.blocks.len())
            .field("history", &self.history)
            .field("pending", &self.pending.len())
            .field("gesture", &self.gesture)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use block_engine::{BlockTemplate, ShapeKind};

    fn surface_with_shape() -> (SurfaceController, String) {
        let mut surface = SurfaceController::new(SurfaceKind::Content);
        let id = surface.add_block(&BlockTemplate::shape(ShapeKind::Rectangle).at(1, 1).size(2, 2)).unwrap();
        (surface, id)
    }

    #[test]
    fn test_drag_commits_once() {
        let (mut surface, id) = surface_with_shape();
        let before = surface.history().len();

        surface.begin_gesture(GestureKind::Drag);
        for step in 0..50 {
            surface.update_gesture(&[BlockGeometry::new(id.clone(), 1 + step % 5, 1 + step % 7, 2, 2)]);
        }
        assert_eq!(surface.history().len(), before);
        assert!(surface.is_interacting());

        assert!(surface.end_gesture(&[BlockGeometry::new(id.clone(), 6, 5, 2, 2)]));
        assert_eq!(surface.history().len(), before + 1);
        assert_eq!(surface.gesture_state(), GestureState::Idle);

        let block = surface.committed().find_block(&id).unwrap();
        assert_eq!((block.x, block.y), (6, 5));
    }

    #[test]
    fn test_cancel_gesture_restores_layout() {
        let (mut surface, id) = surface_with_shape();
        let before = surface.snapshot().clone();

        surface.begin_gesture(GestureKind::Resize);
        surface.update_gesture(&[BlockGeometry::new(id, 1, 1, 9, 9)]);
        assert_ne!(*surface.snapshot(), before);

        assert!(surface.cancel_gesture());
        assert_eq!(*surface.snapshot(), before);
        assert!(!surface.finish_gesture());
    }

    #[test]
    fn test_undo_during_gesture_cancels_it() {
        let (mut surface, id) = surface_with_shape();
        surface.begin_gesture(GestureKind::Drag);
        surface.update_gesture(&[BlockGeometry::new(id, 4, 4, 2, 2)]);

        assert!(surface.undo());
        assert!(surface.snapshot().blocks.is_empty());
        assert!(surface.gesture_state().is_idle());
    }

    #[test]
    fn test_every_commit_is_published_in_order() {
        let (mut surface, id) = surface_with_shape();
        surface.move_block(&id, 3, 3).unwrap();

        let published = surface.drain_published();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].find_block(&id).map(|b| b.x), Some(1));
        assert_eq!(published[1].find_block(&id).map(|b| b.x), Some(3));
        assert!(surface.take_published().is_none());
    }
}
