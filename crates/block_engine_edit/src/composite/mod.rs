//! Composite editor: header, content and footer under one global undo/redo.
//!
//! Each surface keeps its own local history. The composite editor folds every
//! state a ready surface publishes into a global history of
//! [`CompositeEntry`] values. Global undo/redo restores an entry and pushes its
//! surface states back into the surfaces through
//! [`SurfaceController::apply_external`], so the local histories follow along.

use std::collections::BTreeMap;
use std::time::Instant;

use block_engine::{Result, SurfaceKind, SurfaceSnapshot};
use chrono::Utc;

use crate::{HistoryConfig, HistoryManager, PersistedHistory, SnapshotStorage, SurfaceController};

mod entry;
pub use entry::CompositeEntry;

mod session_state;
pub use session_state::EditorSessionState;

pub struct CompositeEditor {
    header: SurfaceController,
    content: SurfaceController,
    footer: SurfaceController,
    history: HistoryManager<CompositeEntry>,
    ready: [bool; 3],
}

fn slot(kind: SurfaceKind) -> usize {
    match kind {
        SurfaceKind::Header => 0,
        SurfaceKind::Content => 1,
        SurfaceKind::Footer => 2,
    }
}

impl Default for CompositeEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeEditor {
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    /// `config` applies to the global history and to every surface history.
    pub fn with_config(config: HistoryConfig) -> Self {
        let surface = |kind: SurfaceKind| SurfaceController::with_snapshot(kind, SurfaceSnapshot::for_surface(kind), config);
        Self {
            header: surface(SurfaceKind::Header),
            content: surface(SurfaceKind::Content),
            footer: surface(SurfaceKind::Footer),
            history: HistoryManager::with_config(CompositeEntry::default(), config),
            ready: [false; 3],
        }
    }

    /// Builds an editor and replays the persisted global history into it.
    ///
    /// # Errors
    ///
    /// Refuses malformed histories.
    pub fn from_persisted(persisted: PersistedHistory<CompositeEntry>, config: HistoryConfig) -> Result<Self> {
        let mut editor = Self::with_config(config);
        editor.load(persisted)?;
        Ok(editor)
    }

    pub fn surface(&self, kind: SurfaceKind) -> &SurfaceController {
        match kind {
            SurfaceKind::Header => &self.header,
            SurfaceKind::Content => &self.content,
            SurfaceKind::Footer => &self.footer,
        }
    }

    pub fn surface_mut(&mut self, kind: SurfaceKind) -> &mut SurfaceController {
        match kind {
            SurfaceKind::Header => &mut self.header,
            SurfaceKind::Content => &mut self.content,
            SurfaceKind::Footer => &mut self.footer,
        }
    }

    pub fn history(&self) -> &HistoryManager<CompositeEntry> {
        &self.history
    }

    pub fn current(&self) -> &CompositeEntry {
        self.history.current()
    }

    pub fn is_ready(&self, kind: SurfaceKind) -> bool {
        self.ready[slot(kind)]
    }

    /// The surface finished initializing. From now on its published states are
    /// folded into the global history, starting with its current one.
    pub fn mark_ready(&mut self, kind: SurfaceKind) -> bool {
        self.ready[slot(kind)] = true;
        self.surface(kind).publish_current();
        self.sync() > 0
    }

    /// Folds every pending publication of a ready surface into the global history,
    /// one entry per surface change, oldest first. Returns the number of new
    /// global entries.
    pub fn sync(&mut self) -> usize {
        let mut committed = 0;
        for kind in SurfaceKind::ALL {
            let states = self.surface(kind).drain_published();
            if states.is_empty() {
                continue;
            }
            if !self.is_ready(kind) {
                log::trace!("{kind}: not ready, dropping {} published state(s)", states.len());
                continue;
            }
            for state in states {
                if self.fold(kind, state) {
                    committed += 1;
                }
            }
        }
        committed
    }

    fn fold(&mut self, kind: SurfaceKind, state: SurfaceSnapshot) -> bool {
        let current = self.history.current();
        if current.get(kind) == Some(&state) {
            return false;
        }
        let next = current.with(kind, state, Utc::now());
        self.history.commit(next)
    }

    /// Fires due debounced commits of all surfaces and folds the results.
    pub fn poll_at(&mut self, now: Instant) -> usize {
        for kind in SurfaceKind::ALL {
            self.surface_mut(kind).poll_at(now);
        }
        self.sync()
    }

    pub fn poll(&mut self) -> usize {
        self.poll_at(Instant::now())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo() || SurfaceKind::ALL.iter().any(|kind| self.surface(*kind).has_pending_edits())
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Global undo. Pending edits of all surfaces are committed first so they
    /// are what gets undone.
    pub fn undo(&mut self) -> bool {
        self.settle();
        if !self.history.undo() {
            return false;
        }
        self.dispatch_current();
        true
    }

    pub fn redo(&mut self) -> bool {
        self.settle();
        if !self.history.redo() {
            return false;
        }
        self.dispatch_current();
        true
    }

    fn settle(&mut self) {
        for kind in SurfaceKind::ALL {
            let surface = self.surface_mut(kind);
            surface.cancel_gesture();
            surface.flush_pending();
        }
        self.sync();
    }

    /// Pushes the states of the current global entry into the surfaces. The
    /// publications this causes are dropped, they must not become new entries.
    fn dispatch_current(&mut self) {
        let entry = self.history.current().clone();
        for (kind, state) in entry.surfaces() {
            let surface = self.surface_mut(kind);
            surface.apply_external(state.clone());
            surface.drain_published();
        }
    }

    // ====================================================================
    // Persistence
    // ====================================================================

    pub fn save(&self) -> PersistedHistory<CompositeEntry> {
        self.history.save()
    }

    /// Restores the global history verbatim and replays the entry at its cursor
    /// into the surfaces. Surfaces present in that entry are marked ready.
    ///
    /// # Errors
    ///
    /// Malformed input is refused before anything is applied.
    pub fn load(&mut self, persisted: PersistedHistory<CompositeEntry>) -> Result<()> {
        self.history.load(persisted)?;
        let present: Vec<SurfaceKind> = self.history.current().surfaces().map(|(kind, _)| kind).collect();
        for kind in present {
            self.ready[slot(kind)] = true;
        }
        self.dispatch_current();
        log::debug!("restored global history ({} entries, at {})", self.history.len(), self.history.cursor());
        Ok(())
    }

    pub fn session_state(&self) -> EditorSessionState {
        let surfaces = SurfaceKind::ALL
            .iter()
            .map(|kind| (kind.name().to_string(), self.surface(*kind).save_history()))
            .collect::<BTreeMap<_, _>>();
        EditorSessionState {
            version: EditorSessionState::VERSION,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            composite: self.save(),
            surfaces,
        }
    }

    /// Restores local and global histories.
    ///
    /// # Errors
    ///
    /// The whole session is validated first; on error nothing is applied.
    pub fn restore_session(&mut self, state: EditorSessionState) -> Result<()> {
        state.validate()?;
        for kind in SurfaceKind::ALL {
            if let Some(history) = state.surface(kind) {
                self.surface_mut(kind).load_history(history.clone())?;
            }
        }
        self.load(state.composite)
    }

    /// Writes the global history as JSON under `key`.
    pub fn save_to(&self, storage: &dyn SnapshotStorage, key: &str) -> Result<()> {
        storage.save(key, &self.save().to_json()?)
    }

    /// Loads the global history stored under `key`. Returns `false` when the key
    /// does not exist.
    pub fn load_from(&mut self, storage: &dyn SnapshotStorage, key: &str) -> Result<bool> {
        let Some(json) = storage.load(key)? else {
            return Ok(false);
        };
        let persisted = PersistedHistory::from_json(&json)?;
        self.load(persisted)?;
        Ok(true)
    }

    /// Fresh editor with the stored history applied. Stored data that can't be
    /// restored is logged and ignored. Surfaces missing from the restored entry
    /// still have to call [`mark_ready`](Self::mark_ready).
    pub fn load_or_default(storage: &dyn SnapshotStorage, key: &str, config: HistoryConfig) -> Self {
        let mut editor = Self::with_config(config);
        match editor.load_from(storage, key) {
            Ok(true) => {}
            Ok(false) => log::debug!("no stored history under '{key}'"),
            Err(err) => {
                log::warn!("Failed to restore history '{key}': {err}");
                editor = Self::with_config(config);
            }
        }
        editor
    }
}

impl std::fmt::Debug for CompositeEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeEditor")
            .field("header", &self.header)
            .field("content", &self.content)
            .field("footer", &self.footer)
            .field("history", &self.history)
            .field("ready", &self.ready)
            .finish()
    }
}
