//! Tests for the composite editor (global undo/redo, persistence)

use std::time::{Duration, Instant};

use block_engine_edit::{
    Attributes, BlockTemplate, CompositeEditor, CompositeEntry, EditorSessionState, FileStorage, HistoryConfig, MemoryStorage, PersistedHistory,
    SnapshotStorage, SurfaceKind,
};
use pretty_assertions::assert_eq;

fn ready_editor() -> CompositeEditor {
    let mut editor = CompositeEditor::new();
    for kind in SurfaceKind::ALL {
        editor.mark_ready(kind);
    }
    editor
}

fn block_count(editor: &CompositeEditor, kind: SurfaceKind) -> usize {
    editor.surface(kind).snapshot().blocks.len()
}

#[test]
fn test_entries_inherit_other_surfaces() {
    let mut editor = ready_editor();
    editor.surface_mut(SurfaceKind::Header).add_block(&BlockTemplate::textbox("Logo")).unwrap();
    editor.surface_mut(SurfaceKind::Footer).add_block(&BlockTemplate::section()).unwrap();
    assert_eq!(editor.sync(), 2);

    let entry = editor.current();
    assert_eq!(entry.header.as_ref().map(|h| h.blocks.len()), Some(1));
    assert_eq!(entry.content.as_ref().map(|c| c.blocks.len()), Some(0));
    assert_eq!(entry.footer.as_ref().map(|f| f.blocks.len()), Some(1));
}

#[test]
fn test_global_undo_walks_across_surfaces() {
    let mut editor = ready_editor();
    let base = editor.history().len();

    editor.surface_mut(SurfaceKind::Header).add_block(&BlockTemplate::section()).unwrap();
    editor.sync();
    editor.surface_mut(SurfaceKind::Content).add_block(&BlockTemplate::section()).unwrap();
    editor.sync();
    editor.surface_mut(SurfaceKind::Footer).add_block(&BlockTemplate::section()).unwrap();
    editor.sync();
    assert_eq!(editor.history().len(), base + 3);

    assert!(editor.undo());
    assert_eq!(block_count(&editor, SurfaceKind::Footer), 0);
    assert_eq!(block_count(&editor, SurfaceKind::Content), 1);

    assert!(editor.undo());
    assert_eq!(block_count(&editor, SurfaceKind::Content), 0);
    assert_eq!(block_count(&editor, SurfaceKind::Header), 1);

    assert!(editor.undo());
    assert_eq!(block_count(&editor, SurfaceKind::Header), 0);
    assert_eq!(editor.history().len(), base + 3);

    assert!(editor.redo());
    assert!(editor.redo());
    assert_eq!(block_count(&editor, SurfaceKind::Header), 1);
    assert_eq!(block_count(&editor, SurfaceKind::Content), 1);
    assert_eq!(block_count(&editor, SurfaceKind::Footer), 0);
    assert!(editor.can_redo());
}

#[test]
fn test_edit_after_global_undo_drops_global_redo() {
    let mut editor = ready_editor();
    editor.surface_mut(SurfaceKind::Content).add_block(&BlockTemplate::section()).unwrap();
    editor.sync();
    editor.undo();
    assert!(editor.can_redo());

    editor.surface_mut(SurfaceKind::Header).update_style(&Attributes::new().with("background", "#eee"));
    editor.sync();
    assert!(!editor.can_redo());
}

#[test]
fn test_global_undo_commits_pending_slider_first() {
    let start = Instant::now();
    let mut editor = ready_editor();
    let base = editor.history().len();

    editor
        .surface_mut(SurfaceKind::Content)
        .update_style_debounced("bg", &Attributes::new().with("background", "red"), Duration::from_millis(300), start);
    assert_eq!(editor.poll_at(start + Duration::from_millis(100)), 0);
    assert!(editor.can_undo());

    assert!(editor.undo());
    assert_eq!(editor.history().len(), base + 1);
    assert!(editor.surface(SurfaceKind::Content).snapshot().style.is_empty());
}

#[test]
fn test_poll_folds_debounced_commits() {
    let start = Instant::now();
    let mut editor = ready_editor();
    let base = editor.history().len();

    for i in 0..20u64 {
        let partial = Attributes::new().with("opacity", i);
        editor
            .surface_mut(SurfaceKind::Footer)
            .update_style_debounced("opacity", &partial, Duration::from_millis(300), start + Duration::from_millis(i));
    }
    assert_eq!(editor.poll_at(start + Duration::from_millis(700)), 1);
    assert_eq!(editor.history().len(), base + 1);
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_load_replays_cursor_entry_and_keeps_history() {
    let mut editor = ready_editor();
    editor.surface_mut(SurfaceKind::Content).add_block(&BlockTemplate::section()).unwrap();
    editor.sync();
    editor.surface_mut(SurfaceKind::Content).add_block(&BlockTemplate::section()).unwrap();
    editor.sync();
    editor.undo();
    let saved = editor.save();

    let mut restored = CompositeEditor::from_persisted(saved.clone(), HistoryConfig::default()).unwrap();
    assert_eq!(restored.save(), saved);
    assert_eq!(block_count(&restored, SurfaceKind::Content), 1);

    // continue editing: the redo branch survived the reload
    assert!(restored.redo());
    assert_eq!(block_count(&restored, SurfaceKind::Content), 2);
}

#[test]
fn test_malformed_history_is_refused_without_changes() {
    let mut editor = ready_editor();
    editor.surface_mut(SurfaceKind::Header).add_block(&BlockTemplate::section()).unwrap();
    editor.sync();
    let before = editor.save();

    let bad = PersistedHistory {
        history: vec![CompositeEntry::default()],
        index: 3,
    };
    assert!(editor.load(bad).is_err());
    assert_eq!(editor.save(), before);
    assert_eq!(block_count(&editor, SurfaceKind::Header), 1);
}

#[test]
fn test_session_state_round_trip() {
    let mut editor = ready_editor();
    let id = editor.surface_mut(SurfaceKind::Content).add_block(&BlockTemplate::textbox("Hello")).unwrap();
    editor.surface_mut(SurfaceKind::Content).move_block(&id, 4, 4).unwrap();
    editor.sync();

    let json = editor.session_state().to_json().unwrap();
    let state = EditorSessionState::from_json(&json).unwrap();
    assert_eq!(state.version, EditorSessionState::VERSION);

    let mut restored = CompositeEditor::new();
    restored.restore_session(state).unwrap();
    assert_eq!(restored.save(), editor.save());
    assert_eq!(restored.surface(SurfaceKind::Content).save_history(), editor.surface(SurfaceKind::Content).save_history());
    assert!(SurfaceKind::ALL.iter().all(|kind| restored.is_ready(*kind)));

    // local undo still works after the restore
    assert!(restored.surface_mut(SurfaceKind::Content).undo());
    let block = restored.surface(SurfaceKind::Content).snapshot().find_block(&id).unwrap();
    assert_eq!((block.x, block.y), (0, 0));
}

#[test]
fn test_file_storage_round_trip() {
    let dir = std::env::temp_dir().join(format!("block_engine_edit_composite_{}", std::process::id()));
    let storage = FileStorage::new(&dir);

    let mut editor = ready_editor();
    editor.surface_mut(SurfaceKind::Footer).add_block(&BlockTemplate::section()).unwrap();
    editor.sync();
    editor.save_to(&storage, "layout").unwrap();
    assert!(storage.path_for("layout").exists());

    let mut restored = CompositeEditor::new();
    assert!(restored.load_from(&storage, "layout").unwrap());
    assert_eq!(block_count(&restored, SurfaceKind::Footer), 1);
    assert!(!restored.load_from(&storage, "missing").unwrap());

    storage.remove("layout").unwrap();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_load_or_default_with_missing_key() {
    let storage = MemoryStorage::new();
    let editor = CompositeEditor::load_or_default(&storage, "layout", HistoryConfig::with_max_depth(10));
    assert_eq!(editor.history().len(), 1);
    assert_eq!(editor.history().config().max_depth, Some(10));
}
