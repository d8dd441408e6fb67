//! Session files
//!
//! A session file holds the complete editing state of one page (global history
//! plus the local history of every surface), so every command continues where
//! the previous one stopped.

use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use block_engine_edit::{CompositeEditor, EditorSessionState, SurfaceKind};
use semver::Version;

use crate::{Settings, VERSION};

/// Fresh editor with every surface ready.
pub fn new_editor(settings: &Settings) -> CompositeEditor {
    let mut editor = CompositeEditor::with_config(settings.history_config());
    for kind in SurfaceKind::ALL {
        editor.mark_ready(kind);
    }
    editor
}

pub fn load_session(path: &Path, settings: &Settings) -> anyhow::Result<CompositeEditor> {
    if !path.exists() {
        bail!("Session file {:?} does not exist, create it with `block_draw new`", path);
    }
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read session file {:?}", path))?;
    let state = EditorSessionState::from_json(&content).with_context(|| format!("Failed to parse session file {:?}", path))?;
    check_version(&state.app_version);

    let mut editor = CompositeEditor::with_config(settings.history_config());
    editor.restore_session(state).context("Failed to restore session")?;
    for kind in SurfaceKind::ALL {
        editor.mark_ready(kind);
    }
    log::debug!("Session loaded from {:?}", path);
    Ok(editor)
}

/// Writes the session. Uses atomic write: write to temp file then rename.
pub fn save_session(path: &Path, editor: &CompositeEditor) -> anyhow::Result<()> {
    let state = editor.session_state();
    let json = state.to_json().context("Failed to serialize session")?;

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, &json).with_context(|| format!("Failed to write session file {:?}", temp_path))?;
    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err).with_context(|| format!("Failed to rename session file to {:?}", path));
    }

    log::info!("Session saved to {:?} ({} global entries)", path, editor.history().len());
    Ok(())
}

fn check_version(app_version: &str) {
    if app_version.is_empty() {
        return;
    }
    match Version::parse(app_version) {
        Ok(written_by) if written_by > *VERSION => {
            log::warn!("Session was written by a newer version ({}), running {}", written_by, *VERSION);
        }
        Ok(_) => {}
        Err(err) => log::warn!("Session has an invalid app version '{}': {}", app_version, err),
    }
}
