use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, bail};
use block_engine_edit::{
    Attributes, Block, BlockGeometry, BlockTemplate, CompositeEditor, EngineError, GestureKind, SurfaceController, SurfaceKind,
};
use serde_json::Value;

use crate::{Command, Settings, render, session};

/// Spacing of the synthetic events of a `--continuous` style edit.
const SLIDER_STEP: Duration = Duration::from_millis(10);

pub fn run(command: Command, path: &Path, settings: &Settings) -> anyhow::Result<()> {
    if let Command::New { force } = command {
        if path.exists() && !force {
            bail!("{:?} already exists, use --force to overwrite it", path);
        }
        let editor = session::new_editor(settings);
        session::save_session(path, &editor)?;
        println!("Created {}", path.display());
        return Ok(());
    }

    let mut editor = session::load_session(path, settings)?;
    let modified = execute(command, &mut editor, settings)?;
    if modified {
        editor.sync();
        session::save_session(path, &editor)?;
    }
    Ok(())
}

/// Runs one command against a loaded editor. Returns whether the session must be saved.
fn execute(command: Command, editor: &mut CompositeEditor, settings: &Settings) -> anyhow::Result<bool> {
    match command {
        Command::New { .. } => Ok(false),
        Command::Info => {
            print!("{}", info(editor));
            if let Some(file) = Settings::config_file() {
                println!("settings: {}", file.display());
            }
            Ok(false)
        }
        Command::Add { surface, kind, x, y, w, h, text } => {
            let mut template = BlockTemplate::new(kind).at(x, y);
            template.w = w;
            template.h = h;
            if let Some(text) = text {
                template.attributes.set(block_engine_edit::CONTENT_KEY, text);
            }
            let id = editor.surface_mut(surface).add_block(&template)?;
            println!("{id}");
            Ok(true)
        }
        Command::Move { surface, id, x, y, w, h } => {
            let moved = drag(editor.surface_mut(surface), &id, x, y, w, h)?;
            if !moved {
                println!("{id} did not move");
            }
            Ok(moved)
        }
        Command::Delete { surface, id } => {
            editor.surface_mut(surface).delete_block(&id)?;
            Ok(true)
        }
        Command::Duplicate { surface, id } => {
            let new_id = editor.surface_mut(surface).duplicate_block(&id)?;
            println!("{new_id}");
            Ok(true)
        }
        Command::Front { surface, id } => Ok(editor.surface_mut(surface).bring_to_front(&id)?),
        Command::Back { surface, id } => Ok(editor.surface_mut(surface).send_to_back(&id)?),
        Command::Style {
            surface,
            block,
            values,
            continuous,
        } => {
            let pairs = values.iter().map(|v| parse_pair(v)).collect::<anyhow::Result<Vec<_>>>()?;
            if continuous {
                slide(editor, surface, block.as_deref(), &pairs, settings.debounce_delay())?;
            } else {
                let mut partial = Attributes::new();
                for (key, value) in pairs {
                    partial.set(key, value);
                }
                let target = editor.surface_mut(surface);
                match block {
                    Some(id) => target.update_block(&id, &partial)?,
                    None => target.update_style(&partial),
                };
            }
            Ok(true)
        }
        Command::Grid { surface, rows, columns, padding } => {
            let target = editor.surface_mut(surface);
            let mut grid = target.snapshot().grid_settings.clone();
            if let Some(rows) = rows {
                grid.rows = rows;
            }
            if let Some(columns) = columns {
                grid.columns = columns;
            }
            if let Some(padding) = padding {
                grid.padding = padding;
            }
            Ok(target.set_grid_settings(grid))
        }
        Command::Undo { surface } => {
            let changed = match surface {
                Some(kind) => editor.surface_mut(kind).undo(),
                None => editor.undo(),
            };
            if !changed {
                println!("Nothing to undo");
            }
            Ok(changed)
        }
        Command::Redo { surface } => {
            let changed = match surface {
                Some(kind) => editor.surface_mut(kind).redo(),
                None => editor.redo(),
            };
            if !changed {
                println!("Nothing to redo");
            }
            Ok(changed)
        }
        Command::Render { surface, width } => {
            let width = width.unwrap_or(settings.container_width);
            let kinds = surface.map_or_else(|| SurfaceKind::ALL.to_vec(), |kind| vec![kind]);
            for kind in kinds {
                println!("{}", render::render_surface(kind, editor.surface(kind).snapshot(), width));
            }
            Ok(false)
        }
    }
}

/// Replays a drag (or resize when a size is given) the way an interactive
/// geometry engine reports it: a full layout report, committed once on release.
fn drag(surface: &mut SurfaceController, id: &str, x: i32, y: i32, w: Option<i32>, h: Option<i32>) -> anyhow::Result<bool> {
    let mut report: Vec<BlockGeometry> = surface.snapshot().blocks.iter().map(Block::geometry).collect();
    let Some(target) = report.iter_mut().rev().find(|g| g.id == id) else {
        return Err(EngineError::block_not_found(id).into());
    };
    target.x = x;
    target.y = y;
    if let Some(w) = w {
        target.w = w.max(1);
    }
    if let Some(h) = h {
        target.h = h.max(1);
    }

    let kind = if w.is_some() || h.is_some() { GestureKind::Resize } else { GestureKind::Drag };
    surface.begin_gesture(kind);
    Ok(surface.end_gesture(&report))
}

/// Feeds the values as one burst of slider events and lets the debounce settle.
fn slide(editor: &mut CompositeEditor, kind: SurfaceKind, block: Option<&str>, pairs: &[(String, Value)], delay: Duration) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut now = start;
    for (key, value) in pairs {
        let partial = Attributes::new().with(key.clone(), value.clone());
        let surface = editor.surface_mut(kind);
        match block {
            Some(id) => surface.update_block_debounced(key, id, &partial, delay, now)?,
            None => surface.update_style_debounced(key, &partial, delay, now),
        }
        now += SLIDER_STEP;
    }
    let committed = editor.poll_at(now + delay);
    log::debug!("continuous edit of {} value(s) produced {committed} global entr(ies)", pairs.len());
    Ok(())
}

fn parse_pair(text: &str) -> anyhow::Result<(String, Value)> {
    let (key, value) = text.split_once('=').with_context(|| format!("expected KEY=VALUE, got '{text}'"))?;
    let key = key.trim();
    if key.is_empty() {
        bail!("empty key in '{text}'");
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn info(editor: &CompositeEditor) -> String {
    let history = editor.history();
    let timestamp = editor.current().timestamp.with_timezone(&chrono::Local);
    let mut out = format!(
        "global history: {} entries, at {} (last change {})\n",
        history.len(),
        history.cursor(),
        timestamp.format("%Y-%m-%d %H:%M:%S")
    );
    for kind in SurfaceKind::ALL {
        let surface = editor.surface(kind);
        let local = surface.history();
        let snapshot = surface.snapshot();
        out.push_str(&format!(
            "{kind}: {} block(s), {}x{} grid, history {} entries, at {}\n",
            snapshot.blocks.len(),
            snapshot.grid_settings.columns,
            snapshot.grid_settings.rows,
            local.len(),
            local.cursor()
        ));
    }
    out
}
