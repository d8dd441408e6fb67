#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::too_many_lines, clippy::cast_sign_loss, clippy::module_name_repetitions)]

use std::path::PathBuf;

use block_engine_edit::{BlockKind, SurfaceKind};
use clap::{Parser, Subcommand};
use flexi_logger::{Cleanup, Criterion, Duplicate, FileSpec, Logger, LoggerHandle, Naming};
use lazy_static::lazy_static;
use semver::Version;

mod commands;
mod render;
mod session;
mod settings;

pub use settings::Settings;

lazy_static! {
    pub static ref VERSION: Version = Version::parse(env!("CARGO_PKG_VERSION")).unwrap_or_else(|_| Version::new(0, 0, 0));
}

#[derive(Parser, Debug)]
#[command(version, about = "Edit grid based page layouts with undo/redo", long_about = None)]
pub struct Cli {
    /// Session file holding the page and its history
    #[arg(short, long, global = true, value_name = "FILE", default_value = "page.json")]
    session: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty page
    New {
        /// Overwrite an existing session file
        #[arg(long)]
        force: bool,
    },

    /// Show history and block statistics
    Info,

    /// Add a block (section, textbox, shape, shape:circle, ...)
    Add {
        surface: SurfaceKind,
        kind: BlockKind,
        #[arg(short, default_value_t = 0)]
        x: i32,
        #[arg(short, default_value_t = 0)]
        y: i32,
        #[arg(short)]
        w: Option<i32>,
        #[arg(long = "height", short = 'H')]
        h: Option<i32>,
        /// Text of a textbox
        #[arg(long)]
        text: Option<String>,
    },

    /// Drag a block to a new cell, optionally resizing it
    Move {
        surface: SurfaceKind,
        id: String,
        x: i32,
        y: i32,
        #[arg(short)]
        w: Option<i32>,
        #[arg(long = "height", short = 'H')]
        h: Option<i32>,
    },

    /// Delete a block
    Delete { surface: SurfaceKind, id: String },

    /// Duplicate a block one cell down and right
    Duplicate { surface: SurfaceKind, id: String },

    /// Paint a block above all others
    Front { surface: SurfaceKind, id: String },

    /// Paint a block below all others
    Back { surface: SurfaceKind, id: String },

    /// Set attributes (KEY=VALUE, values are parsed as JSON when possible)
    Style {
        surface: SurfaceKind,
        /// Block to style; the surface itself when omitted
        #[arg(long)]
        block: Option<String>,
        #[arg(value_name = "KEY=VALUE", required = true)]
        values: Vec<String>,
        /// Treat the values as one continuous slider movement
        #[arg(long)]
        continuous: bool,
    },

    /// Change the grid of a surface
    Grid {
        surface: SurfaceKind,
        #[arg(long)]
        rows: Option<i32>,
        #[arg(long)]
        columns: Option<i32>,
        #[arg(long)]
        padding: Option<i32>,
    },

    /// Undo the last change (of one surface with --surface, globally otherwise)
    Undo {
        #[arg(long)]
        surface: Option<SurfaceKind>,
    },

    /// Redo the last undone change
    Redo {
        #[arg(long)]
        surface: Option<SurfaceKind>,
    },

    /// Print surfaces as text
    Render {
        #[arg(long)]
        surface: Option<SurfaceKind>,
        /// Container width in pixels (defaults to the configured width)
        #[arg(long)]
        width: Option<i32>,
    },
}

fn get_log_dir() -> Option<PathBuf> {
    if let Some(dir) = Settings::config_dir() {
        if !dir.exists() {
            std::fs::create_dir_all(&dir).ok()?;
        }
        return Some(dir);
    }
    None
}

fn start_logger(settings: &Settings) -> Option<LoggerHandle> {
    let Some(log_dir) = get_log_dir() else {
        eprintln!("Failed to create log file");
        return None;
    };
    let logger = match Logger::try_with_env_or_str(&settings.log_spec) {
        Ok(logger) => logger,
        Err(err) => {
            eprintln!("Invalid log spec '{}': {}", settings.log_spec, err);
            return None;
        }
    };
    logger
        .log_to_file(FileSpec::default().directory(&log_dir).basename("block_draw").suffix("log").suppress_timestamp())
        .rotate(Criterion::Size(64 * 1024), Naming::Numbers, Cleanup::KeepLogFiles(3))
        .duplicate_to_stderr(Duplicate::Warn)
        .start()
        .map_err(|err| eprintln!("Failed to start logger: {err}"))
        .ok()
}

fn main() {
    let cli = Cli::parse();
    let settings = Settings::load();
    let _logger = start_logger(&settings);

    log::info!("Starting block_draw {}", *VERSION);

    if let Err(err) = commands::run(cli.command, &cli.session, &settings) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
