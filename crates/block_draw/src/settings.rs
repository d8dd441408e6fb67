use std::{fs, io::Write, path::PathBuf, time::Duration};

use block_engine_edit::HistoryConfig;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

// =============================================================================
// Project directory constants
// =============================================================================

const PROJECT_QUALIFIER: &str = "com";
const PROJECT_ORGANIZATION: &str = "GitHub";
const PROJECT_APPLICATION: &str = "block_draw";

/// Lazily initialized project directories (computed once on first access)
pub(crate) static PROJECT_DIRS: Lazy<Option<directories::ProjectDirs>> =
    Lazy::new(|| directories::ProjectDirs::from(PROJECT_QUALIFIER, PROJECT_ORGANIZATION, PROJECT_APPLICATION));

/// Persisted values, stored in `settings.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Container width in pixels used for pixel output
    #[serde(default = "default_container_width")]
    pub container_width: i32,

    /// Quiet period before a continuous edit is committed
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Maximum number of history entries per history, unlimited when missing
    #[serde(default)]
    pub history_depth: Option<usize>,

    /// flexi_logger spec, overridden by `RUST_LOG`
    #[serde(default = "default_log_spec")]
    pub log_spec: String,
}

fn default_container_width() -> i32 {
    1200
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_log_spec() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            container_width: default_container_width(),
            debounce_ms: default_debounce_ms(),
            history_depth: None,
            log_spec: default_log_spec(),
        }
    }
}

impl Settings {
    pub const FILE_NAME: &'static str = "settings.toml";

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn history_config(&self) -> HistoryConfig {
        match self.history_depth {
            Some(depth) => HistoryConfig::with_max_depth(depth),
            None => HistoryConfig::unlimited(),
        }
    }

    /// Loads `settings.toml`, writing the defaults on first start.
    pub fn load() -> Self {
        let Some(config_dir) = Self::config_dir() else {
            return Self::default();
        };

        if !config_dir.exists() {
            if let Err(err) = fs::create_dir_all(&config_dir) {
                log::error!("Can't create configuration directory {:?}: {}", config_dir, err);
                return Self::default();
            }
        }

        let settings_file = config_dir.join(Self::FILE_NAME);
        if !settings_file.exists() {
            let settings = Self::default();
            settings.store();
            return settings;
        }

        match fs::read_to_string(&settings_file) {
            Ok(txt) => Self::parse(&txt),
            Err(err) => {
                log::error!("Error reading settings file: {}", err);
                Self::default()
            }
        }
    }

    fn parse(txt: &str) -> Self {
        match toml::from_str::<Settings>(txt) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("Ignoring malformed settings file: {}", err);
                Self::default()
            }
        }
    }

    /// Atomically write settings to file (write to temp, then rename).
    pub fn store(&self) {
        let Some(config_dir) = Self::config_dir() else {
            log::error!("Cannot determine config directory for saving settings");
            return;
        };

        let file_path = config_dir.join(Self::FILE_NAME);
        let temp_path = config_dir.join(format!(".{}.tmp", Self::FILE_NAME));

        match toml::to_string_pretty(self) {
            Ok(text) => {
                let write_result = (|| -> std::io::Result<()> {
                    let mut file = fs::File::create(&temp_path)?;
                    file.write_all(text.as_bytes())?;
                    file.sync_all()?;
                    Ok(())
                })();

                if let Err(err) = write_result {
                    log::error!("Error writing temp settings file: {}", err);
                    let _ = fs::remove_file(&temp_path);
                    return;
                }

                if let Err(err) = fs::rename(&temp_path, &file_path) {
                    log::error!("Error renaming settings file: {}", err);
                    let _ = fs::remove_file(&temp_path);
                }
            }
            Err(err) => log::error!("Error serializing settings: {}", err),
        }
    }

    pub fn config_dir() -> Option<PathBuf> {
        PROJECT_DIRS.as_ref().map(|p| p.config_dir().to_path_buf())
    }

    pub fn config_file() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join(Self::FILE_NAME))
    }
}
