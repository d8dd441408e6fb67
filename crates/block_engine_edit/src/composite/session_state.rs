//! Session state of a composite editor
//!
//! Contains everything needed to continue editing after a restart:
//! - the global history and its cursor
//! - the local history of every surface

use std::collections::BTreeMap;

use block_engine::{Result, SurfaceKind, SurfaceSnapshot};
use serde::{Deserialize, Serialize};

use super::CompositeEntry;
use crate::PersistedHistory;

/// Serialized form of a whole editing session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EditorSessionState {
    /// Version for future compatibility
    #[serde(default = "default_version")]
    pub version: u32,

    /// Version of the application that wrote the session
    #[serde(default)]
    pub app_version: String,

    /// Global history
    pub composite: PersistedHistory<CompositeEntry>,

    /// Surface name -> local history. Missing surfaces start from the global entry.
    #[serde(default)]
    pub surfaces: BTreeMap<String, PersistedHistory<SurfaceSnapshot>>,
}

fn default_version() -> u32 {
    1
}

impl EditorSessionState {
    pub const VERSION: u32 = 1;

    pub fn surface(&self, kind: SurfaceKind) -> Option<&PersistedHistory<SurfaceSnapshot>> {
        self.surfaces.get(kind.name())
    }

    /// Checks every contained history. A session is applied all or nothing.
    pub fn validate(&self) -> Result<()> {
        self.composite.validate()?;
        for history in self.surfaces.values() {
            history.validate()?;
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let state: Self = serde_json::from_str(json).map_err(|e| block_engine::EngineError::malformed_history(e.to_string()))?;
        state.validate()?;
        Ok(state)
    }
}
