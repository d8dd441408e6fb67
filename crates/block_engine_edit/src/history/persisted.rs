use block_engine::{EngineError, Result};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Serialized form of a history: every entry plus the cursor.
///
/// ```json
/// { "history": [ ... ], "index": 3 }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistedHistory<S> {
    pub history: Vec<S>,
    pub index: usize,
}

impl<S> PersistedHistory<S> {
    /// A persisted history is only restorable when it has at least one entry
    /// and the index points at one of them.
    pub fn validate(&self) -> Result<()> {
        if self.history.is_empty() {
            return Err(EngineError::malformed_history("history has no entries"));
        }
        if self.index >= self.history.len() {
            return Err(EngineError::malformed_history(format!(
                "index {} out of range (0..{})",
                self.index,
                self.history.len()
            )));
        }
        Ok(())
    }

    pub fn current(&self) -> Option<&S> {
        self.history.get(self.index)
    }
}

impl<S: Serialize> PersistedHistory<S> {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<S: DeserializeOwned> PersistedHistory<S> {
    /// Parses and validates. Anything that is not a well formed, restorable
    /// history is refused as a whole.
    pub fn from_json(json: &str) -> Result<Self> {
        let persisted: Self = serde_json::from_str(json).map_err(|e| EngineError::malformed_history(e.to_string()))?;
        persisted.validate()?;
        Ok(persisted)
    }
}
