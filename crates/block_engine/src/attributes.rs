use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key holding the text of a textbox block.
pub const CONTENT_KEY: &str = "content";

/// Opaque bag of visual attributes (color, border, shadow, font, text content).
///
/// The engine stores and merges these values but never interprets them, with the
/// single exception of [`CONTENT_KEY`] for textboxes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Map<String, Value>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Shallow merge: every key of `partial` overwrites the key in `self`.
    /// A `null` value removes the key.
    pub fn merge(&mut self, partial: &Attributes) {
        for (key, value) in &partial.0 {
            if value.is_null() {
                self.0.remove(key);
            } else {
                self.0.insert(key.clone(), value.clone());
            }
        }
    }

    /// Returns a merged copy, leaving `self` untouched.
    pub fn merged(&self, partial: &Attributes) -> Attributes {
        let mut result = self.clone();
        result.merge(partial);
        result
    }
}

impl From<Map<String, Value>> for Attributes {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for Attributes {
    type Error = crate::EngineError;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(crate::EngineError::Generic(format!("attributes must be a JSON object, got {other}"))),
        }
    }
}
