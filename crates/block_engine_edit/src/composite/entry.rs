use block_engine::{SurfaceKind, SurfaceSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One step of the global history: the last known state of every surface that
/// was ready at that point. `None` means "inherit from the previous entry".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompositeEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<SurfaceSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<SurfaceSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<SurfaceSnapshot>,
    pub timestamp: DateTime<Utc>,
}

impl Default for CompositeEntry {
    fn default() -> Self {
        Self::empty(Utc::now())
    }
}

impl CompositeEntry {
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            header: None,
            content: None,
            footer: None,
            timestamp,
        }
    }

    pub fn get(&self, kind: SurfaceKind) -> Option<&SurfaceSnapshot> {
        match kind {
            SurfaceKind::Header => self.header.as_ref(),
            SurfaceKind::Content => self.content.as_ref(),
            SurfaceKind::Footer => self.footer.as_ref(),
        }
    }

    /// Copy of this entry with `kind` replaced, all other surfaces carried over.
    pub fn with(&self, kind: SurfaceKind, state: SurfaceSnapshot, timestamp: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        match kind {
            SurfaceKind::Header => next.header = Some(state),
            SurfaceKind::Content => next.content = Some(state),
            SurfaceKind::Footer => next.footer = Some(state),
        }
        next.timestamp = timestamp;
        next
    }

    /// Surfaces with a recorded state, in header, content, footer order.
    pub fn surfaces(&self) -> impl Iterator<Item = (SurfaceKind, &SurfaceSnapshot)> {
        SurfaceKind::ALL.into_iter().filter_map(|kind| self.get(kind).map(|state| (kind, state)))
    }
}
