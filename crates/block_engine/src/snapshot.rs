use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Attributes, Block, EngineError, GridSettings, layout};

/// One independently editable region of a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    Header,
    Content,
    Footer,
}

impl SurfaceKind {
    pub const ALL: [SurfaceKind; 3] = [SurfaceKind::Header, SurfaceKind::Content, SurfaceKind::Footer];

    pub fn name(&self) -> &'static str {
        match self {
            SurfaceKind::Header => "header",
            SurfaceKind::Content => "content",
            SurfaceKind::Footer => "footer",
        }
    }

    /// Namespace prepended to generated block ids.
    ///
    /// Content ids carry no prefix; header and footer ids do, so that snapshots of
    /// different surfaces can be merged into one identity space.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            SurfaceKind::Header => "header-",
            SurfaceKind::Content => "",
            SurfaceKind::Footer => "footer-",
        }
    }

    pub fn default_grid_settings(&self) -> GridSettings {
        match self {
            SurfaceKind::Header | SurfaceKind::Footer => GridSettings::default().with_rows(4),
            SurfaceKind::Content => GridSettings::default(),
        }
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SurfaceKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SurfaceKind::ALL
            .iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| EngineError::UnknownSurface { name: s.to_string() })
    }
}

/// Entire editable state of one surface at one point in time.
///
/// Snapshots are values: an edit builds a new snapshot instead of mutating the
/// previous one, and two snapshots are equal when their contents are equal.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceSnapshot {
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub grid_settings: GridSettings,
    /// Surface-level style (background, border, ...), opaque to the engine.
    #[serde(default)]
    pub style: Attributes,
}

impl SurfaceSnapshot {
    pub fn new(grid_settings: GridSettings) -> Self {
        Self {
            blocks: Vec::new(),
            grid_settings,
            style: Attributes::new(),
        }
    }

    pub fn for_surface(kind: SurfaceKind) -> Self {
        Self::new(kind.default_grid_settings())
    }

    pub fn with_blocks(&self, blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            grid_settings: self.grid_settings.clone(),
            style: self.style.clone(),
        }
    }

    pub fn with_grid_settings(&self, grid_settings: GridSettings) -> Self {
        Self {
            blocks: self.blocks.clone(),
            grid_settings,
            style: self.style.clone(),
        }
    }

    pub fn with_style(&self, style: Attributes) -> Self {
        Self {
            blocks: self.blocks.clone(),
            grid_settings: self.grid_settings.clone(),
            style,
        }
    }

    pub fn rows(&self) -> i32 {
        self.grid_settings.rows
    }

    pub fn find_block(&self, id: &str) -> Option<&Block> {
        layout::find_block(&self.blocks, id)
    }

    pub fn max_layer(&self) -> Option<i32> {
        layout::max_layer(&self.blocks)
    }

    pub fn paint_order(&self) -> Vec<&Block> {
        layout::paint_order(&self.blocks)
    }

    /// Topmost block covering the cell.
    pub fn block_at(&self, x: i32, y: i32) -> Option<&Block> {
        layout::blocks_at(&self.blocks, x, y).into_iter().next()
    }

    /// True when every block satisfies `0 <= y` and `y + h <= rows`.
    pub fn is_vertically_contained(&self) -> bool {
        self.blocks.iter().all(|b| b.y >= 0 && b.bottom() <= self.rows())
    }
}
