use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Attributes, EngineError, GridSettings, attributes::CONTENT_KEY};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Circle,
    Triangle,
    Line,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [ShapeKind::Rectangle, ShapeKind::Circle, ShapeKind::Triangle, ShapeKind::Line];

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Circle => "circle",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Line => "line",
        }
    }
}

/// What a block is. Rendering of each kind lives outside the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    #[default]
    Section,
    Shape { shape: ShapeKind },
    Textbox,
}

impl BlockKind {
    /// Type name used when generating block ids.
    pub fn type_name(&self) -> &'static str {
        match self {
            BlockKind::Section => "section",
            BlockKind::Shape { .. } => "shape",
            BlockKind::Textbox => "textbox",
        }
    }

    /// Visual attributes a freshly created block of this kind starts with.
    pub fn default_attributes(&self) -> Attributes {
        match self {
            BlockKind::Section => Attributes::new().with("backgroundColor", "#ffffff").with("borderRadius", 0),
            BlockKind::Shape { .. } => Attributes::new()
                .with("backgroundColor", "#3b82f6")
                .with("borderWidth", 0)
                .with("borderColor", "#000000")
                .with("shadow", "none"),
            BlockKind::Textbox => Attributes::new()
                .with(CONTENT_KEY, "")
                .with("fontFamily", "Inter")
                .with("fontSize", 16)
                .with("color", "#111827"),
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Shape { shape } => write!(f, "shape:{}", shape.name()),
            other => write!(f, "{}", other.type_name()),
        }
    }
}

impl FromStr for BlockKind {
    type Err = EngineError;

    /// Accepts `section`, `textbox`, `shape` and `shape:<subtype>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let (head, sub) = match lower.split_once(':') {
            Some((head, sub)) => (head, Some(sub)),
            None => (lower.as_str(), None),
        };
        match (head, sub) {
            ("section", None) => Ok(BlockKind::Section),
            ("textbox", None) => Ok(BlockKind::Textbox),
            ("shape", None) => Ok(BlockKind::Shape { shape: ShapeKind::default() }),
            ("shape", Some(sub)) => ShapeKind::ALL
                .iter()
                .find(|shape| shape.name() == sub)
                .map(|shape| BlockKind::Shape { shape: *shape })
                .ok_or_else(|| EngineError::UnknownBlockKind { name: s.to_string() }),
            _ => Err(EngineError::UnknownBlockKind { name: s.to_string() }),
        }
    }
}

/// Geometry of one block as reported by an interactive drag/resize engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockGeometry {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl BlockGeometry {
    pub fn new(id: impl Into<String>, x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { id: id.into(), x, y, w, h }
    }
}

/// One positioned, sized, layered item on a surface grid.
///
/// Position and size are in grid cells. Blocks may overlap freely; `layer`
/// decides which one paints on top.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    #[serde(default)]
    pub layer: i32,
    #[serde(default)]
    pub kind: BlockKind,
    #[serde(default)]
    pub attributes: Attributes,
}

impl Block {
    pub fn new(id: impl Into<String>, kind: BlockKind, x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            w,
            h,
            layer: 0,
            kind,
            attributes: kind.default_attributes(),
        }
    }

    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn geometry(&self) -> BlockGeometry {
        BlockGeometry::new(self.id.clone(), self.x, self.y, self.w, self.h)
    }

    /// Copy of this block with `x, y, w, h` taken from `geometry`; everything else is kept.
    pub fn with_geometry(&self, geometry: &BlockGeometry) -> Block {
        Block {
            x: geometry.x,
            y: geometry.y,
            w: geometry.w,
            h: geometry.h,
            ..self.clone()
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn contains_cell(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn overlaps(&self, other: &Block) -> bool {
        self.x < other.right() && other.x < self.right() && self.y < other.bottom() && other.y < self.bottom()
    }

    /// Text of a textbox, `None` for every other kind.
    pub fn content(&self) -> Option<&str> {
        if self.kind == BlockKind::Textbox {
            self.attributes.get_str(CONTENT_KEY)
        } else {
            None
        }
    }
}

/// Input of an "add block" gesture.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockTemplate {
    pub kind: BlockKind,
    pub x: i32,
    pub y: i32,
    pub w: Option<i32>,
    pub h: Option<i32>,
    pub attributes: Attributes,
}

impl BlockTemplate {
    pub fn new(kind: BlockKind) -> Self {
        Self {
            kind,
            x: 0,
            y: 0,
            w: None,
            h: None,
            attributes: Attributes::new(),
        }
    }

    pub fn section() -> Self {
        Self::new(BlockKind::Section)
    }

    pub fn shape(shape: ShapeKind) -> Self {
        Self::new(BlockKind::Shape { shape })
    }

    pub fn textbox(text: impl Into<String>) -> Self {
        let mut template = Self::new(BlockKind::Textbox);
        template.attributes.set(CONTENT_KEY, text.into());
        template
    }

    pub fn at(mut self, x: i32, y: i32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn size(mut self, w: i32, h: i32) -> Self {
        self.w = Some(w);
        self.h = Some(h);
        self
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Size used when the template does not specify one.
    /// Sections span the full grid width.
    pub fn default_size(kind: BlockKind, settings: &GridSettings) -> (i32, i32) {
        match kind {
            BlockKind::Section => (settings.columns.max(1), 4),
            BlockKind::Shape { .. } => (4, 4),
            BlockKind::Textbox => (6, 2),
        }
    }

    /// Builds the block. Template attributes are merged over the kind defaults.
    pub fn build(&self, id: impl Into<String>, layer: i32, settings: &GridSettings) -> Block {
        let (default_w, default_h) = Self::default_size(self.kind, settings);
        let w = self.w.unwrap_or(default_w).max(1);
        let h = self.h.unwrap_or(default_h).max(1);
        let attributes = self.kind.default_attributes().merged(&self.attributes);
        Block::new(id, self.kind, self.x, self.y, w, h).with_layer(layer).with_attributes(attributes)
    }
}
