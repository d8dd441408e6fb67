//! Grid coordinate model.
//!
//! Pure conversions between pixel geometry and grid cells plus the vertical
//! clamp applied on every layout change. Nothing in here mutates stored state;
//! persisted block geometry is always in cell units, pixels are only used for
//! interactive feedback and rendering.

use serde::{Deserialize, Serialize};

use crate::Block;

/// Horizontal placement of the grid inside its container. Presentation only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Grid configuration of one surface.
///
/// `fill_screen_height`, `content_width` and `alignment` are passthrough fields:
/// the engine stores them but never clamps or interprets them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSettings {
    pub rows: i32,
    pub columns: i32,
    pub horizontal_margin: i32,
    pub vertical_margin: i32,
    pub padding: i32,

    #[serde(default)]
    pub fill_screen_height: bool,
    #[serde(default)]
    pub content_width: Option<i32>,
    #[serde(default)]
    pub alignment: Alignment,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            rows: 24,
            columns: 12,
            horizontal_margin: 8,
            vertical_margin: 8,
            padding: 16,
            fill_screen_height: false,
            content_width: None,
            alignment: Alignment::default(),
        }
    }
}

impl GridSettings {
    pub fn with_rows(mut self, rows: i32) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_columns(mut self, columns: i32) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_margins(mut self, horizontal: i32, vertical: i32) -> Self {
        self.horizontal_margin = horizontal;
        self.vertical_margin = vertical;
        self
    }

    pub fn with_padding(mut self, padding: i32) -> Self {
        self.padding = padding;
        self
    }
}

/// Side length of one square cell in pixels.
///
/// `floor((container_width - (columns - 1) * margin - 2 * padding) / columns)`.
/// Floors so the grid never overflows its container; yields 0 for a degenerate
/// grid (no columns or not enough room). Saturates on extreme settings.
pub fn cell_size(container_width: i32, columns: i32, margin: i32, padding: i32) -> i32 {
    if columns <= 0 {
        return 0;
    }
    let available = container_width
        .saturating_sub((columns - 1).saturating_mul(margin))
        .saturating_sub(padding.saturating_mul(2));
    available.div_euclid(columns).max(0)
}

/// Pixel height of a grid with `rows` rows. Saturates on extreme settings.
pub fn total_height(rows: i32, cell_size: i32, margin: i32, padding: i32) -> i32 {
    let padding = padding.saturating_mul(2);
    if rows <= 0 {
        return padding;
    }
    rows.saturating_mul(cell_size)
        .saturating_add((rows - 1).saturating_mul(margin))
        .saturating_add(padding)
}

/// `min(max(0, y), rows - h)`
pub fn clamp_y(y: i32, h: i32, rows: i32) -> i32 {
    y.max(0).min(rows.saturating_sub(h))
}

/// Corrects the vertical position of `block` so that `y + h <= rows`.
///
/// Out-of-range input is corrected, never refused. The horizontal position is
/// left alone: overflow past the last column is tolerated.
pub fn clamp_vertical(block: &Block, rows: i32) -> Block {
    Block {
        y: clamp_y(block.y, block.h, rows),
        ..block.clone()
    }
}

/// Cell index for a pixel offset, using `cell_size + margin` as the stride.
pub fn pixel_to_cell(px: i32, cell_size: i32, margin: i32) -> i32 {
    let stride = cell_size.saturating_add(margin);
    if stride <= 0 {
        return 0;
    }
    px.div_euclid(stride)
}

/// Pixel offset of a cell index, using `cell_size + margin` as the stride.
pub fn cell_to_pixel(cell: i32, cell_size: i32, margin: i32) -> i32 {
    cell.saturating_mul(cell_size.saturating_add(margin))
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Pixel metrics of a grid laid out in a container of a given width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridMetrics {
    pub cell_size: i32,
    pub horizontal_margin: i32,
    pub vertical_margin: i32,
    pub padding: i32,
    pub rows: i32,
}

impl GridMetrics {
    pub fn new(settings: &GridSettings, container_width: i32) -> Self {
        Self {
            cell_size: cell_size(container_width, settings.columns, settings.horizontal_margin, settings.padding),
            horizontal_margin: settings.horizontal_margin,
            vertical_margin: settings.vertical_margin,
            padding: settings.padding,
            rows: settings.rows,
        }
    }

    pub fn total_height(&self) -> i32 {
        total_height(self.rows, self.cell_size, self.vertical_margin, self.padding)
    }

    /// Pixel rectangle of a block, including the grid padding.
    /// Spans cover the margins between the cells they include.
    pub fn block_rect(&self, block: &Block) -> PixelRect {
        PixelRect {
            x: self.padding.saturating_add(cell_to_pixel(block.x, self.cell_size, self.horizontal_margin)),
            y: self.padding.saturating_add(cell_to_pixel(block.y, self.cell_size, self.vertical_margin)),
            width: span(block.w, self.cell_size, self.horizontal_margin),
            height: span(block.h, self.cell_size, self.vertical_margin),
        }
    }

    /// Grid cell under a pixel position (relative to the container origin).
    pub fn cell_at(&self, px: i32, py: i32) -> (i32, i32) {
        (
            pixel_to_cell(px.saturating_sub(self.padding), self.cell_size, self.horizontal_margin),
            pixel_to_cell(py.saturating_sub(self.padding), self.cell_size, self.vertical_margin),
        )
    }
}

fn span(cells: i32, cell_size: i32, margin: i32) -> i32 {
    if cells <= 0 {
        return 0;
    }
    cells.saturating_mul(cell_size).saturating_add((cells - 1).saturating_mul(margin))
}
