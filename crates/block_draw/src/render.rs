//! Text rendering of a surface.
//!
//! Every cell shows the label of the topmost block covering it, blocks are
//! labelled `A`, `B`, ... in paint order.

use std::fmt::Write;

use block_engine_edit::{Block, GridMetrics, SurfaceKind, SurfaceSnapshot, layout};

const EMPTY_CELL: char = '.';

fn label(index: usize) -> char {
    const LABELS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    LABELS.get(index).map_or('*', |b| *b as char)
}

pub fn render_surface(kind: SurfaceKind, snapshot: &SurfaceSnapshot, container_width: i32) -> String {
    let settings = &snapshot.grid_settings;
    let metrics = GridMetrics::new(settings, container_width);
    let painted = snapshot.paint_order();
    let width = painted.iter().map(|b| b.right()).max().unwrap_or(0).max(settings.columns).max(0);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{kind}: {} x {} cells, cell {} px, height {} px",
        settings.columns,
        settings.rows,
        metrics.cell_size,
        metrics.total_height()
    );

    for y in 0..settings.rows {
        let mut line = String::with_capacity(width as usize + 1);
        for x in 0..width {
            if x == settings.columns {
                line.push('|');
            }
            let cell = painted
                .iter()
                .enumerate()
                .rev()
                .find(|(_, block)| block.contains_cell(x, y))
                .map_or(EMPTY_CELL, |(i, _)| label(i));
            line.push(cell);
        }
        let _ = writeln!(out, "{line}");
    }

    for (i, block) in painted.iter().enumerate() {
        let rect = metrics.block_rect(block);
        let _ = writeln!(
            out,
            "{} {} [{}] cells {},{} {}x{} layer {} px {},{} {}x{}",
            label(i),
            block.id,
            block.kind,
            block.x,
            block.y,
            block.w,
            block.h,
            block.layer,
            rect.x,
            rect.y,
            rect.width,
            rect.height
        );
    }

    let overflow: Vec<&Block> = layout::horizontal_overflow(&snapshot.blocks, settings.columns);
    if !overflow.is_empty() {
        let ids: Vec<&str> = overflow.iter().map(|b| b.id.as_str()).collect();
        let _ = writeln!(out, "overflowing columns: {}", ids.join(", "));
    }
    out
}
