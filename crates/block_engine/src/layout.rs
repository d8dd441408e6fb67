//! Layout invariants of a block list.
//!
//! Every function here is pure: it takes the current blocks and returns a new
//! list, leaving the input untouched. Blocks are matched by `id`; when a surface
//! contains the same id twice, lookups resolve to the last match.
//!
//! Overlap is never resolved or prevented. Only `layer` decides which block
//! paints on top.

use crate::{Attributes, Block, BlockGeometry, BlockKind, grid::clamp_vertical};

pub fn max_layer(blocks: &[Block]) -> Option<i32> {
    blocks.iter().map(|b| b.layer).max()
}

pub fn min_layer(blocks: &[Block]) -> Option<i32> {
    blocks.iter().map(|b| b.layer).min()
}

/// Layer for a block that should paint above everything else.
pub fn next_layer(blocks: &[Block]) -> i32 {
    max_layer(blocks).unwrap_or(0) + 1
}

pub fn find_block<'a>(blocks: &'a [Block], id: &str) -> Option<&'a Block> {
    blocks.iter().rev().find(|b| b.id == id)
}

pub fn contains_block(blocks: &[Block], id: &str) -> bool {
    blocks.iter().any(|b| b.id == id)
}

/// Generates an id of the form `{prefix}{type}-{n}` that is not used in `blocks`.
///
/// `counter` is the running count of the surface and is advanced past the
/// returned number. Ids are only unique inside one surface; the prefix is what
/// keeps surfaces apart.
pub fn generate_id(blocks: &[Block], prefix: &str, kind: BlockKind, counter: &mut usize) -> String {
    loop {
        *counter += 1;
        let id = format!("{prefix}{}-{}", kind.type_name(), *counter);
        if !contains_block(blocks, &id) {
            return id;
        }
    }
}

pub fn clamp_all(blocks: &[Block], rows: i32) -> Vec<Block> {
    blocks.iter().map(|b| clamp_vertical(b, rows)).collect()
}

/// Merges a full geometry report of a drag/resize engine with the current blocks.
///
/// Only `x, y, w, h` come from `incoming`; every other attribute of a known block
/// is carried over verbatim. Ids that are not known get a default section block
/// placed on top. Every resulting block is clamped vertically. The order and the
/// set of blocks follow `incoming`.
pub fn merge_geometry(current: &[Block], incoming: &[BlockGeometry], rows: i32) -> Vec<Block> {
    let mut top = max_layer(current).unwrap_or(0);
    let mut result = Vec::with_capacity(incoming.len());

    for geometry in incoming {
        let block = match find_block(current, &geometry.id) {
            Some(known) => known.with_geometry(geometry),
            None => {
                log::debug!("synthesizing block for unknown id '{}'", geometry.id);
                top += 1;
                Block::new(geometry.id.clone(), BlockKind::Section, geometry.x, geometry.y, geometry.w, geometry.h).with_layer(top)
            }
        };
        result.push(clamp_vertical(&block, rows));
    }

    if result.len() < current.len() {
        log::debug!("geometry report dropped {} block(s)", current.len() - result.len());
    }
    result
}

/// Merges `partial` into the attributes of every block with id `id`.
/// Returns `None` when no block matches.
pub fn update_attributes(blocks: &[Block], id: &str, partial: &Attributes) -> Option<Vec<Block>> {
    if !contains_block(blocks, id) {
        return None;
    }
    Some(
        blocks
            .iter()
            .map(|b| {
                if b.id == id {
                    Block {
                        attributes: b.attributes.merged(partial),
                        ..b.clone()
                    }
                } else {
                    b.clone()
                }
            })
            .collect(),
    )
}

/// Moves/resizes one block, clamped vertically.
pub fn set_geometry(blocks: &[Block], geometry: &BlockGeometry, rows: i32) -> Option<Vec<Block>> {
    if !contains_block(blocks, &geometry.id) {
        return None;
    }
    Some(
        blocks
            .iter()
            .map(|b| if b.id == geometry.id { clamp_vertical(&b.with_geometry(geometry), rows) } else { b.clone() })
            .collect(),
    )
}

/// Removes the block. Layers of the remaining blocks are not renumbered.
pub fn remove_block(blocks: &[Block], id: &str) -> Option<Vec<Block>> {
    if !contains_block(blocks, id) {
        return None;
    }
    Some(blocks.iter().filter(|b| b.id != id).cloned().collect())
}

/// Appends a copy of `id` under `new_id`, offset by one cell and painted on top.
pub fn duplicate_block(blocks: &[Block], id: &str, new_id: &str, rows: i32) -> Option<Vec<Block>> {
    let source = find_block(blocks, id)?;
    let copy = Block {
        id: new_id.to_string(),
        x: source.x + 1,
        y: source.y + 1,
        layer: next_layer(blocks),
        ..source.clone()
    };
    let mut result = blocks.to_vec();
    result.push(clamp_vertical(&copy, rows));
    Some(result)
}

pub fn set_layer(blocks: &[Block], id: &str, layer: i32) -> Option<Vec<Block>> {
    if !contains_block(blocks, id) {
        return None;
    }
    Some(blocks.iter().map(|b| if b.id == id { b.clone().with_layer(layer) } else { b.clone() }).collect())
}

/// Puts the block above every other block.
/// Unchanged when it already is the only block on the highest layer.
pub fn bring_to_front(blocks: &[Block], id: &str) -> Option<Vec<Block>> {
    let block = find_block(blocks, id)?;
    let others_top = blocks.iter().filter(|b| b.id != id).map(|b| b.layer).max();
    match others_top {
        Some(top) if top >= block.layer => set_layer(blocks, id, top + 1),
        _ => Some(blocks.to_vec()),
    }
}

/// Puts the block below every other block.
/// Unchanged when it already is the only block on the lowest layer.
pub fn send_to_back(blocks: &[Block], id: &str) -> Option<Vec<Block>> {
    let block = find_block(blocks, id)?;
    let others_bottom = blocks.iter().filter(|b| b.id != id).map(|b| b.layer).min();
    match others_bottom {
        Some(bottom) if bottom <= block.layer => set_layer(blocks, id, bottom - 1),
        _ => Some(blocks.to_vec()),
    }
}

/// Blocks in paint order: ascending by layer, ties broken by list order.
pub fn paint_order(blocks: &[Block]) -> Vec<&Block> {
    let mut ordered: Vec<&Block> = blocks.iter().collect();
    // stable sort keeps list order for equal layers
    ordered.sort_by_key(|b| b.layer);
    ordered
}

/// Blocks covering a cell, topmost first.
pub fn blocks_at(blocks: &[Block], x: i32, y: i32) -> Vec<&Block> {
    let mut hits: Vec<&Block> = paint_order(blocks).into_iter().filter(|b| b.contains_cell(x, y)).collect();
    hits.reverse();
    hits
}

/// Blocks whose right edge extends past the last column.
pub fn horizontal_overflow(blocks: &[Block], columns: i32) -> Vec<&Block> {
    blocks.iter().filter(|b| b.right() > columns).collect()
}
