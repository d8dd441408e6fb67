#![allow(clippy::missing_errors_doc)]
use std::time::{Duration, Instant};

use block_engine::{Attributes, BlockGeometry, BlockTemplate, EngineError, GridSettings, Result, layout};

use super::SurfaceController;

impl SurfaceController {
    /// Adds a block on top of all existing blocks and returns its id.
    pub fn add_block(&mut self, template: &BlockTemplate) -> Result<String> {
        let blocks = &self.live.blocks;
        let id = layout::generate_id(blocks, self.kind.id_prefix(), template.kind, &mut self.id_counter);
        let block = template.build(id.clone(), layout::next_layer(blocks), &self.live.grid_settings);
        let mut next = blocks.clone();
        next.push(block);
        let next = layout::clamp_all(&next, self.live.rows());
        log::debug!("{}: add {id}", self.kind);
        self.apply(self.live.with_blocks(next));
        Ok(id)
    }

    pub fn update_block(&mut self, id: &str, partial: &Attributes) -> Result<bool> {
        let next = layout::update_attributes(&self.live.blocks, id, partial).ok_or_else(|| EngineError::block_not_found(id))?;
        Ok(self.apply(self.live.with_blocks(next)))
    }

    /// Attribute change from a continuous control (slider, color picker drag).
    /// The live snapshot follows every call, history only sees the value that is
    /// still current once `stream` has been quiet for `delay`.
    pub fn update_block_debounced(&mut self, stream: &str, id: &str, partial: &Attributes, delay: Duration, now: Instant) -> Result<()> {
        let next = layout::update_attributes(&self.live.blocks, id, partial).ok_or_else(|| EngineError::block_not_found(id))?;
        let next = self.live.with_blocks(next);
        self.apply_debounced(stream, next, delay, now);
        Ok(())
    }

    pub fn move_block(&mut self, id: &str, x: i32, y: i32) -> Result<bool> {
        let block = self.live.find_block(id).ok_or_else(|| EngineError::block_not_found(id))?;
        let geometry = BlockGeometry::new(id, x, y, block.w, block.h);
        self.set_block_geometry(&geometry)
    }

    pub fn resize_block(&mut self, id: &str, w: i32, h: i32) -> Result<bool> {
        let block = self.live.find_block(id).ok_or_else(|| EngineError::block_not_found(id))?;
        let geometry = BlockGeometry::new(id, block.x, block.y, w.max(1), h.max(1));
        self.set_block_geometry(&geometry)
    }

    fn set_block_geometry(&mut self, geometry: &BlockGeometry) -> Result<bool> {
        let next = layout::set_geometry(&self.live.blocks, geometry, self.live.rows()).ok_or_else(|| EngineError::block_not_found(&geometry.id))?;
        Ok(self.apply(self.live.with_blocks(next)))
    }

    pub fn delete_block(&mut self, id: &str) -> Result<()> {
        let next = layout::remove_block(&self.live.blocks, id).ok_or_else(|| EngineError::block_not_found(id))?;
        log::debug!("{}: delete {id}", self.kind);
        self.apply(self.live.with_blocks(next));
        Ok(())
    }

    /// Copies the block one cell down and right, on top of everything. Returns the new id.
    pub fn duplicate_block(&mut self, id: &str) -> Result<String> {
        let Some(source) = self.live.find_block(id) else {
            return Err(EngineError::block_not_found(id));
        };
        let new_id = layout::generate_id(&self.live.blocks, self.kind.id_prefix(), source.kind, &mut self.id_counter);
        let next = layout::duplicate_block(&self.live.blocks, id, &new_id, self.live.rows()).ok_or_else(|| EngineError::block_not_found(id))?;
        log::debug!("{}: duplicate {id} as {new_id}", self.kind);
        self.apply(self.live.with_blocks(next));
        Ok(new_id)
    }

    pub fn bring_to_front(&mut self, id: &str) -> Result<bool> {
        let next = layout::bring_to_front(&self.live.blocks, id).ok_or_else(|| EngineError::block_not_found(id))?;
        Ok(self.apply(self.live.with_blocks(next)))
    }

    pub fn send_to_back(&mut self, id: &str) -> Result<bool> {
        let next = layout::send_to_back(&self.live.blocks, id).ok_or_else(|| EngineError::block_not_found(id))?;
        Ok(self.apply(self.live.with_blocks(next)))
    }

    /// Replaces the grid settings. Blocks are clamped against the new row count.
    pub fn set_grid_settings(&mut self, settings: GridSettings) -> bool {
        let blocks = layout::clamp_all(&self.live.blocks, settings.rows);
        let next = self.live.with_grid_settings(settings).with_blocks(blocks);
        self.apply(next)
    }

    pub fn update_style(&mut self, partial: &Attributes) -> bool {
        let style = self.live.style.merged(partial);
        self.apply(self.live.with_style(style))
    }

    pub fn update_style_debounced(&mut self, stream: &str, partial: &Attributes, delay: Duration, now: Instant) {
        let style = self.live.style.merged(partial);
        let next = self.live.with_style(style);
        self.apply_debounced(stream, next, delay, now);
    }
}
