mod history;
pub use history::*;

mod published;
pub use published::PublishedQueue;

pub mod surface;
pub use surface::{GestureKind, GestureState, SurfaceController};

mod composite;
pub use composite::{CompositeEditor, CompositeEntry, EditorSessionState};

mod storage;
pub use storage::{FileStorage, MemoryStorage, SnapshotStorage};

// Re-export the model so front ends only need this crate
pub use block_engine::{
    Alignment, Attributes, Block, BlockGeometry, BlockKind, BlockTemplate, CONTENT_KEY, EngineError, GridMetrics, GridSettings, PixelRect, Result, ShapeKind,
    SurfaceKind, SurfaceSnapshot, grid, layout,
};
