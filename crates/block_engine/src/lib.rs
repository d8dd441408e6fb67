mod error;
pub use error::*;

mod attributes;
pub use attributes::{Attributes, CONTENT_KEY};

mod block;
pub use block::*;

pub mod grid;
pub use grid::{Alignment, GridMetrics, GridSettings, PixelRect};

pub mod layout;

mod snapshot;
pub use snapshot::*;
