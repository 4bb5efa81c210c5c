//! Gridwalk stages -- terrain, occupancy and trigger lookups for one map.
//!
//! A [`Stage`](stage::Stage) combines a tile grid and its property table with
//! the entities, scripted actions and warp points placed on it. It answers
//! the per-tick questions of a grid game:
//!
//! - *Can this entity step that way?* -- [`Stage::check_step`](stage::Stage::check_step)
//! - *Who is standing here?* -- [`Stage::object_at`](stage::Stage::object_at)
//! - *Does landing here warp or trigger something?* -- [`Stage::trigger_at`](stage::Stage::trigger_at)
//! - *What does the entity face?* -- [`Stage::interact`](stage::Stage::interact)
//!
//! All queries are total. Only loading can fail.
//!
//! # Example
//!
//! ```
//! use gridwalk_stage::prelude::*;
//!
//! let grid = TileGrid::new(2, 1, vec![5, 5]).unwrap();
//! let mut properties = PropertyTable::new();
//! properties.insert(5, TileProperty::BLOCKED);
//! let stage = Stage::new(grid, properties, vec![], vec![], vec![]);
//!
//! assert!(stage.tile_property(Point::new(0, 0)).is_blocked());
//! assert!(stage.tile_property(Point::new(16, 0)).is_blocked());
//! assert!(stage.tile_property(Point::new(32, 0)).is_blocked()); // off the map
//! ```

#![deny(unsafe_code)]

pub mod interaction;
pub mod loader;
pub mod markers;
pub mod movement;
pub mod stage;
pub mod tiles;

use std::path::PathBuf;

use gridwalk_object::SpriteError;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while building or loading a stage.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// A stage file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stage file is not valid JSON of the expected shape.
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The tile map lists no layers.
    #[error("tile map {} has no layers", .path.display())]
    MissingLayer { path: PathBuf },

    /// A stage dimension is zero or negative.
    #[error("invalid stage dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    /// A tileset entry's global id does not fit in an `i32`.
    #[error("tile {local_id} of {} overflows the id space at firstgid {first_gid}", .path.display())]
    TileIdOverflow {
        path: PathBuf,
        first_gid: i32,
        local_id: i32,
    },

    /// A `block` or `action` property does not hold an integer.
    #[error("tile {local_id} of {}: property `{name}` is not an integer: {value}", .path.display())]
    InvalidProperty {
        path: PathBuf,
        local_id: i32,
        name: String,
        value: serde_json::Value,
    },

    /// The tile layer does not cover the stage exactly.
    #[error("tile layer holds {actual} ids but a {width}x{height} stage needs {expected}")]
    TileCountMismatch {
        width: i32,
        height: i32,
        expected: usize,
        actual: usize,
    },

    /// An object's sprite set could not be resolved.
    #[error("failed to load sprites for object {object_id}: {source}")]
    Sprite {
        object_id: i32,
        #[source]
        source: SpriteError,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use gridwalk_object::prelude::*;

    pub use crate::interaction::Interaction;
    pub use crate::loader::StageFiles;
    pub use crate::markers::{Action, ActionList, Warp, WarpList};
    pub use crate::movement::{BlockReason, StepCheck, Trigger};
    pub use crate::stage::{hitbox_covers, ObjectIndex, Stage};
    pub use crate::tiles::{PropertyTable, TileGrid, TileProperty, TilesetProperties};
    pub use crate::StageError;
}
