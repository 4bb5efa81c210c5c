//! Gridwalk objects -- entities that stand on and walk across a tile grid.
//!
//! This crate holds the per-entity half of the gridwalk movement model.
//! Entities keep their position in pixels, one tile being
//! [`TILE_SIZE`](geometry::TILE_SIZE) pixels wide, and walk between tiles one
//! pixel per tick. Everything here is independent of any particular stage:
//! terrain, occupancy and triggers live in `gridwalk-stage`.
//!
//! # Quick Start
//!
//! ```
//! use gridwalk_object::prelude::*;
//!
//! let mut npc = Entity::new(20, Tile::new(1, 1))
//!     .with_territory([Tile::new(1, 1), Tile::new(2, 1)]);
//!
//! assert!(npc.is_legal_direction(Direction::Right));
//! assert!(!npc.is_legal_direction(Direction::Down));
//!
//! npc.set_direction(Direction::Right);
//! for _ in 0..TILE_SIZE {
//!     npc.step_forward();
//! }
//! assert_eq!(npc.position(), Tile::new(2, 1).origin());
//! assert!(!npc.is_in_motion());
//! ```

#![deny(unsafe_code)]

pub mod direction;
pub mod entity;
pub mod geometry;
pub mod sprite;
pub mod wander;

use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while resolving sprite sets.
#[derive(Debug, thiserror::Error)]
pub enum SpriteError {
    /// No directory exists for the requested sprite set.
    #[error("sprite directory {} does not exist", .path.display())]
    MissingDirectory {
        /// Directory that was looked up.
        path: PathBuf,
    },

    /// The sprite directory exists but could not be listed.
    #[error("failed to read sprite directory {}: {source}", .path.display())]
    Io {
        /// Directory that failed to read.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sprite directory holds more files than a sprite set has slots.
    #[error("sprite directory {} holds {count} frames, at most {max} allowed", .path.display(), max = sprite::FRAME_COUNT)]
    TooManyFrames {
        /// Directory holding the frames.
        path: PathBuf,
        /// Number of files found.
        count: usize,
    },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::direction::{Direction, UnknownDirection};
    pub use crate::entity::{Entity, EntityKind, ObjectList, ObjectRecord};
    pub use crate::geometry::{Point, Tile, TILE_SIZE};
    pub use crate::sprite::{
        frame_slot, AssetGroup, DirectorySprites, FrameHandle, PlaceholderSprites, SpriteFrames,
        SpriteKey, SpriteSource, FRAME_COUNT,
    };
    pub use crate::wander::DirectionPicker;
    pub use crate::SpriteError;
}
