//! Gridwalk engine -- deterministic tick loop over a single stage.
//!
//! This crate builds on [`gridwalk_stage`] to drive a stage forward one pixel
//! step at a time: the controlled player follows an [`InputFrame`], every
//! other entity with a territory wanders using a seeded
//! [`DirectionPicker`](gridwalk_object::wander::DirectionPicker), and each tick
//! reports what happened as a list of [`StageEvent`]s.
//!
//! # Quick Start
//!
//! ```
//! use gridwalk_engine::prelude::*;
//!
//! let grid = TileGrid::new(4, 4, vec![0; 16]).unwrap();
//! let player = Entity::new(900, Tile::new(1, 1)).with_kind(EntityKind::Player);
//! let stage = Stage::new(grid, PropertyTable::new(), vec![], vec![], vec![player]);
//!
//! let mut stage_loop = StageLoop::new(stage, TickConfig::default());
//! stage_loop.set_input(InputFrame::walk(Direction::Right));
//! stage_loop.run_ticks(16);
//!
//! let player = stage_loop.player().unwrap();
//! assert_eq!(stage_loop.stage().object(player).unwrap().position(), Point::new(32, 16));
//! ```
//!
//! [`InputFrame`]: tick::InputFrame
//! [`StageEvent`]: tick::StageEvent

#![deny(unsafe_code)]

pub mod replay;
pub mod snapshot;
pub mod tick;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use gridwalk_object;
pub use gridwalk_stage;

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use gridwalk_stage::prelude::*;

    pub use crate::replay::{
        replay, ReplayDivergence, ReplayEntry, ReplayLog, ReplayRecorder, ReplayResult,
    };
    pub use crate::snapshot::{ObjectState, SnapshotError, StageSnapshot};
    pub use crate::tick::{InputFrame, StageEvent, StageLoop, TickConfig};
}
