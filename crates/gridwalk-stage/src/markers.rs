//! Scripted actions and warp points placed on a stage.
//!
//! Both are keyed by tile coordinates and looked up by pixel coordinate:
//! actions match any pixel inside their tile, warps only the tile's exact
//! origin pixel.

use gridwalk_object::geometry::{Point, Tile};
use serde::{Deserialize, Serialize};

/// A scripted action bound to a tile. What the id means is up to the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub x: i32,
    pub y: i32,
    #[serde(alias = "id")]
    pub action: i32,
}

impl Action {
    pub fn tile(&self) -> Tile {
        Tile::new(self.x, self.y)
    }

    /// Whether `point` lies in this action's tile.
    pub fn covers(&self, point: Point) -> bool {
        point.tile() == self.tile()
    }
}

/// A teleport to another stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Warp {
    pub x: i32,
    pub y: i32,
    /// Name of the stage to load.
    pub destination: String,
    /// Tile to place the traveller on in the destination stage, if fixed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival: Option<[i32; 2]>,
}

impl Warp {
    pub fn tile(&self) -> Tile {
        Tile::new(self.x, self.y)
    }

    /// Whether `point` is exactly this warp's tile origin.
    pub fn is_at(&self, point: Point) -> bool {
        self.tile().has_origin(point)
    }

    pub fn arrival_tile(&self) -> Option<Tile> {
        self.arrival.map(Tile::from)
    }
}

/// Top-level shape of an action list file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionList {
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// Top-level shape of a warp list file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WarpList {
    #[serde(default)]
    pub warps: Vec<Warp>,
}
