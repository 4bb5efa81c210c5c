//! The stage index: terrain, entities, actions and warps of one map.
//!
//! [`Stage`] answers every "what is at this pixel" question the movement and
//! interaction code asks. All lookups are total: positions off the map or
//! with nothing on them yield a default or `None`, never an error.

use std::fmt;

use gridwalk_object::direction::Direction;
use gridwalk_object::entity::Entity;
use gridwalk_object::geometry::{Point, TILE_SIZE};
use serde::{Deserialize, Serialize};

use crate::markers::{Action, Warp};
use crate::tiles::{PropertyTable, TileGrid, TileProperty};

// ---------------------------------------------------------------------------
// ObjectIndex
// ---------------------------------------------------------------------------

/// Position of an entity in its stage's object list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectIndex(pub usize);

impl fmt::Display for ObjectIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Hitboxes
// ---------------------------------------------------------------------------

/// Whether `entity` occupies `point`.
///
/// An entity between two tiles counts as standing on the tile it is
/// walking into. Each facing has its own test. With the entity at
/// `(ox, oy)` and the query at `(x, y)`, all divisions truncating:
///
/// - up: `ox/16 == (x+15)/16` and `(oy+16)/16 - 1 == y/16`
/// - down: `ox/16 == (x+15)/16` and `(oy+15)/16 == y/16`
/// - right: `(ox+15)/16 == x/16` and `oy/16 == (y+15)/16`
/// - left: `(ox+16)/16 - 1 == x/16` and `oy/16 == (y+15)/16`
///
/// The sums are taken in `i64`, so every `i32` coordinate is a valid query.
/// An undirected entity occupies nothing.
pub fn hitbox_covers(entity: &Entity, point: Point) -> bool {
    const T: i64 = TILE_SIZE as i64;
    let Point { x: ox, y: oy } = entity.position();
    let (ox, oy) = (i64::from(ox), i64::from(oy));
    let (x, y) = (i64::from(point.x), i64::from(point.y));

    match entity.direction() {
        Some(Direction::Up) => ox / T == (x + T - 1) / T && (oy + T) / T - 1 == y / T,
        Some(Direction::Down) => ox / T == (x + T - 1) / T && (oy + T - 1) / T == y / T,
        Some(Direction::Right) => (ox + T - 1) / T == x / T && oy / T == (y + T - 1) / T,
        Some(Direction::Left) => (ox + T) / T - 1 == x / T && oy / T == (y + T - 1) / T,
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// One loaded map and everything standing on it.
///
/// The grid, property table, actions and warps are fixed once the stage is
/// built. Entities are owned by the stage and mutated only through it.
#[derive(Debug, Clone)]
pub struct Stage {
    grid: TileGrid,
    properties: PropertyTable,
    actions: Vec<Action>,
    warps: Vec<Warp>,
    objects: Vec<Entity>,
}

impl Stage {
    /// Assemble a stage from already-built parts.
    pub fn new(
        grid: TileGrid,
        properties: PropertyTable,
        actions: Vec<Action>,
        warps: Vec<Warp>,
        objects: Vec<Entity>,
    ) -> Self {
        Self {
            grid,
            properties,
            actions,
            warps,
            objects,
        }
    }

    // -- accessors ----------------------------------------------------------

    /// Width in tiles.
    pub fn width(&self) -> i32 {
        self.grid.width()
    }

    /// Height in tiles.
    pub fn height(&self) -> i32 {
        self.grid.height()
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn properties(&self) -> &PropertyTable {
        &self.properties
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn warps(&self) -> &[Warp] {
        &self.warps
    }

    pub fn objects(&self) -> &[Entity] {
        &self.objects
    }

    pub fn object(&self, index: ObjectIndex) -> Option<&Entity> {
        self.objects.get(index.0)
    }

    /// Mutable access to one entity.
    ///
    /// Prefer [`begin_step`](Self::begin_step) and [`advance`](Self::advance)
    /// for movement; direct mutation bypasses collision checks.
    pub fn object_mut(&mut self, index: ObjectIndex) -> Option<&mut Entity> {
        self.objects.get_mut(index.0)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Indices of all entities, in stage order.
    pub fn indices(&self) -> impl Iterator<Item = ObjectIndex> {
        (0..self.objects.len()).map(ObjectIndex)
    }

    /// First entity with the given id.
    pub fn find_by_id(&self, id: i32) -> Option<ObjectIndex> {
        self.objects.iter().position(|e| e.id() == id).map(ObjectIndex)
    }

    /// Add an entity (typically the player) and return its index.
    pub fn spawn(&mut self, entity: Entity) -> ObjectIndex {
        self.objects.push(entity);
        ObjectIndex(self.objects.len() - 1)
    }

    // -- queries ------------------------------------------------------------

    /// Terrain property at `point`.
    ///
    /// Off the map this is [`TileProperty::BLOCKED`], except exactly on a
    /// warp origin where it is [`TileProperty::OPEN`] so the traveller can
    /// step onto the warp. On the map, tiles without a registered property
    /// are open.
    pub fn tile_property(&self, point: Point) -> TileProperty {
        if point.x >= 0 && point.y >= 0 {
            if let Some(tile_id) = self.grid.tile_id(point.tile()) {
                return self.properties.get(tile_id).unwrap_or(TileProperty::OPEN);
            }
        }
        if self.warp_at(point).is_some() {
            TileProperty::OPEN
        } else {
            TileProperty::BLOCKED
        }
    }

    /// The first entity whose hitbox covers `point`. See [`hitbox_covers`].
    pub fn object_at(&self, point: Point) -> Option<ObjectIndex> {
        self.objects
            .iter()
            .position(|e| hitbox_covers(e, point))
            .map(ObjectIndex)
    }

    /// Like [`object_at`](Self::object_at) but never returns `except`.
    pub fn occupant_other_than(&self, point: Point, except: ObjectIndex) -> Option<ObjectIndex> {
        self.objects
            .iter()
            .enumerate()
            .find(|&(i, e)| i != except.0 && hitbox_covers(e, point))
            .map(|(i, _)| ObjectIndex(i))
    }

    /// The first action on the tile containing `point`.
    pub fn action_at(&self, point: Point) -> Option<&Action> {
        self.actions.iter().find(|a| a.covers(point))
    }

    /// The first warp whose origin is exactly `point`.
    pub fn warp_at(&self, point: Point) -> Option<&Warp> {
        self.warps.iter().find(|w| w.is_at(point))
    }
}
