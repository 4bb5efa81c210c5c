//! Movable grid actors.
//!
//! An [`Entity`] is anything that occupies a tile and can face a direction:
//! the player, NPCs, trainers. Its position is kept in pixels so that a step
//! between two tiles can be animated one pixel per tick. An entity whose
//! position is not a multiple of [`TILE_SIZE`] on both axes is *in motion*.
//!
//! Entities are usually created from an [`ObjectRecord`] read from a stage's
//! object list, then given their sprite frames through a
//! [`SpriteSource`](crate::sprite::SpriteSource).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::geometry::{Point, Tile, TILE_SIZE};
use crate::sprite::{frame_slot, FrameHandle, SpriteFrames, SpriteKey, SpriteSource};
use crate::SpriteError;

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// What role an entity plays on the stage.
///
/// Only [`EntityKind::Player`] changes movement rules: players are not held
/// to a territory. Every other kind is descriptive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityKind {
    Player,
    #[default]
    Npc,
    Trainer,
    /// Any kind name not listed above, kept verbatim.
    Other(String),
}

impl EntityKind {
    pub fn as_str(&self) -> &str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Npc => "npc",
            EntityKind::Trainer => "trainer",
            EntityKind::Other(name) => name,
        }
    }
}

impl From<String> for EntityKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "player" => EntityKind::Player,
            "npc" => EntityKind::Npc,
            "trainer" => EntityKind::Trainer,
            _ => EntityKind::Other(name),
        }
    }
}

impl From<EntityKind> for String {
    fn from(kind: EntityKind) -> Self {
        kind.as_str().to_owned()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// On-disk records
// ---------------------------------------------------------------------------

/// One entry of a stage's object list, as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub id: i32,
    /// Starting tile.
    pub start: [i32; 2],
    /// Tiles the entity may step into.
    #[serde(default)]
    pub territory: Vec<[i32; 2]>,
    /// Initial facing; empty or unrecognised leaves the entity undirected.
    #[serde(default)]
    pub direction: String,
    #[serde(default, rename = "type")]
    pub kind: EntityKind,
    /// Lines spoken when talked to.
    #[serde(default)]
    pub text: Vec<String>,
}

/// Top-level shape of an object list file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjectList {
    pub objects: Vec<ObjectRecord>,
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A movable actor on a tile grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: i32,
    position: Point,
    direction: Option<Direction>,
    territory: Vec<Tile>,
    kind: EntityKind,
    dialogue: Vec<String>,
    frames: SpriteFrames,
}

impl Entity {
    /// Create an undirected entity standing on `start`, with no territory,
    /// no dialogue and no sprite frames.
    pub fn new(id: i32, start: Tile) -> Self {
        Self {
            id,
            position: start.origin(),
            direction: None,
            territory: Vec::new(),
            kind: EntityKind::default(),
            dialogue: Vec::new(),
            frames: SpriteFrames::default(),
        }
    }

    /// Build an entity from an object-list record. Sprite frames are left
    /// empty; see [`attach_sprites`](Self::attach_sprites).
    pub fn from_record(record: ObjectRecord) -> Self {
        let direction = match record.direction.as_str() {
            "" => None,
            name => match name.parse::<Direction>() {
                Ok(d) => Some(d),
                Err(e) => {
                    tracing::warn!(object_id = record.id, error = %e, "ignoring initial direction");
                    None
                }
            },
        };

        Self {
            id: record.id,
            position: Tile::from(record.start).origin(),
            direction,
            territory: record.territory.into_iter().map(Tile::from).collect(),
            kind: record.kind,
            dialogue: record.text,
            frames: SpriteFrames::default(),
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn with_territory(mut self, territory: impl IntoIterator<Item = Tile>) -> Self {
        self.territory = territory.into_iter().collect();
        self
    }

    pub fn with_kind(mut self, kind: EntityKind) -> Self {
        self.kind = kind;
        self
    }

    /// Resolve and store this entity's sprite frames. Entities with a
    /// negative id have no sprite set and are left untouched.
    pub fn attach_sprites(&mut self, source: &mut dyn SpriteSource) -> Result<(), SpriteError> {
        if let Some(key) = self.sprite_key() {
            self.frames = source.resolve(key)?;
        }
        Ok(())
    }

    // -- accessors ----------------------------------------------------------

    pub fn id(&self) -> i32 {
        self.id
    }

    /// Current pixel position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Current facing. `None` until a direction has been set.
    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn territory(&self) -> &[Tile] {
        &self.territory
    }

    pub fn kind(&self) -> &EntityKind {
        &self.kind
    }

    pub fn dialogue(&self) -> &[String] {
        &self.dialogue
    }

    pub fn frames(&self) -> &SpriteFrames {
        &self.frames
    }

    /// Sprite set this entity draws from.
    pub fn sprite_key(&self) -> Option<SpriteKey> {
        SpriteKey::for_object(self.id)
    }

    // -- facing -------------------------------------------------------------

    /// Move to `(x, y)`. A negative value leaves that axis unchanged.
    pub fn set_position(&mut self, x: i32, y: i32) {
        if x >= 0 {
            self.position.x = x;
        }
        if y >= 0 {
            self.position.y = y;
        }
    }

    /// Put the entity back at an exact position and facing, e.g. from a saved
    /// state. Unlike [`set_position`](Self::set_position) negative
    /// coordinates are taken as given.
    pub fn restore(&mut self, position: Point, direction: Option<Direction>) {
        self.position = position;
        self.direction = direction;
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = Some(direction);
    }

    /// Face the direction called `name` (any ASCII case). Other names are
    /// ignored.
    pub fn set_direction_named(&mut self, name: &str) {
        if let Ok(direction) = name.parse() {
            self.direction = Some(direction);
        }
    }

    /// Turn to face `target`. Vertical offsets win over horizontal ones; if
    /// `target` is the entity's own tile origin the facing is kept.
    pub fn face_towards(&mut self, target: Tile) {
        let target = target.origin();
        let here = self.position;
        let facing = if target.y > here.y {
            Direction::Down
        } else if target.y < here.y {
            Direction::Up
        } else if target.x > here.x {
            Direction::Right
        } else if target.x < here.x {
            Direction::Left
        } else {
            return;
        };
        self.direction = Some(facing);
    }

    // -- movement -----------------------------------------------------------

    /// The point one tile away in `direction`.
    pub fn ahead_toward(&self, direction: Direction) -> Point {
        let (dx, dy) = direction.delta();
        self.position.offset(dx * TILE_SIZE, dy * TILE_SIZE)
    }

    /// The point one tile away in `direction`, or in the current facing when
    /// `direction` is `None`. `None` if neither is known.
    pub fn ahead(&self, direction: Option<Direction>) -> Option<Point> {
        direction
            .or(self.direction)
            .map(|d| self.ahead_toward(d))
    }

    /// Move one pixel in the current facing. Undirected entities stay put.
    pub fn step_forward(&mut self) {
        if let Some(direction) = self.direction {
            let (dx, dy) = direction.delta();
            self.position = self.position.offset(dx, dy);
        }
    }

    /// Face `direction` and move one pixel.
    pub fn step(&mut self, direction: Direction) {
        self.direction = Some(direction);
        self.step_forward();
    }

    /// Whether the entity is between two tiles.
    pub fn is_in_motion(&self) -> bool {
        !self.position.is_aligned()
    }

    /// Whether the tile one step away in `direction` is inside this entity's
    /// territory. Terrain and other entities are not considered.
    pub fn is_legal_direction(&self, direction: Direction) -> bool {
        let target = self.ahead_toward(direction);
        self.territory.iter().any(|tile| tile.has_origin(target))
    }

    // -- drawing ------------------------------------------------------------

    /// Walk-cycle slot for the current facing and position.
    pub fn current_frame_slot(&self) -> usize {
        frame_slot(self.direction, self.position)
    }

    /// Handle of the frame to draw now.
    pub fn current_frame(&self) -> Option<FrameHandle> {
        self.frames.get(self.current_frame_slot())
    }
}
