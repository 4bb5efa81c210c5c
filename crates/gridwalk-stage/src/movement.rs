//! Step legality and step animation.
//!
//! A step is started with [`Stage::begin_step`] and then driven one pixel per
//! tick with [`Stage::advance`] until the entity lands on the next tile.
//! Whether a step may start is decided by [`Stage::check_step`], which looks
//! at, in order:
//!
//! 1. terrain: the target tile's [`TileProperty`](crate::tiles::TileProperty),
//! 2. occupancy: any other entity whose hitbox covers the target,
//! 3. territory: for every entity that is not a player, the patrol region.
//!
//! Once an entity lands, [`Stage::trigger_at`] tells the caller whether a
//! warp or an action sits on the landing point.

use gridwalk_object::direction::Direction;
use gridwalk_object::entity::EntityKind;
use gridwalk_object::geometry::Point;
use serde::{Deserialize, Serialize};

use crate::markers::{Action, Warp};
use crate::stage::{ObjectIndex, Stage};

/// Why a step cannot start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockReason {
    /// No entity has this index.
    NoSuchObject,
    /// The entity is still finishing a previous step.
    InMotion,
    /// The target tile is blocked or off the map.
    Terrain,
    /// Another entity occupies the target tile.
    Occupied(ObjectIndex),
    /// The target tile is outside the entity's territory.
    Territory,
}

/// Outcome of a step check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepCheck {
    Clear,
    Blocked(BlockReason),
}

impl StepCheck {
    pub fn is_clear(self) -> bool {
        matches!(self, StepCheck::Clear)
    }
}

/// Something that fires when an entity lands on a point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    Warp(Warp),
    Action(Action),
}

impl Stage {
    /// Decide whether the entity at `index` may step toward `direction`.
    /// Nothing is mutated.
    pub fn check_step(&self, index: ObjectIndex, direction: Direction) -> StepCheck {
        let Some(entity) = self.object(index) else {
            return StepCheck::Blocked(BlockReason::NoSuchObject);
        };
        if entity.is_in_motion() {
            return StepCheck::Blocked(BlockReason::InMotion);
        }

        let target = entity.ahead_toward(direction);
        if self.tile_property(target).is_blocked() {
            return StepCheck::Blocked(BlockReason::Terrain);
        }
        if let Some(other) = self.occupant_other_than(target, index) {
            return StepCheck::Blocked(BlockReason::Occupied(other));
        }
        if *entity.kind() != EntityKind::Player && !entity.is_legal_direction(direction) {
            return StepCheck::Blocked(BlockReason::Territory);
        }
        StepCheck::Clear
    }

    /// Turn the entity at `index` toward `direction` and, if the step is
    /// clear, take its first pixel.
    ///
    /// An entity already in motion neither turns nor moves.
    pub fn begin_step(&mut self, index: ObjectIndex, direction: Direction) -> StepCheck {
        let check = self.check_step(index, direction);
        if check == StepCheck::Blocked(BlockReason::InMotion)
            || check == StepCheck::Blocked(BlockReason::NoSuchObject)
        {
            return check;
        }

        if let Some(entity) = self.object_mut(index) {
            entity.set_direction(direction);
            if check.is_clear() {
                entity.step_forward();
            }
            tracing::trace!(
                object = %index,
                direction = %direction,
                position = %entity.position(),
                ?check,
                "begin step"
            );
        }
        check
    }

    /// Move an in-motion entity one pixel further.
    ///
    /// Returns the landing point on the tick the entity becomes aligned
    /// again, `None` otherwise (including for entities standing still).
    pub fn advance(&mut self, index: ObjectIndex) -> Option<Point> {
        let entity = self.object_mut(index)?;
        if !entity.is_in_motion() {
            return None;
        }
        entity.step_forward();
        (!entity.is_in_motion()).then(|| entity.position())
    }

    /// The trigger at `point`: a warp at exactly this pixel, or else an
    /// action on this tile.
    pub fn trigger_at(&self, point: Point) -> Option<Trigger> {
        if let Some(warp) = self.warp_at(point) {
            return Some(Trigger::Warp(warp.clone()));
        }
        self.action_at(point).cloned().map(Trigger::Action)
    }
}
