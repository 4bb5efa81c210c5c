//! Fixed-step tick loop for one stage.
//!
//! The [`StageLoop`] drives a [`Stage`] forward. Each tick:
//!
//! 1. The controlled player is resolved first. An entity between tiles moves
//!    one more pixel; on landing, any warp or action under it fires. An
//!    aligned player acts on the current [`InputFrame`]: interaction first,
//!    otherwise a step toward the requested direction.
//! 2. Every other entity is resolved in stage order. Moving entities
//!    continue their step. Idle entities with a territory roll
//!    [`TickConfig::wander_chance`] and, on success, try a random direction.
//! 3. The tick counter advances.
//!
//! All randomness comes from one seeded
//! [`DirectionPicker`], so the same stage, seed and inputs always produce
//! the same events.

use gridwalk_object::direction::Direction;
use gridwalk_object::entity::EntityKind;
use gridwalk_object::geometry::Tile;
use gridwalk_object::wander::DirectionPicker;
use gridwalk_stage::interaction::Interaction;
use gridwalk_stage::markers::{Action, Warp};
use gridwalk_stage::movement::{BlockReason, StepCheck, Trigger};
use gridwalk_stage::stage::{ObjectIndex, Stage};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TickConfig
// ---------------------------------------------------------------------------

/// Configuration for the stage loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickConfig {
    /// Seed of the wandering RNG.
    pub seed: u64,
    /// Percent chance per idle tick that a patrolling entity tries to move.
    pub wander_chance: f64,
}

impl Default for TickConfig {
    /// Seed 0, 10% wander chance.
    fn default() -> Self {
        Self {
            seed: 0,
            wander_chance: 10.0,
        }
    }
}

// ---------------------------------------------------------------------------
// InputFrame
// ---------------------------------------------------------------------------

/// The player's input for one tick. Stays in effect until replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputFrame {
    /// Direction held, if any.
    pub movement: Option<Direction>,
    /// Whether the interact button is pressed.
    pub interact: bool,
}

impl InputFrame {
    /// Hold `direction`.
    pub fn walk(direction: Direction) -> Self {
        Self {
            movement: Some(direction),
            interact: false,
        }
    }

    /// Press interact.
    pub fn interact() -> Self {
        Self {
            movement: None,
            interact: true,
        }
    }

    /// No buttons held.
    pub fn is_empty(&self) -> bool {
        self.movement.is_none() && !self.interact
    }
}

// ---------------------------------------------------------------------------
// StageEvent
// ---------------------------------------------------------------------------

/// Something observable that happened during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageEvent {
    /// An entity took the first pixel of a step.
    StepStarted {
        object: ObjectIndex,
        direction: Direction,
    },
    /// The player tried to step but could not. It now faces `direction`.
    Bumped {
        object: ObjectIndex,
        direction: Direction,
        reason: BlockReason,
    },
    /// An entity finished a step and is aligned on `tile`.
    Arrived { object: ObjectIndex, tile: Tile },
    /// The player landed on a warp.
    Warped { object: ObjectIndex, warp: Warp },
    /// The player landed on a scripted action.
    ActionTriggered { object: ObjectIndex, action: Action },
    /// The player spoke to another entity, which turned to face them.
    Talked {
        speaker: ObjectIndex,
        listener: ObjectIndex,
    },
    /// The player interacted with a tile carrying an action id.
    TileAction {
        object: ObjectIndex,
        tile: Tile,
        action: i32,
    },
}

// ---------------------------------------------------------------------------
// StageLoop
// ---------------------------------------------------------------------------

/// The deterministic tick loop over one stage.
///
/// # Determinism Guarantee
///
/// Given the same stage, the same [`TickConfig`] and the same sequence of
/// input frames, the loop produces identical positions, facings and events
/// across runs. This holds because:
///
/// - Entities are resolved in a fixed order (player, then stage order).
/// - The wandering RNG is seeded once and never reseeded.
/// - All coordinates are integers.
#[derive(Debug, Clone)]
pub struct StageLoop {
    stage: Stage,
    picker: DirectionPicker,
    config: TickConfig,
    /// The entity driven by input; `None` when the stage has no player.
    player: Option<ObjectIndex>,
    tick_counter: u64,
    current_input: InputFrame,
}

impl StageLoop {
    /// Create a loop over `stage`. The first entity of kind
    /// [`EntityKind::Player`] becomes the controlled player.
    pub fn new(stage: Stage, config: TickConfig) -> Self {
        let player = stage
            .indices()
            .find(|&i| stage.object(i).is_some_and(|e| *e.kind() == EntityKind::Player));
        tracing::debug!(
            objects = stage.object_count(),
            player = ?player,
            seed = config.seed,
            "stage loop created"
        );
        Self {
            picker: DirectionPicker::new(config.seed),
            stage,
            config,
            player,
            tick_counter: 0,
            current_input: InputFrame::default(),
        }
    }

    /// Execute one tick and return what happened, player events first.
    pub fn tick(&mut self) -> Vec<StageEvent> {
        let mut events = Vec::new();

        if let Some(player) = self.player {
            self.resolve_player(player, &mut events);
        }
        for i in 0..self.stage.object_count() {
            let index = ObjectIndex(i);
            if Some(index) != self.player {
                self.resolve_wanderer(index, &mut events);
            }
        }

        self.tick_counter += 1;
        events
    }

    /// Run `count` ticks and return all events in order.
    pub fn run_ticks(&mut self, count: u64) -> Vec<StageEvent> {
        let mut events = Vec::new();
        for _ in 0..count {
            events.extend(self.tick());
        }
        events
    }

    fn resolve_player(&mut self, index: ObjectIndex, events: &mut Vec<StageEvent>) {
        let Some(entity) = self.stage.object(index) else {
            return;
        };

        if entity.is_in_motion() {
            if let Some(landing) = self.stage.advance(index) {
                events.push(StageEvent::Arrived {
                    object: index,
                    tile: landing.tile(),
                });
                match self.stage.trigger_at(landing) {
                    Some(Trigger::Warp(warp)) => {
                        tracing::debug!(object = %index, destination = %warp.destination, "warp");
                        events.push(StageEvent::Warped { object: index, warp });
                    }
                    Some(Trigger::Action(action)) => {
                        events.push(StageEvent::ActionTriggered {
                            object: index,
                            action,
                        });
                    }
                    None => {}
                }
            }
            return;
        }

        let input = self.current_input;
        if input.interact {
            match self.stage.interact(index) {
                Some(Interaction::Talk { target }) => events.push(StageEvent::Talked {
                    speaker: index,
                    listener: target,
                }),
                Some(Interaction::Action(action)) => events.push(StageEvent::ActionTriggered {
                    object: index,
                    action,
                }),
                Some(Interaction::TileAction { tile, action }) => {
                    events.push(StageEvent::TileAction {
                        object: index,
                        tile,
                        action,
                    })
                }
                None => {}
            }
            return;
        }

        if let Some(direction) = input.movement {
            match self.stage.begin_step(index, direction) {
                StepCheck::Clear => events.push(StageEvent::StepStarted {
                    object: index,
                    direction,
                }),
                StepCheck::Blocked(reason) => events.push(StageEvent::Bumped {
                    object: index,
                    direction,
                    reason,
                }),
            }
        }
    }

    fn resolve_wanderer(&mut self, index: ObjectIndex, events: &mut Vec<StageEvent>) {
        let Some(entity) = self.stage.object(index) else {
            return;
        };

        if entity.is_in_motion() {
            if let Some(landing) = self.stage.advance(index) {
                events.push(StageEvent::Arrived {
                    object: index,
                    tile: landing.tile(),
                });
            }
            return;
        }

        // Without a territory an entity never moves on its own.
        if entity.territory().is_empty() || !self.picker.chance(self.config.wander_chance) {
            return;
        }

        let direction = self.picker.choose();
        let check = self.stage.check_step(index, direction);
        if check.is_clear() {
            self.stage.begin_step(index, direction);
            events.push(StageEvent::StepStarted {
                object: index,
                direction,
            });
        } else {
            tracing::trace!(object = %index, %direction, ?check, "wander skipped");
        }
    }

    // -- accessors ----------------------------------------------------------

    /// The number of ticks executed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    pub(crate) fn set_tick_counter(&mut self, tick_counter: u64) {
        self.tick_counter = tick_counter;
    }

    pub fn config(&self) -> &TickConfig {
        &self.config
    }

    /// The controlled player, if any.
    pub fn player(&self) -> Option<ObjectIndex> {
        self.player
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Mutable access to the stage.
    ///
    /// Use for setup and tests. Entities moved by hand skip collision checks.
    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    pub fn picker(&self) -> &DirectionPicker {
        &self.picker
    }

    pub(crate) fn set_picker(&mut self, picker: DirectionPicker) {
        self.picker = picker;
    }

    /// Set the input frame for the next tick.
    pub fn set_input(&mut self, input: InputFrame) {
        self.current_input = input;
    }

    /// The input frame in effect.
    pub fn current_input(&self) -> &InputFrame {
        &self.current_input
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
