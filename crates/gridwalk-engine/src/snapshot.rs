//! Snapshot and restore of a running stage loop, with BLAKE3 hashing.
//!
//! A [`StageSnapshot`] holds everything that changes while the loop runs:
//! the tick counter, the current input, the wandering RNG state and every
//! entity's position and facing. The grid, properties, markers, territories
//! and sprites never change after loading and are not captured, so a
//! snapshot is restored onto a loop built from the same stage.
//!
//! ```
//! use gridwalk_engine::prelude::*;
//!
//! let grid = TileGrid::new(3, 3, vec![0; 9]).unwrap();
//! let player = Entity::new(900, Tile::new(0, 0)).with_kind(EntityKind::Player);
//! let stage = Stage::new(grid, PropertyTable::new(), vec![], vec![], vec![player]);
//! let mut stage_loop = StageLoop::new(stage, TickConfig::default());
//!
//! stage_loop.set_input(InputFrame::walk(Direction::Right));
//! stage_loop.run_ticks(5);
//! let snapshot = stage_loop.capture_snapshot().unwrap();
//! assert_eq!(snapshot.hash.len(), 64);
//!
//! stage_loop.run_ticks(20);
//! stage_loop.restore_from_snapshot(&snapshot).unwrap();
//! assert_eq!(stage_loop.tick_count(), 5);
//! assert_eq!(stage_loop.state_hash().unwrap(), snapshot.hash);
//! ```

use gridwalk_object::direction::Direction;
use gridwalk_object::geometry::Point;
use gridwalk_object::wander::DirectionPicker;
use gridwalk_stage::stage::ObjectIndex;
use serde::{Deserialize, Serialize};

use crate::tick::{InputFrame, StageLoop};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while capturing or restoring a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The state could not be encoded for hashing.
    #[error("failed to encode stage state: {0}")]
    Encode(#[from] serde_json::Error),

    /// The recorded hash does not match the snapshot contents.
    #[error("snapshot hash mismatch: recorded {recorded} but recomputed {recomputed}")]
    HashMismatch {
        recorded: String,
        recomputed: String,
    },

    /// The snapshot was taken on a stage with a different population.
    #[error("snapshot holds {snapshot} objects but the stage has {stage}")]
    ObjectCountMismatch { snapshot: usize, stage: usize },

    /// An object slot holds a different entity than when captured.
    #[error("object #{index} has id {stage} but the snapshot expects {snapshot}")]
    ObjectIdMismatch {
        index: usize,
        snapshot: i32,
        stage: i32,
    },
}

// ---------------------------------------------------------------------------
// StageSnapshot
// ---------------------------------------------------------------------------

/// The mutable state of one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectState {
    pub id: i32,
    pub position: Point,
    pub direction: Option<Direction>,
}

/// A serializable snapshot of a stage loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageSnapshot {
    /// Number of ticks executed at the time of capture.
    pub tick_counter: u64,
    /// Entity states in stage order.
    pub objects: Vec<ObjectState>,
    /// Wandering RNG state.
    pub picker: DirectionPicker,
    /// Input frame at the time of capture.
    pub current_input: InputFrame,
    /// BLAKE3 hex digest of the fields above.
    pub hash: String,
}

fn compute_hash(
    tick_counter: u64,
    objects: &[ObjectState],
    picker: &DirectionPicker,
    current_input: &InputFrame,
) -> Result<String, SnapshotError> {
    #[derive(Serialize)]
    struct HashableState<'a> {
        tick_counter: u64,
        objects: &'a [ObjectState],
        picker: &'a DirectionPicker,
        current_input: &'a InputFrame,
    }

    let json_bytes = serde_json::to_vec(&HashableState {
        tick_counter,
        objects,
        picker,
        current_input,
    })?;
    Ok(blake3::hash(&json_bytes).to_hex().to_string())
}

// ---------------------------------------------------------------------------
// StageLoop snapshot/restore methods
// ---------------------------------------------------------------------------

impl StageLoop {
    fn object_states(&self) -> Vec<ObjectState> {
        self.stage()
            .objects()
            .iter()
            .map(|e| ObjectState {
                id: e.id(),
                position: e.position(),
                direction: e.direction(),
            })
            .collect()
    }

    /// Capture the loop's mutable state.
    pub fn capture_snapshot(&self) -> Result<StageSnapshot, SnapshotError> {
        let objects = self.object_states();
        let picker = self.picker().clone();
        let current_input = *self.current_input();
        let hash = compute_hash(self.tick_count(), &objects, &picker, &current_input)?;

        Ok(StageSnapshot {
            tick_counter: self.tick_count(),
            objects,
            picker,
            current_input,
            hash,
        })
    }

    /// Restore a previously captured state.
    ///
    /// # Errors
    ///
    /// Fails without touching the loop if the snapshot's hash does not match
    /// its contents, or if its objects do not line up with the stage's by
    /// count and id.
    pub fn restore_from_snapshot(&mut self, snapshot: &StageSnapshot) -> Result<(), SnapshotError> {
        let recomputed = compute_hash(
            snapshot.tick_counter,
            &snapshot.objects,
            &snapshot.picker,
            &snapshot.current_input,
        )?;
        if recomputed != snapshot.hash {
            return Err(SnapshotError::HashMismatch {
                recorded: snapshot.hash.clone(),
                recomputed,
            });
        }

        let stage = self.stage();
        if snapshot.objects.len() != stage.object_count() {
            return Err(SnapshotError::ObjectCountMismatch {
                snapshot: snapshot.objects.len(),
                stage: stage.object_count(),
            });
        }
        for (index, (saved, live)) in snapshot.objects.iter().zip(stage.objects()).enumerate() {
            if saved.id != live.id() {
                return Err(SnapshotError::ObjectIdMismatch {
                    index,
                    snapshot: saved.id,
                    stage: live.id(),
                });
            }
        }

        let stage = self.stage_mut();
        for (i, saved) in snapshot.objects.iter().enumerate() {
            if let Some(entity) = stage.object_mut(ObjectIndex(i)) {
                entity.restore(saved.position, saved.direction);
            }
        }
        self.set_tick_counter(snapshot.tick_counter);
        self.set_picker(snapshot.picker.clone());
        self.set_input(snapshot.current_input);

        tracing::debug!(tick = snapshot.tick_counter, hash = %snapshot.hash, "snapshot restored");
        Ok(())
    }

    /// BLAKE3 hash of the current state, equal to
    /// `capture_snapshot()?.hash`.
    pub fn state_hash(&self) -> Result<String, SnapshotError> {
        compute_hash(
            self.tick_count(),
            &self.object_states(),
            self.picker(),
            self.current_input(),
        )
    }
}
