//! Deterministic replay with input recording and checkpoint verification.
//!
//! While a stage loop runs, a [`ReplayRecorder`] stores every input change
//! and periodic state hash checkpoints into a [`ReplayLog`]. [`replay`]
//! restores the log's initial snapshot onto a loop built from the same stage,
//! feeds the recorded inputs tick by tick and compares hashes at each
//! checkpoint.
//!
//! # Recording
//!
//! ```
//! use gridwalk_engine::prelude::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let grid = TileGrid::new(4, 4, vec![0; 16]).unwrap();
//! let player = Entity::new(900, Tile::new(0, 0)).with_kind(EntityKind::Player);
//! let stage = Stage::new(grid, PropertyTable::new(), vec![], vec![], vec![player]);
//! let mut stage_loop = StageLoop::new(stage.clone(), TickConfig::default());
//!
//! let mut recorder = ReplayRecorder::new(stage_loop.capture_snapshot()?, 8);
//! for tick in 0..40 {
//!     if tick == 3 {
//!         stage_loop.set_input(InputFrame::walk(Direction::Down));
//!     }
//!     let hash = stage_loop.state_hash()?;
//!     recorder.record_tick(stage_loop.tick_count(), stage_loop.current_input(), Some(hash));
//!     stage_loop.tick();
//! }
//! let log = recorder.finish();
//!
//! let mut fresh = StageLoop::new(stage, TickConfig::default());
//! let result = replay(&mut fresh, &log)?;
//! assert!(result.completed);
//! assert!(result.first_divergence.is_none());
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::snapshot::StageSnapshot;
use crate::tick::{InputFrame, StageLoop};

// ---------------------------------------------------------------------------
// ReplayLog
// ---------------------------------------------------------------------------

/// An initial snapshot plus the ordered inputs and checkpoints that followed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayLog {
    /// State at the start of recording.
    pub initial_snapshot: StageSnapshot,
    /// Number of ticks recorded. Replay executes exactly this many.
    pub total_ticks: u64,
    pub entries: Vec<ReplayEntry>,
}

/// One entry in a [`ReplayLog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplayEntry {
    /// The input became `input` at `tick` and held until the next entry.
    Input { tick: u64, input: InputFrame },
    /// State hash taken at `tick`, after the input was set and before the
    /// tick ran.
    Checkpoint { tick: u64, state_hash: String },
}

/// The outcome of replaying a [`ReplayLog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayResult {
    /// Whether every tick ran without diverging.
    pub completed: bool,
    pub ticks_replayed: u64,
    /// The first checkpoint whose hash did not match.
    pub first_divergence: Option<ReplayDivergence>,
}

/// A checkpoint where the replayed state differed from the recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayDivergence {
    pub tick: u64,
    pub expected_hash: String,
    pub actual_hash: String,
}

// ---------------------------------------------------------------------------
// ReplayRecorder
// ---------------------------------------------------------------------------

/// Records a stage loop run into a [`ReplayLog`].
///
/// Call [`record_tick`](Self::record_tick) before every tick. Inputs are
/// stored only when they change, since an input stays in effect until
/// replaced.
#[derive(Debug)]
pub struct ReplayRecorder {
    log: ReplayLog,
    /// Ticks between checkpoints; 0 checkpoints every hash supplied.
    checkpoint_interval: u64,
    last_tick: Option<u64>,
    last_input: InputFrame,
}

impl ReplayRecorder {
    /// Start recording from `snapshot`.
    pub fn new(snapshot: StageSnapshot, checkpoint_interval: u64) -> Self {
        let last_input = snapshot.current_input;
        Self {
            log: ReplayLog {
                initial_snapshot: snapshot,
                total_ticks: 0,
                entries: Vec::new(),
            },
            checkpoint_interval,
            last_tick: None,
            last_input,
        }
    }

    /// Record the input and optional state hash for `tick`.
    ///
    /// # Panics
    ///
    /// Panics if `tick` is not strictly greater than the previous call's.
    pub fn record_tick(&mut self, tick: u64, input: &InputFrame, state_hash: Option<String>) {
        if let Some(prev) = self.last_tick {
            assert!(
                tick > prev,
                "ReplayRecorder::record_tick: tick {tick} is not after previous tick {prev}"
            );
        }
        self.last_tick = Some(tick);
        self.log.total_ticks += 1;

        if *input != self.last_input {
            self.log.entries.push(ReplayEntry::Input {
                tick,
                input: *input,
            });
            self.last_input = *input;
        }

        if let Some(hash) = state_hash {
            if self.checkpoint_interval == 0 || tick % self.checkpoint_interval == 0 {
                self.log.entries.push(ReplayEntry::Checkpoint {
                    tick,
                    state_hash: hash,
                });
            }
        }
    }

    pub fn finish(self) -> ReplayLog {
        self.log
    }
}

// ---------------------------------------------------------------------------
// replay()
// ---------------------------------------------------------------------------

/// Replay `log` on `stage_loop`, stopping at the first diverging checkpoint.
///
/// # Errors
///
/// Returns an error if the log holds duplicate entries for a tick, if its
/// tick range overflows, or if the initial snapshot cannot be restored. The
/// log is validated before the loop is touched, so on error the loop is
/// unmodified.
pub fn replay(stage_loop: &mut StageLoop, log: &ReplayLog) -> anyhow::Result<ReplayResult> {
    let mut inputs: BTreeMap<u64, InputFrame> = BTreeMap::new();
    let mut checkpoints: BTreeMap<u64, &str> = BTreeMap::new();

    for entry in &log.entries {
        match entry {
            ReplayEntry::Input { tick, input } => {
                if inputs.insert(*tick, *input).is_some() {
                    anyhow::bail!("replay log contains duplicate Input entry at tick {tick}");
                }
            }
            ReplayEntry::Checkpoint { tick, state_hash } => {
                if checkpoints.insert(*tick, state_hash).is_some() {
                    anyhow::bail!("replay log contains duplicate Checkpoint entry at tick {tick}");
                }
            }
        }
    }

    let start_tick = log.initial_snapshot.tick_counter;
    let end_tick = start_tick.checked_add(log.total_ticks).ok_or_else(|| {
        anyhow::anyhow!(
            "tick range overflow: start {start_tick} + {} ticks exceeds u64::MAX",
            log.total_ticks
        )
    })?;

    stage_loop
        .restore_from_snapshot(&log.initial_snapshot)
        .map_err(|e| anyhow::anyhow!("failed to restore initial snapshot for replay: {e}"))?;

    let mut ticks_replayed = 0;
    for tick in start_tick..end_tick {
        if let Some(input) = inputs.get(&tick) {
            stage_loop.set_input(*input);
        }

        if let Some(&expected) = checkpoints.get(&tick) {
            let actual_hash = stage_loop.state_hash()?;
            if actual_hash != expected {
                tracing::warn!(tick, expected, actual = %actual_hash, "replay diverged");
                return Ok(ReplayResult {
                    completed: false,
                    ticks_replayed,
                    first_divergence: Some(ReplayDivergence {
                        tick,
                        expected_hash: expected.to_owned(),
                        actual_hash,
                    }),
                });
            }
        }

        stage_loop.tick();
        ticks_replayed += 1;
    }

    Ok(ReplayResult {
        completed: true,
        ticks_replayed,
        first_divergence: None,
    })
}
