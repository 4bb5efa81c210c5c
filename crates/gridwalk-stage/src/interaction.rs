//! Facing-based interaction ("press the action button").

use gridwalk_object::geometry::Tile;
use serde::{Deserialize, Serialize};

use crate::markers::Action;
use crate::stage::{ObjectIndex, Stage};

/// What an entity interacts with when it acts on the tile it faces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interaction {
    /// Another entity stands there. It has been turned to face the speaker.
    Talk { target: ObjectIndex },
    /// A scripted action is registered on the tile.
    Action(Action),
    /// The tile's own property carries an action id.
    TileAction { tile: Tile, action: i32 },
}

impl Stage {
    /// Resolve what the entity at `index` interacts with.
    ///
    /// Only an aligned entity with a facing can interact. Entities take
    /// precedence over actions, which take precedence over tile actions.
    pub fn interact(&mut self, index: ObjectIndex) -> Option<Interaction> {
        let speaker = self.object(index)?;
        if speaker.is_in_motion() {
            return None;
        }
        let speaker_tile = speaker.position().tile();
        let target = speaker.ahead(None)?;

        if let Some(other) = self.occupant_other_than(target, index) {
            // A listener mid-step keeps its heading until it lands.
            if let Some(listener) = self.object_mut(other).filter(|l| !l.is_in_motion()) {
                listener.face_towards(speaker_tile);
            }
            tracing::debug!(speaker = %index, listener = %other, "talk");
            return Some(Interaction::Talk { target: other });
        }
        if let Some(action) = self.action_at(target) {
            return Some(Interaction::Action(action.clone()));
        }
        self.tile_property(target)
            .action_id()
            .map(|action| Interaction::TileAction {
                tile: target.tile(),
                action,
            })
    }
}
