//! Loading a stage from its directory.
//!
//! A stage directory holds a tile map (`stage.json`), the tilesets it
//! references, and three lists: actions, objects and warps. Every file is
//! JSON. Loading is all or nothing: the first missing or malformed file
//! aborts with a [`StageError`] naming it.
//!
//! ```text
//! stage.json    {"width": W, "height": H,
//!                "layers": [{"data": [ids...]}],
//!                "tilesets": [{"firstgid": G, "source": "tiles.json"}]}
//! tiles.json    {"tiles": [{"id": N, "properties": [{"name": "block", "value": 1}]}]}
//! actions.json  {"actions": [{"x": X, "y": Y, "action": A}]}
//! objects.json  {"objects": [{"id": I, "start": [X, Y], "territory": [[X, Y]],
//!                             "direction": "down", "type": "npc", "text": ["..."]}]}
//! warp.json     {"warps": [{"x": X, "y": Y, "destination": "name"}]}
//! ```

use std::path::{Path, PathBuf};

use gridwalk_object::entity::{Entity, ObjectList};
use gridwalk_object::sprite::SpriteSource;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::markers::{ActionList, WarpList};
use crate::stage::Stage;
use crate::tiles::{PropertyTable, TileGrid, TilesetProperties};
use crate::StageError;

// ---------------------------------------------------------------------------
// StageFiles
// ---------------------------------------------------------------------------

/// File names inside a stage directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFiles {
    pub stage: PathBuf,
    pub actions: PathBuf,
    pub objects: PathBuf,
    pub warps: PathBuf,
}

impl Default for StageFiles {
    fn default() -> Self {
        Self {
            stage: PathBuf::from("stage.json"),
            actions: PathBuf::from("actions.json"),
            objects: PathBuf::from("objects.json"),
            warps: PathBuf::from("warp.json"),
        }
    }
}

// ---------------------------------------------------------------------------
// Raw tile map
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawStage {
    width: i32,
    height: i32,
    layers: Vec<RawLayer>,
    #[serde(default)]
    tilesets: Vec<TilesetRef>,
}

#[derive(Debug, Deserialize)]
struct RawLayer {
    #[serde(default)]
    data: Vec<i32>,
}

#[derive(Debug, Deserialize)]
struct TilesetRef {
    #[serde(alias = "firstGID")]
    firstgid: i32,
    source: PathBuf,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StageError> {
    let bytes = std::fs::read(path).map_err(|source| StageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| StageError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Stage::load
// ---------------------------------------------------------------------------

impl Stage {
    /// Load the stage in `dir` using the default file names.
    pub fn load(dir: impl AsRef<Path>, sprites: &mut dyn SpriteSource) -> Result<Self, StageError> {
        Self::load_with(dir, &StageFiles::default(), sprites)
    }

    /// Load the stage in `dir`, resolving every object's sprite set through
    /// `sprites`.
    ///
    /// # Errors
    ///
    /// Fails on the first file that cannot be read or parsed, on a tile map
    /// without layers or whose first layer does not hold `width * height`
    /// ids, on a tileset with out-of-range ids or non-integer flags, and on
    /// any object whose sprite set cannot be resolved.
    pub fn load_with(
        dir: impl AsRef<Path>,
        files: &StageFiles,
        sprites: &mut dyn SpriteSource,
    ) -> Result<Self, StageError> {
        let dir = dir.as_ref();

        let stage_path = dir.join(&files.stage);
        let raw: RawStage = read_json(&stage_path)?;
        let layer = raw
            .layers
            .into_iter()
            .next()
            .ok_or_else(|| StageError::MissingLayer {
                path: stage_path.clone(),
            })?;
        let grid = TileGrid::new(raw.width, raw.height, layer.data)?;

        let mut properties = PropertyTable::new();
        for tileset in &raw.tilesets {
            let path = dir.join(&tileset.source);
            let source: TilesetProperties = read_json(&path)?;
            properties.merge_tileset(tileset.firstgid, &source, &path)?;
            tracing::debug!(
                tileset = %path.display(),
                first_gid = tileset.firstgid,
                tiles = source.tiles.len(),
                "tileset merged"
            );
        }

        let actions: ActionList = read_json(&dir.join(&files.actions))?;

        let object_list: ObjectList = read_json(&dir.join(&files.objects))?;
        let mut objects = Vec::with_capacity(object_list.objects.len());
        for record in object_list.objects {
            let mut entity = Entity::from_record(record);
            entity
                .attach_sprites(sprites)
                .map_err(|source| StageError::Sprite {
                    object_id: entity.id(),
                    source,
                })?;
            objects.push(entity);
        }

        let warps: WarpList = read_json(&dir.join(&files.warps))?;

        tracing::debug!(
            stage = %dir.display(),
            width = grid.width(),
            height = grid.height(),
            properties = properties.len(),
            actions = actions.actions.len(),
            objects = objects.len(),
            warps = warps.warps.len(),
            "stage loaded"
        );

        Ok(Stage::new(
            grid,
            properties,
            actions.actions,
            warps.warps,
            objects,
        ))
    }
}
