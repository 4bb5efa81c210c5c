//! Tile grid and tile property table.
//!
//! A stage's terrain is a row-major grid of tile ids ([`TileGrid`]) plus a
//! sparse table mapping tile ids to walkability and action flags
//! ([`PropertyTable`]). Both are built once at load time and never change.
//!
//! Property tables are assembled from one or more tilesets. Each tileset
//! numbers its tiles from zero and is placed into the global id space at its
//! `firstgid`, so tile `n` of a tileset with `firstgid` `g` has id `g + n`.

use std::collections::HashMap;
use std::path::Path;

use gridwalk_object::geometry::Tile;
use serde::{Deserialize, Serialize};

use crate::StageError;

// ---------------------------------------------------------------------------
// TileProperty
// ---------------------------------------------------------------------------

/// Flags attached to one tile id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileProperty {
    /// Non-zero when the tile cannot be walked onto.
    pub block: i32,
    /// Action id triggered by interacting with the tile; zero for none.
    pub action: i32,
}

impl TileProperty {
    /// Walkable, no action. Used for tiles without a registered property.
    pub const OPEN: TileProperty = TileProperty { block: 0, action: 0 };

    /// Not walkable, no action. Used outside the stage.
    pub const BLOCKED: TileProperty = TileProperty { block: 1, action: 0 };

    pub fn is_blocked(self) -> bool {
        self.block != 0
    }

    /// The tile's action id, if it has one.
    pub fn action_id(self) -> Option<i32> {
        (self.action != 0).then_some(self.action)
    }
}

// ---------------------------------------------------------------------------
// Tileset property sources
// ---------------------------------------------------------------------------

/// Property entries of one tileset, as stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TilesetProperties {
    #[serde(default)]
    pub tiles: Vec<TileEntry>,
}

/// Properties of one tile inside a tileset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileEntry {
    /// Tile index local to the tileset.
    pub id: i32,
    #[serde(default)]
    pub properties: Vec<NamedValue>,
}

/// A named property value. Only `block` and `action` are interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedValue {
    pub name: String,
    pub value: serde_json::Value,
}

impl NamedValue {
    /// Integer reading of the value. Booleans read as 0 or 1.
    fn as_int(&self) -> Option<i32> {
        match &self.value {
            serde_json::Value::Bool(b) => Some(i32::from(*b)),
            serde_json::Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// PropertyTable
// ---------------------------------------------------------------------------

/// Mapping from global tile id to [`TileProperty`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyTable {
    entries: HashMap<i32, TileProperty>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `property` for `tile_id`, replacing any previous entry.
    pub fn insert(&mut self, tile_id: i32, property: TileProperty) {
        self.entries.insert(tile_id, property);
    }

    /// Property registered for `tile_id`.
    pub fn get(&self, tile_id: i32) -> Option<TileProperty> {
        self.entries.get(&tile_id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Merge a tileset's entries at offset `first_gid`.
    ///
    /// Every listed tile gets an entry, even one with no recognised
    /// properties. Unrecognised names are skipped. `path` only labels errors.
    /// Nothing is merged when an error is returned.
    ///
    /// # Errors
    ///
    /// [`StageError::TileIdOverflow`] if `first_gid + id` leaves the `i32`
    /// range, [`StageError::InvalidProperty`] if a `block` or `action` value
    /// is neither an integer nor a boolean.
    pub fn merge_tileset(
        &mut self,
        first_gid: i32,
        tileset: &TilesetProperties,
        path: &Path,
    ) -> Result<(), StageError> {
        let mut merged = Vec::with_capacity(tileset.tiles.len());
        for tile in &tileset.tiles {
            let tile_id = first_gid
                .checked_add(tile.id)
                .ok_or_else(|| StageError::TileIdOverflow {
                    path: path.to_path_buf(),
                    first_gid,
                    local_id: tile.id,
                })?;
            let mut property = TileProperty::OPEN;
            for named in &tile.properties {
                let slot = match named.name.as_str() {
                    "block" => &mut property.block,
                    "action" => &mut property.action,
                    other => {
                        tracing::trace!(tile_id, name = other, "skipping unrecognised tile property");
                        continue;
                    }
                };
                *slot = named.as_int().ok_or_else(|| StageError::InvalidProperty {
                    path: path.to_path_buf(),
                    local_id: tile.id,
                    name: named.name.clone(),
                    value: named.value.clone(),
                })?;
            }
            merged.push((tile_id, property));
        }
        self.entries.extend(merged);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TileGrid
// ---------------------------------------------------------------------------

/// Row-major grid of tile ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: i32,
    height: i32,
    ids: Vec<i32>,
}

impl TileGrid {
    /// Build a grid of `width` x `height` tiles from row-major `ids`.
    ///
    /// # Errors
    ///
    /// [`StageError::InvalidDimensions`] if either dimension is zero or negative,
    /// [`StageError::TileCountMismatch`] if `ids` does not hold exactly
    /// `width * height` entries.
    pub fn new(width: i32, height: i32, ids: Vec<i32>) -> Result<Self, StageError> {
        if width <= 0 || height <= 0 {
            return Err(StageError::InvalidDimensions { width, height });
        }
        let expected = width as usize * height as usize;
        if ids.len() != expected {
            return Err(StageError::TileCountMismatch {
                width,
                height,
                expected,
                actual: ids.len(),
            });
        }
        Ok(Self { width, height, ids })
    }

    /// Width in tiles.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in tiles.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Whether `tile` lies inside the grid.
    pub fn contains(&self, tile: Tile) -> bool {
        (0..self.width).contains(&tile.x) && (0..self.height).contains(&tile.y)
    }

    /// Tile id at `tile`, or `None` outside the grid.
    pub fn tile_id(&self, tile: Tile) -> Option<i32> {
        if !self.contains(tile) {
            return None;
        }
        let index = tile.y as usize * self.width as usize + tile.x as usize;
        self.ids.get(index).copied()
    }

    /// All tile ids in row-major order.
    pub fn ids(&self) -> &[i32] {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tileset(json: &str) -> TilesetProperties {
        serde_json::from_str(json).unwrap()
    }

    fn merge(table: &mut PropertyTable, first_gid: i32, json: &str) -> Result<(), StageError> {
        table.merge_tileset(first_gid, &tileset(json), Path::new("ground.json"))
    }

    #[test]
    fn merge_offsets_by_first_gid() {
        let mut table = PropertyTable::new();
        merge(
            &mut table,
            10,
            r#"{"tiles": [{"id": 2, "properties": [{"name": "block", "value": 1}]}]}"#,
        )
        .unwrap();
        assert_eq!(table.get(12), Some(TileProperty::BLOCKED));
        assert_eq!(table.get(2), None);
    }

    #[test]
    fn merge_reads_block_and_action() {
        let mut table = PropertyTable::new();
        merge(
            &mut table,
            1,
            r#"{"tiles": [
                    {"id": 0, "properties": [
                        {"name": "block", "type": "int", "value": 1},
                        {"name": "action", "type": "int", "value": 7},
                        {"name": "sound", "type": "string", "value": "creak"}
                    ]},
                    {"id": 1, "properties": [{"name": "block", "type": "bool", "value": true}]},
                    {"id": 2}
                ]}"#,
        )
        .unwrap();
        assert_eq!(table.get(1), Some(TileProperty { block: 1, action: 7 }));
        assert_eq!(table.get(2), Some(TileProperty::BLOCKED));
        assert_eq!(table.get(3), Some(TileProperty::OPEN));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn non_integer_values_are_rejected() {
        let mut table = PropertyTable::new();
        let err = merge(
            &mut table,
            0,
            r#"{"tiles": [
                {"id": 1, "properties": [{"name": "block", "value": 1}]},
                {"id": 3, "properties": [{"name": "block", "value": "yes"}]}
            ]}"#,
        )
        .unwrap_err();
        match err {
            StageError::InvalidProperty { path, local_id, name, .. } => {
                assert_eq!(path, Path::new("ground.json"));
                assert_eq!(local_id, 3);
                assert_eq!(name, "block");
            }
            other => panic!("expected invalid property, got {other:?}"),
        }
        assert!(table.is_empty());
    }

    #[test]
    fn ids_past_i32_max_are_rejected() {
        let mut table = PropertyTable::new();
        let err = merge(&mut table, i32::MAX, r#"{"tiles": [{"id": 0}, {"id": 5}]}"#).unwrap_err();
        assert!(
            matches!(err, StageError::TileIdOverflow { first_gid: i32::MAX, local_id: 5, .. }),
            "{err}"
        );
        assert!(table.is_empty());
    }

    #[test]
    fn later_tilesets_override_earlier_ids() {
        let mut table = PropertyTable::new();
        merge(
            &mut table,
            0,
            r#"{"tiles": [{"id": 4, "properties": [{"name": "block", "value": 1}]}]}"#,
        )
        .unwrap();
        merge(
            &mut table,
            4,
            r#"{"tiles": [{"id": 0, "properties": [{"name": "action", "value": 3}]}]}"#,
        )
        .unwrap();
        assert_eq!(table.get(4), Some(TileProperty { block: 0, action: 3 }));
    }

    #[test]
    fn grid_rejects_wrong_tile_count() {
        let err = TileGrid::new(2, 2, vec![1, 2, 3]).unwrap_err();
        assert!(
            matches!(err, StageError::TileCountMismatch { expected: 4, actual: 3, .. }),
            "{err}"
        );
    }

    #[test]
    fn grid_rejects_empty_dimensions() {
        for (width, height) in [(-1, 2), (0, 3), (3, 0), (0, 0)] {
            let err = TileGrid::new(width, height, vec![]).unwrap_err();
            assert!(matches!(err, StageError::InvalidDimensions { .. }), "{err}");
        }
    }

    #[test]
    fn grid_lookup_is_row_major() {
        let grid = TileGrid::new(3, 2, vec![0, 1, 2, 3, 4, 5]).unwrap();
        assert_eq!(grid.tile_id(Tile::new(0, 0)), Some(0));
        assert_eq!(grid.tile_id(Tile::new(2, 0)), Some(2));
        assert_eq!(grid.tile_id(Tile::new(0, 1)), Some(3));
        assert_eq!(grid.tile_id(Tile::new(2, 1)), Some(5));
        assert_eq!(grid.tile_id(Tile::new(3, 0)), None);
        assert_eq!(grid.tile_id(Tile::new(0, 2)), None);
        assert_eq!(grid.tile_id(Tile::new(-1, 0)), None);
    }

    #[test]
    fn action_id_is_none_for_zero() {
        assert_eq!(TileProperty::OPEN.action_id(), None);
        assert_eq!(TileProperty { block: 0, action: 9 }.action_id(), Some(9));
    }
}
