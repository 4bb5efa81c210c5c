//! Sprite-set resolution and walk-cycle frame selection.
//!
//! Every entity owns a [`SpriteFrames`] set of ten frame handles. The set is
//! chosen by the entity's numeric id: ids are split into fixed bands, each
//! band naming an [`AssetGroup`], and the offset inside the band is the
//! index of the sprite set within that group ([`SpriteKey::for_object`]).
//!
//! Turning a [`SpriteKey`] into handles is the job of a [`SpriteSource`].
//! Two stores are provided:
//!
//! - [`DirectorySprites`]: one directory per key under a root
//!   (`<root>/<group>/<index>/`), one handle per file, files ordered by name.
//!   The renderer maps handles back to paths and decodes them itself.
//! - [`PlaceholderSprites`]: hands out stable handles without touching the
//!   filesystem, for headless runs and tests.
//!
//! Which of the ten frames is shown is a pure function of facing and
//! position; see [`frame_slot`].

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::direction::Direction;
use crate::geometry::{Point, TILE_SIZE};
use crate::SpriteError;

/// Number of frames in every sprite set.
pub const FRAME_COUNT: usize = 10;

/// Sub-tile offset that splits a step into its two animation halves.
const MID_TILE: i32 = 8;

// ---------------------------------------------------------------------------
// AssetGroup / SpriteKey
// ---------------------------------------------------------------------------

/// Named family of sprite sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetGroup {
    Big,
    Blue,
    Brown,
    Gray,
    Green,
    Pink,
    Red,
    Special,
    User,
}

impl AssetGroup {
    /// Directory name of this group.
    pub const fn dir_name(self) -> &'static str {
        match self {
            AssetGroup::Big => "big",
            AssetGroup::Blue => "blue",
            AssetGroup::Brown => "brown",
            AssetGroup::Gray => "gray",
            AssetGroup::Green => "green",
            AssetGroup::Pink => "pink",
            AssetGroup::Red => "red",
            AssetGroup::Special => "special",
            AssetGroup::User => "user",
        }
    }
}

impl fmt::Display for AssetGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// First id of each band, in ascending order. A band runs up to the start of
/// the next one; the last band is unbounded.
const BANDS: [(i32, AssetGroup); 9] = [
    (0, AssetGroup::Big),
    (18, AssetGroup::Blue),
    (18 + 144, AssetGroup::Brown),
    (18 + 144 * 2, AssetGroup::Gray),
    (18 + 144 * 3, AssetGroup::Green),
    (18 + 144 * 4, AssetGroup::Pink),
    (18 + 144 * 5, AssetGroup::Red),
    (18 + 144 * 6, AssetGroup::Special),
    (18 + 144 * 6 + 8, AssetGroup::User),
];

/// Identifies one sprite set: a group and the set's index inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteKey {
    pub group: AssetGroup,
    pub index: u32,
}

impl SpriteKey {
    /// Resolve an object id to its sprite set. Negative ids have none.
    pub fn for_object(id: i32) -> Option<Self> {
        let (start, group) = BANDS.iter().rev().find(|(start, _)| id >= *start)?;
        Some(Self {
            group: *group,
            index: (id - start) as u32,
        })
    }

    /// Path of this set relative to a sprite root: `<group>/<index>`.
    pub fn relative_dir(self) -> PathBuf {
        Path::new(self.group.dir_name()).join(self.index.to_string())
    }
}

impl fmt::Display for SpriteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.index)
    }
}

// ---------------------------------------------------------------------------
// FrameHandle / SpriteFrames
// ---------------------------------------------------------------------------

/// Opaque handle to one decoded frame, issued by a [`SpriteSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameHandle(pub u32);

/// The ten frame slots of one sprite set. Slots past the number of files
/// found are empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpriteFrames {
    slots: [Option<FrameHandle>; FRAME_COUNT],
}

impl SpriteFrames {
    /// Fill slots in order from `handles`. Fails if there are more than
    /// [`FRAME_COUNT`] handles.
    pub fn from_handles(
        handles: impl IntoIterator<Item = FrameHandle>,
    ) -> Result<Self, TooManyFrames> {
        let mut slots = [None; FRAME_COUNT];
        let mut count = 0usize;
        for handle in handles {
            if count < FRAME_COUNT {
                slots[count] = Some(handle);
            }
            count += 1;
        }
        if count > FRAME_COUNT {
            return Err(TooManyFrames(count));
        }
        Ok(Self { slots })
    }

    /// Handle stored in `slot`, if any.
    pub fn get(&self, slot: usize) -> Option<FrameHandle> {
        self.slots.get(slot).copied().flatten()
    }

    /// Number of filled slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// More handles were offered than a sprite set holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TooManyFrames(pub usize);

// ---------------------------------------------------------------------------
// Frame selection
// ---------------------------------------------------------------------------

/// Frame slot to draw for an entity facing `direction` at `position`.
///
/// Vertical walks alternate between two mid-step frames depending on the
/// parity of the tile row; horizontal walks use a single mid-step frame.
///
/// | facing | aligned | mid-step (first half / second half)           |
/// |--------|---------|-----------------------------------------------|
/// | up     | 1       | 1 / 4 on even row, 8 on odd row               |
/// | down   | 0       | 3 on even row, 7 on odd row / 0               |
/// | right  | 6       | 9 / 6                                         |
/// | left   | 2       | 5 / 2                                         |
/// | unset  | 0       | 0                                             |
pub fn frame_slot(direction: Option<Direction>, position: Point) -> usize {
    let Point { x, y } = position;
    let sub_x = x % TILE_SIZE;
    let sub_y = y % TILE_SIZE;
    let row_parity = (y / TILE_SIZE) % 2;

    match direction {
        Some(Direction::Up) => match sub_y {
            0 => 1,
            s if s > MID_TILE && row_parity == 0 => 4,
            s if s > MID_TILE && row_parity == 1 => 8,
            _ => 1,
        },
        Some(Direction::Down) => match sub_y {
            0 => 0,
            s if s < MID_TILE && row_parity == 0 => 3,
            s if s < MID_TILE && row_parity == 1 => 7,
            _ => 0,
        },
        Some(Direction::Right) => match sub_x {
            0 => 6,
            s if s < MID_TILE => 9,
            _ => 6,
        },
        Some(Direction::Left) => match sub_x {
            0 => 2,
            s if s < MID_TILE => 5,
            _ => 2,
        },
        None => 0,
    }
}

// ---------------------------------------------------------------------------
// SpriteSource
// ---------------------------------------------------------------------------

/// Resolves sprite keys to frame handles. Implementations own the frames;
/// entities only hold handles.
pub trait SpriteSource {
    /// Resolve `key` to its ten frame slots.
    fn resolve(&mut self, key: SpriteKey) -> Result<SpriteFrames, SpriteError>;
}

/// Filesystem-backed sprite store.
///
/// Each handle indexes into [`paths`](Self::path); the same key always
/// resolves to the same handles.
#[derive(Debug)]
pub struct DirectorySprites {
    root: PathBuf,
    paths: Vec<PathBuf>,
    cache: HashMap<SpriteKey, SpriteFrames>,
}

impl DirectorySprites {
    /// Create a store reading sprite sets below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            paths: Vec::new(),
            cache: HashMap::new(),
        }
    }

    /// Root directory of this store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `handle`.
    pub fn path(&self, handle: FrameHandle) -> Option<&Path> {
        self.paths.get(handle.0 as usize).map(PathBuf::as_path)
    }

    /// Number of distinct frame files registered so far.
    pub fn frame_count(&self) -> usize {
        self.paths.len()
    }

    fn read_set(&self, dir: &Path) -> Result<Vec<PathBuf>, SpriteError> {
        let entries = std::fs::read_dir(dir).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                SpriteError::MissingDirectory {
                    path: dir.to_path_buf(),
                }
            } else {
                SpriteError::Io {
                    path: dir.to_path_buf(),
                    source,
                }
            }
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| SpriteError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            files.push(entry.path());
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }
}

impl SpriteSource for DirectorySprites {
    fn resolve(&mut self, key: SpriteKey) -> Result<SpriteFrames, SpriteError> {
        if let Some(frames) = self.cache.get(&key) {
            return Ok(*frames);
        }

        let dir = self.root.join(key.relative_dir());
        let files = self.read_set(&dir)?;
        if files.len() > FRAME_COUNT {
            return Err(SpriteError::TooManyFrames {
                path: dir,
                count: files.len(),
            });
        }

        let first = self.paths.len() as u32;
        let count = files.len() as u32;
        self.paths.extend(files);
        let frames = SpriteFrames::from_handles((first..first + count).map(FrameHandle))
            .map_err(|TooManyFrames(count)| SpriteError::TooManyFrames {
                path: dir.clone(),
                count,
            })?;

        tracing::debug!(key = %key, dir = %dir.display(), frames = count, "sprite set registered");
        self.cache.insert(key, frames);
        Ok(frames)
    }
}

/// Sprite store that never touches the filesystem.
///
/// Each new key gets [`FRAME_COUNT`] fresh, consecutive handles.
#[derive(Debug, Default)]
pub struct PlaceholderSprites {
    next: u32,
    cache: HashMap<SpriteKey, SpriteFrames>,
}

impl PlaceholderSprites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct keys resolved so far.
    pub fn resolved_sets(&self) -> usize {
        self.cache.len()
    }
}

impl SpriteSource for PlaceholderSprites {
    fn resolve(&mut self, key: SpriteKey) -> Result<SpriteFrames, SpriteError> {
        if let Some(frames) = self.cache.get(&key) {
            return Ok(*frames);
        }
        let first = self.next;
        self.next += FRAME_COUNT as u32;
        let mut slots = [None; FRAME_COUNT];
        for (i, slot) in slots.iter_mut().enumerate() {
            *slot = Some(FrameHandle(first + i as u32));
        }
        let frames = SpriteFrames { slots };
        self.cache.insert(key, frames);
        Ok(frames)
    }
}
