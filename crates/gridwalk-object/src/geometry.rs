//! Pixel and tile coordinates.
//!
//! Every position on a stage is stored in pixel units. One tile spans
//! [`TILE_SIZE`] pixels on each axis. [`Point`] is a pixel coordinate and
//! [`Tile`] is a tile coordinate; conversions between the two go through
//! [`Tile::origin`] and [`Point::tile`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Edge length of one tile in pixel units.
pub const TILE_SIZE: i32 = 16;

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal pixel coordinate.
    pub x: i32,
    /// Vertical pixel coordinate.
    pub y: i32,
}

impl Point {
    /// Construct a point from pixel coordinates.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The tile containing this point.
    ///
    /// Uses integer division, which truncates toward zero. Within stage
    /// bounds coordinates are non-negative, so this is the same as flooring.
    #[inline]
    pub const fn tile(self) -> Tile {
        Tile::new(self.x / TILE_SIZE, self.y / TILE_SIZE)
    }

    /// Whether both coordinates sit on a tile boundary.
    #[inline]
    pub const fn is_aligned(self) -> bool {
        self.x % TILE_SIZE == 0 && self.y % TILE_SIZE == 0
    }

    /// This point shifted by the given pixel offsets, clamped to the `i32`
    /// range.
    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})px", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Tile
// ---------------------------------------------------------------------------

/// A tile coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Tile {
    /// Column index.
    pub x: i32,
    /// Row index.
    pub y: i32,
}

impl Tile {
    /// Construct a tile coordinate.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The pixel coordinate of this tile's top-left corner.
    ///
    /// Tiles beyond `i32::MAX / 16` have no pixel origin; their result
    /// saturates. Use [`has_origin`](Self::has_origin) to match a point
    /// against a tile of any size.
    #[inline]
    pub const fn origin(self) -> Point {
        Point::new(
            self.x.saturating_mul(TILE_SIZE),
            self.y.saturating_mul(TILE_SIZE),
        )
    }

    /// Whether `point` is exactly this tile's top-left corner.
    #[inline]
    pub const fn has_origin(self, point: Point) -> bool {
        point.is_aligned() && point.x / TILE_SIZE == self.x && point.y / TILE_SIZE == self.y
    }
}

impl From<[i32; 2]> for Tile {
    fn from([x, y]: [i32; 2]) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_origin_scales_by_tile_size() {
        assert_eq!(Tile::new(3, 2).origin(), Point::new(48, 32));
        assert_eq!(Tile::new(-1, 0).origin(), Point::new(-16, 0));
    }

    #[test]
    fn has_origin_matches_only_the_corner() {
        let tile = Tile::new(-1, 2);
        assert!(tile.has_origin(Point::new(-16, 32)));
        assert!(!tile.has_origin(Point::new(-15, 32)));
        assert!(!tile.has_origin(Point::new(-16, 33)));
        assert!(!Tile::new(0, 0).has_origin(Point::new(-15, 0)));
    }

    #[test]
    fn tiles_past_the_pixel_range_stay_total() {
        let huge = Tile::new(200_000_000, -200_000_000);
        assert_eq!(huge.origin(), Point::new(i32::MAX, i32::MIN));
        assert!(!huge.has_origin(Point::new(-16, 0)));
        assert!(!huge.has_origin(Point::new(i32::MAX, i32::MIN)));
        assert_eq!(Point::new(i32::MAX, 0).offset(16, -16), Point::new(i32::MAX, -16));
    }

    #[test]
    fn point_tile_truncates() {
        assert_eq!(Point::new(31, 47).tile(), Tile::new(1, 2));
        assert_eq!(Point::new(0, 15).tile(), Tile::new(0, 0));
        // Truncation toward zero, not flooring.
        assert_eq!(Point::new(-15, -16).tile(), Tile::new(0, -1));
    }

    #[test]
    fn alignment_requires_both_axes() {
        assert!(Point::new(32, 16).is_aligned());
        assert!(!Point::new(33, 16).is_aligned());
        assert!(!Point::new(32, 17).is_aligned());
        assert!(Point::new(-16, 0).is_aligned());
    }
}
