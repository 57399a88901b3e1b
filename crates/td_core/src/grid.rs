//! Tile grid: coordinate-to-occupancy mapping with level bounds.
//!
//! The grid owns no placement logic; it is a bounds-checked store that the
//! placement engine reads and mutates. Tiles are seeded from level data
//! before the first tick, and in-bounds coordinates without a seeded entry
//! read as unoccupied.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::{truncate_toward_zero, Vec3Fixed};

/// Integer coordinate of a cell on the build plane.
///
/// The grid is 2D embedded in 3D world space: `x` maps to world X and `z`
/// to world Z. World Y (height) never participates in grid addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    /// Cell column (world X).
    pub x: i32,
    /// Cell row (world Z).
    pub z: i32,
}

impl GridCoord {
    /// Create a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Grid coordinate under a world-space position.
    ///
    /// X and Z truncate toward zero (an integer cast); the height component
    /// is ignored. The result may lie outside any particular grid's bounds.
    #[must_use]
    pub fn from_world(pos: Vec3Fixed) -> Self {
        Self {
            x: truncate_toward_zero(pos.x),
            z: truncate_toward_zero(pos.z),
        }
    }
}

/// A single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    /// Whether a building or level geometry occupies this cell.
    pub occupied: bool,
}

impl Tile {
    /// Create a tile with the given occupancy.
    #[must_use]
    pub const fn new(occupied: bool) -> Self {
        Self { occupied }
    }
}

/// Grid of tiles covering `[0, width) x [0, height)` cells.
///
/// Storage is a coordinate map rather than a dense array because levels
/// seed a sparse mapping; anything in bounds but unseeded is unoccupied
/// ground.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    /// Grid width in cells (world X extent).
    width: u32,
    /// Grid height in cells (world Z extent).
    height: u32,
    /// Seeded and mutated tiles.
    tiles: HashMap<GridCoord, Tile>,
}

impl TileGrid {
    /// Create a grid with every cell unoccupied.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0, "TileGrid width must be positive");
        assert!(height > 0, "TileGrid height must be positive");
        Self {
            width,
            height,
            tiles: HashMap::new(),
        }
    }

    /// Create a grid from a pre-seeded tile mapping.
    ///
    /// Out-of-bounds seeds are dropped with a warning rather than kept as
    /// unreachable entries.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero.
    #[must_use]
    pub fn with_tiles(width: u32, height: u32, tiles: HashMap<GridCoord, Tile>) -> Self {
        let mut grid = Self::new(width, height);
        for (coord, tile) in tiles {
            if grid.in_bounds(coord) {
                grid.tiles.insert(coord, tile);
            } else {
                tracing::warn!(
                    x = coord.x,
                    z = coord.z,
                    "dropping level tile outside grid bounds"
                );
            }
        }
        grid
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Check whether a coordinate lies within the grid extent.
    #[must_use]
    pub fn in_bounds(&self, coord: GridCoord) -> bool {
        coord.x >= 0
            && coord.z >= 0
            && (coord.x as u32) < self.width
            && (coord.z as u32) < self.height
    }

    fn check_bounds(&self, coord: GridCoord) -> Result<()> {
        if self.in_bounds(coord) {
            Ok(())
        } else {
            Err(GameError::OutOfBounds {
                x: coord.x,
                z: coord.z,
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Occupancy at a coordinate.
    ///
    /// Unseeded in-bounds cells read as unoccupied.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::OutOfBounds`] outside the grid extent.
    pub fn is_occupied(&self, coord: GridCoord) -> Result<bool> {
        self.check_bounds(coord)?;
        Ok(self.tiles.get(&coord).is_some_and(|tile| tile.occupied))
    }

    /// Set occupancy at a coordinate. Idempotent; this is the sole mutator
    /// of tile state.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::OutOfBounds`] outside the grid extent.
    pub fn set_occupied(&mut self, coord: GridCoord, occupied: bool) -> Result<()> {
        self.check_bounds(coord)?;
        self.tiles.entry(coord).or_default().occupied = occupied;
        Ok(())
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.tiles.values().filter(|tile| tile.occupied).count()
    }

    /// Iterate over the coordinates of all occupied cells.
    pub fn iter_occupied(&self) -> impl Iterator<Item = GridCoord> + '_ {
        self.tiles
            .iter()
            .filter(|(_, tile)| tile.occupied)
            .map(|(coord, _)| *coord)
    }
}
