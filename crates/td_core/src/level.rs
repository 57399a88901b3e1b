//! Level seeding and session configuration data.
//!
//! Pure data types only: the core receives the initial tile mapping and
//! bounds from a collaborator before the first tick. Parsing level files
//! into these types is handled outside this crate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::grid::{GridCoord, Tile, TileGrid};
use crate::math::Fixed;

/// Terrain classification for a seeded tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileKind {
    /// Open ground; buildings may be placed here.
    Ground,
    /// Enemy path; permanently occupied.
    Path,
    /// Wall geometry; permanently occupied.
    Wall,
}

impl TileKind {
    /// Whether tiles of this kind start occupied. Nothing can be built on
    /// the enemy path or on walls.
    #[must_use]
    pub const fn initially_occupied(self) -> bool {
        !matches!(self, TileKind::Ground)
    }
}

/// A single seeded tile in a level layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSeed {
    /// Cell column (world X).
    pub x: i32,
    /// Cell row (world Z).
    pub z: i32,
    /// Terrain kind of this cell.
    pub kind: TileKind,
}

/// Initial tile mapping and bounds for a level.
///
/// Cells not listed in `tiles` are open ground.
///
/// # Example RON
///
/// ```ron
/// LevelLayout(
///     width: 10,
///     height: 10,
///     tiles: [
///         (x: 0, z: 4, kind: Path),
///         (x: 1, z: 4, kind: Path),
///         (x: 3, z: 3, kind: Wall),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells.
    pub height: u32,
    /// Seeded tiles; everything else is open ground.
    #[serde(default)]
    pub tiles: Vec<TileSeed>,
}

impl LevelLayout {
    /// An all-ground layout of the given size.
    #[must_use]
    pub const fn open(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: Vec::new(),
        }
    }

    /// Build the tile grid this layout describes.
    #[must_use]
    pub fn build_grid(&self) -> TileGrid {
        let mut tiles = HashMap::new();
        for seed in &self.tiles {
            tiles.insert(
                GridCoord::new(seed.x, seed.z),
                Tile::new(seed.kind.initially_occupied()),
            );
        }
        TileGrid::with_tiles(self.width, self.height, tiles)
    }
}

/// Session configuration.
///
/// Plain numeric types so the struct stays friendly to hand-written config
/// files; the session converts to fixed-point at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Coins the player starts with.
    pub starting_coins: u32,
    /// Build window duration in seconds.
    pub build_duration_seconds: u32,
    /// Vertical offset applied to placed buildings.
    pub building_height_offset: f32,
}

impl GameConfig {
    /// Build window duration as a fixed-point value.
    #[must_use]
    pub fn build_duration(&self) -> Fixed {
        Fixed::from_num(self.build_duration_seconds)
    }

    /// Building height offset as a fixed-point value.
    #[must_use]
    pub fn height_offset(&self) -> Fixed {
        Fixed::from_num(self.building_height_offset)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_coins: 800,
            build_duration_seconds: 60,
            building_height_offset: -0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_seeds_grid() {
        let layout = LevelLayout {
            width: 6,
            height: 4,
            tiles: vec![
                TileSeed {
                    x: 0,
                    z: 1,
                    kind: TileKind::Path,
                },
                TileSeed {
                    x: 2,
                    z: 2,
                    kind: TileKind::Wall,
                },
                TileSeed {
                    x: 3,
                    z: 3,
                    kind: TileKind::Ground,
                },
            ],
        };

        let grid = layout.build_grid();
        assert_eq!(grid.width(), 6);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.is_occupied(GridCoord::new(0, 1)), Ok(true));
        assert_eq!(grid.is_occupied(GridCoord::new(2, 2)), Ok(true));
        assert_eq!(grid.is_occupied(GridCoord::new(3, 3)), Ok(false));
        assert_eq!(grid.is_occupied(GridCoord::new(5, 0)), Ok(false));
    }

    #[test]
    fn test_layout_parses_from_ron() {
        let source = r#"
            LevelLayout(
                width: 10,
                height: 10,
                tiles: [
                    (x: 0, z: 4, kind: Path),
                    (x: 3, z: 3, kind: Wall),
                ],
            )
        "#;

        let layout: LevelLayout = ron::from_str(source).unwrap();
        assert_eq!(layout.width, 10);
        assert_eq!(layout.tiles.len(), 2);
        assert_eq!(layout.tiles[0].kind, TileKind::Path);

        let grid = layout.build_grid();
        assert_eq!(grid.occupied_count(), 2);
    }

    #[test]
    fn test_config_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.starting_coins, 800);
        assert_eq!(config.build_duration(), Fixed::from_num(60));
        assert_eq!(config.height_offset(), Fixed::from_num(-0.5));
    }
}
