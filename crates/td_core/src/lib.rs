//! # TD Core
//!
//! Deterministic game core for a grid-based tower-defense game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No floating-point math in simulation state (uses fixed-point)
//!
//! The core pairs a phase-driven state machine with a tile-grid building
//! placement engine and a coin economy. A single external driver advances
//! everything once per frame through [`session::Game::tick`]; rendering,
//! input polling, asset loading, and enemy systems live outside this crate
//! and connect through the collaborator traits at the module seams.
//!
//! ## Crate Structure
//!
//! - [`grid`] - Tile occupancy grid with level bounds
//! - [`economy`] - Coin balance and change notifications
//! - [`catalog`] - Building definitions and the build-menu selection
//! - [`placement`] - Pointer-driven placement engine
//! - [`phase`] - Gameplay phase state machine
//! - [`timer`] - Build window countdown
//! - [`level`] - Level seeding and configuration data
//! - [`session`] - Per-frame orchestration
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod catalog;
pub mod economy;
pub mod error;
pub mod grid;
pub mod level;
pub mod math;
pub mod phase;
pub mod placement;
pub mod session;
pub mod timer;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::catalog::{
        AttackBehavior, BuildingCatalog, BuildingDefinition, BuildingTypeId, InstanceId, PrefabId,
    };
    pub use crate::economy::{CoinsChanged, Economy};
    pub use crate::error::{GameError, Result};
    pub use crate::grid::{GridCoord, Tile, TileGrid};
    pub use crate::level::{GameConfig, LevelLayout, TileKind, TileSeed};
    pub use crate::math::{Fixed, Vec3Fixed};
    pub use crate::phase::{Phase, PhaseMachine, PhaseTransition};
    pub use crate::placement::{
        BuildingRoster, CommittedPlacement, CursorFeedback, NoFeedback, PlacementCursor,
        PlacementEngine, SessionRoster,
    };
    pub use crate::session::{FrameInput, Game, TickEvents};
    pub use crate::timer::BuildTimer;
}
