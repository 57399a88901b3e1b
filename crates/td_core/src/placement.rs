//! Building placement engine: pointer-driven cursor, validation, and
//! atomic commit.
//!
//! The engine is a two-state machine (idle / placing). While placing it owns
//! exactly one transient cursor tracking the candidate cell under the
//! pointer. Confirming either commits the placement as one transaction
//! (occupy tile, create and register the world instance, anchor the attack
//! behavior, record the commit, debit the price) or rejects it with no
//! mutation at all.
//!
//! Grid and economy handles are passed per call rather than fetched from
//! ambient globals, so the session stays the single writer of shared state.

use serde::{Deserialize, Serialize};

use crate::catalog::{BuildingDefinition, InstanceId};
use crate::economy::Economy;
use crate::error::{GameError, Result};
use crate::grid::{GridCoord, TileGrid};
use crate::math::{fixed_serde, Fixed, Vec3Fixed};

/// Transient placement preview tracking a candidate cell.
///
/// Exactly one cursor exists while a placement is in progress; it is
/// destroyed on commit, on rejection, and on external cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementCursor {
    /// Cell the cursor currently hovers.
    pub grid_position: GridCoord,
    /// Whether committing at `grid_position` would succeed.
    pub valid: bool,
}

/// Engine state. The cursor and the selection snapshot live only inside
/// the placing state, so neither can outlive a placement attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum PlacementState {
    /// No placement in progress.
    Idle,
    /// A placement is in progress.
    Placing {
        /// The active cursor.
        cursor: PlacementCursor,
        /// Selection captured when placement started.
        selection: BuildingDefinition,
    },
}

/// Record of a successful placement commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedPlacement {
    /// Handle of the world instance created for the building.
    pub instance: InstanceId,
    /// The definition that was placed, with its attack behavior anchored to
    /// `instance`.
    pub building: BuildingDefinition,
    /// Price paid for the placement.
    pub price: u32,
    /// Cell the building occupies.
    pub coord: GridCoord,
    /// World position of the placed instance.
    pub world_position: Vec3Fixed,
}

/// External registry of buildings placed in the current session.
///
/// Called exactly once each per successful commit.
pub trait BuildingRoster {
    /// Record the catalog definition used by a commit.
    fn add_building(&mut self, definition: &BuildingDefinition);
    /// Record the world instance created by a commit.
    fn add_placed_object(&mut self, placement: &CommittedPlacement);
}

/// In-memory roster used by the session and by tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionRoster {
    /// Definitions recorded per commit, in commit order.
    pub buildings: Vec<BuildingDefinition>,
    /// Placed instances, in commit order.
    pub placed: Vec<CommittedPlacement>,
}

impl SessionRoster {
    /// Create an empty roster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of placed instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.placed.len()
    }

    /// Check if nothing has been placed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }
}

impl BuildingRoster for SessionRoster {
    fn add_building(&mut self, definition: &BuildingDefinition) {
        self.buildings.push(definition.clone());
    }

    fn add_placed_object(&mut self, placement: &CommittedPlacement) {
        self.placed.push(placement.clone());
    }
}

/// External visual feedback for the placement cursor.
///
/// The core decides which of the two presentations applies; applying it
/// (materials, tinting, highlights) is the rendering layer's concern and
/// its success is not part of the core contract.
pub trait CursorFeedback {
    /// Apply the valid or invalid cursor presentation.
    fn set_cursor_valid(&mut self, valid: bool);
}

/// Feedback sink that discards all cursor updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFeedback;

impl CursorFeedback for NoFeedback {
    fn set_cursor_valid(&mut self, _valid: bool) {}
}

/// Pointer-driven building placement engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementEngine {
    /// Current engine state.
    state: PlacementState,
    /// Most recent successful commit, for external observers.
    latest: Option<CommittedPlacement>,
    /// Vertical offset applied to placed instances; buildings sit slightly
    /// below ground level.
    #[serde(with = "fixed_serde")]
    height_offset: Fixed,
    /// Next world instance handle to assign.
    next_instance: InstanceId,
}

impl PlacementEngine {
    /// Create an idle engine.
    #[must_use]
    pub fn new(height_offset: Fixed) -> Self {
        Self {
            state: PlacementState::Idle,
            latest: None,
            height_offset,
            next_instance: 1,
        }
    }

    /// Whether a placement is in progress.
    #[must_use]
    pub fn is_placing(&self) -> bool {
        matches!(self.state, PlacementState::Placing { .. })
    }

    /// The active cursor, if a placement is in progress.
    #[must_use]
    pub fn cursor(&self) -> Option<&PlacementCursor> {
        match &self.state {
            PlacementState::Placing { cursor, .. } => Some(cursor),
            PlacementState::Idle => None,
        }
    }

    /// The most recent successful commit, if any.
    #[must_use]
    pub fn latest_commit(&self) -> Option<&CommittedPlacement> {
        self.latest.as_ref()
    }

    /// Enter placement mode with the given selection.
    ///
    /// A no-op while a placement is already in progress. The cursor spawns
    /// at the cell under the pointer (truncated to integer coordinates).
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CannotBuild`] when `selection` is `None` or the
    /// price exceeds the balance; the engine stays idle and nothing else
    /// changes.
    pub fn begin_placement(
        &mut self,
        selection: Option<&BuildingDefinition>,
        economy: &Economy,
        pointer: Vec3Fixed,
        grid: &TileGrid,
    ) -> Result<()> {
        if self.is_placing() {
            return Ok(());
        }

        let Some(definition) = selection else {
            return Err(GameError::CannotBuild(
                "no building is selected".to_owned(),
            ));
        };
        if !economy.can_afford(definition.price) {
            return Err(GameError::CannotBuild(format!(
                "price {} exceeds the {} coin balance",
                definition.price,
                economy.balance()
            )));
        }

        let coord = GridCoord::from_world(pointer);
        let valid = grid.in_bounds(coord) && !grid.is_occupied(coord)?;
        self.state = PlacementState::Placing {
            cursor: PlacementCursor {
                grid_position: coord,
                valid,
            },
            selection: definition.clone(),
        };
        tracing::debug!(
            building = definition.id.0,
            x = coord.x,
            z = coord.z,
            "placement started"
        );
        Ok(())
    }

    /// Per-frame cursor update while placing.
    ///
    /// Converts the pointer position to a cell by truncating its X and Z
    /// components toward zero (height is ignored). The cursor moves and its
    /// validity is recomputed from occupancy only when the cell lies inside
    /// the grid; outside, the cursor keeps its last in-bounds cell and
    /// validity. Returns the cursor after the update, or `None` while idle.
    ///
    /// # Errors
    ///
    /// Propagates grid errors; unreachable in practice because occupancy is
    /// only read for in-bounds cells.
    pub fn tick(
        &mut self,
        pointer: Vec3Fixed,
        grid: &TileGrid,
        feedback: &mut dyn CursorFeedback,
    ) -> Result<Option<PlacementCursor>> {
        let PlacementState::Placing { cursor, .. } = &mut self.state else {
            return Ok(None);
        };

        let coord = GridCoord::from_world(pointer);
        if grid.in_bounds(coord) {
            cursor.grid_position = coord;
            cursor.valid = !grid.is_occupied(coord)?;
            feedback.set_cursor_valid(cursor.valid);
        }
        Ok(Some(*cursor))
    }

    /// Confirm the placement at the cursor's cell.
    ///
    /// On an occupied (or never-in-bounds) target this is the rejection
    /// path: the cursor is destroyed, the engine returns to idle, and no
    /// grid or economy state is touched. Otherwise the commit runs as one
    /// transaction: occupy the tile, create the world instance at
    /// `(x, height_offset, z)`, register it with the roster, anchor the
    /// attack behavior to it, record the commit as latest, and debit the
    /// price. Returns the commit record, or `None` when called while idle.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidPlacement`] on the rejection path.
    /// [`GameError::InsufficientFunds`] from the final debit is propagated
    /// defensively but unreachable: affordability was checked when the
    /// placement started and no other writer touches the balance mid-tick.
    pub fn confirm(
        &mut self,
        grid: &mut TileGrid,
        economy: &mut Economy,
        roster: &mut dyn BuildingRoster,
    ) -> Result<Option<CommittedPlacement>> {
        // Leaving placing state up front destroys the cursor and drops the
        // selection snapshot on every path out of this function.
        let state = std::mem::replace(&mut self.state, PlacementState::Idle);
        let PlacementState::Placing { cursor, selection } = state else {
            return Ok(None);
        };

        let coord = cursor.grid_position;
        if !grid.in_bounds(coord) || grid.is_occupied(coord)? {
            tracing::warn!(x = coord.x, z = coord.z, "placement rejected: cell unavailable");
            return Err(GameError::InvalidPlacement {
                x: coord.x,
                z: coord.z,
            });
        }

        grid.set_occupied(coord, true)?;

        let instance = self.next_instance;
        self.next_instance += 1;

        let mut building = selection;
        building.attack.bind_anchor(instance);
        let price = building.price;
        let world_position = Vec3Fixed::new(
            Fixed::from_num(coord.x),
            self.height_offset,
            Fixed::from_num(coord.z),
        );
        let placement = CommittedPlacement {
            instance,
            building,
            price,
            coord,
            world_position,
        };

        roster.add_building(&placement.building);
        roster.add_placed_object(&placement);
        self.latest = Some(placement.clone());

        economy.debit(price)?;

        tracing::debug!(instance, x = coord.x, z = coord.z, price, "placement committed");
        Ok(Some(placement))
    }

    /// Abandon any in-progress placement.
    ///
    /// Destroys the cursor with no grid or economy residue; used by
    /// external exits such as leaving the building phase.
    pub fn cancel(&mut self) {
        if self.is_placing() {
            self.state = PlacementState::Idle;
            tracing::debug!("placement cancelled");
        }
    }
}
