//! Per-frame session orchestration.
//!
//! [`Game`] owns every core component (grid, economy, catalog, placement
//! engine, phase machine, build timer) and advances them once per
//! frame in a fixed order: phase dispatch, placement engine, input edges,
//! build timer. All mutation of shared state runs on this single tick
//! path, so grid occupancy, the coin balance, and the placement cursor
//! never see concurrent writers; hosts embedding this core in a threaded
//! runtime must keep one task driving [`Game::tick`] rather than mutating
//! components in parallel.
//!
//! # Example
//!
//! ```
//! use td_core::catalog::{BuildingDefinition, BuildingTypeId, PrefabId};
//! use td_core::level::{GameConfig, LevelLayout};
//! use td_core::math::{Fixed, Vec3Fixed};
//! use td_core::phase::Phase;
//! use td_core::placement::NoFeedback;
//! use td_core::session::{FrameInput, Game};
//!
//! let mut game = Game::new(&LevelLayout::open(10, 10), GameConfig::default());
//! game.register_building(BuildingDefinition::new(
//!     BuildingTypeId::new(1),
//!     "watchtower",
//!     100,
//!     PrefabId::new(1),
//!     0,
//! ));
//! game.select_building(BuildingTypeId::new(1)).unwrap();
//! game.switch_phase(Phase::Building);
//!
//! game.begin_placement(Vec3Fixed::on_ground(Fixed::from_num(3), Fixed::from_num(4)))
//!     .unwrap();
//! let events = game
//!     .tick(FrameInput::idle(Fixed::from_num(0.016)), &mut NoFeedback)
//!     .unwrap();
//! assert_eq!(events.phase, Phase::Building);
//! ```

use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};

use crate::catalog::{BuildingCatalog, BuildingDefinition, BuildingTypeId};
use crate::economy::{CoinsChanged, Economy};
use crate::error::{GameError, Result};
use crate::grid::{GridCoord, TileGrid};
use crate::level::{GameConfig, LevelLayout};
use crate::math::{Fixed, Vec3Fixed};
use crate::phase::{Phase, PhaseMachine, PhaseTransition};
use crate::placement::{
    CommittedPlacement, CursorFeedback, PlacementCursor, PlacementEngine, SessionRoster,
};
use crate::timer::BuildTimer;

/// Input snapshot for one frame, supplied by the platform layer.
///
/// `build_pressed` and `confirm_pressed` are discrete edges: true only on
/// the frame the control was pressed, never while held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInput {
    /// Seconds elapsed since the previous frame.
    pub delta: Fixed,
    /// Pointer position in world space.
    pub pointer: Vec3Fixed,
    /// True only on the frame the build-mode control was pressed.
    pub build_pressed: bool,
    /// True only on the frame the confirm control was pressed.
    pub confirm_pressed: bool,
    /// Whether the build-timer surface is currently shown.
    pub timer_surface_active: bool,
}

impl FrameInput {
    /// A frame with no input activity.
    #[must_use]
    pub const fn idle(delta: Fixed) -> Self {
        Self {
            delta,
            pointer: Vec3Fixed::ZERO,
            build_pressed: false,
            confirm_pressed: false,
            timer_surface_active: false,
        }
    }

    /// Set the pointer position.
    #[must_use]
    pub const fn with_pointer(mut self, pointer: Vec3Fixed) -> Self {
        self.pointer = pointer;
        self
    }

    /// Mark the build control as pressed this frame.
    #[must_use]
    pub const fn with_build_pressed(mut self) -> Self {
        self.build_pressed = true;
        self
    }

    /// Mark the confirm control as pressed this frame.
    #[must_use]
    pub const fn with_confirm_pressed(mut self) -> Self {
        self.confirm_pressed = true;
        self
    }

    /// Set whether the build-timer surface is shown.
    #[must_use]
    pub const fn with_timer_surface(mut self, active: bool) -> Self {
        self.timer_surface_active = active;
        self
    }
}

/// Events generated during one frame.
///
/// The host layer uses these to trigger effects, sounds, and UI updates.
#[derive(Debug, Clone, PartialEq)]
pub struct TickEvents {
    /// The phase whose per-frame hook ran this frame.
    pub phase: Phase,
    /// Placement cursor state after the frame, if a placement is active.
    pub cursor: Option<PlacementCursor>,
    /// Placement committed this frame, if any.
    pub committed: Option<CommittedPlacement>,
    /// Cell of a placement rejected this frame, if any.
    pub rejected_at: Option<GridCoord>,
    /// Reason a build request was refused this frame, if any.
    pub refusal: Option<String>,
    /// Build timer countdown after the frame.
    pub build_time_remaining: Fixed,
}

/// The game session: all core components under one per-frame driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    /// Phase state machine.
    phases: PhaseMachine,
    /// Tile occupancy grid.
    grid: TileGrid,
    /// Coin economy.
    economy: Economy,
    /// Building definitions and the build-menu selection.
    catalog: BuildingCatalog,
    /// Placement engine.
    engine: PlacementEngine,
    /// Build window countdown.
    timer: BuildTimer,
    /// Roster of placed buildings.
    roster: SessionRoster,
}

impl Game {
    /// Create a session from a level layout and configuration.
    ///
    /// The session starts in [`Phase::Start`] with an empty catalog.
    #[must_use]
    pub fn new(layout: &LevelLayout, config: GameConfig) -> Self {
        Self {
            phases: PhaseMachine::new(Phase::Start),
            grid: layout.build_grid(),
            economy: Economy::new(config.starting_coins),
            catalog: BuildingCatalog::new(),
            engine: PlacementEngine::new(config.height_offset()),
            timer: BuildTimer::new(config.build_duration()),
            roster: SessionRoster::new(),
        }
    }

    /// The currently active phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phases.current()
    }

    /// The tile grid.
    #[must_use]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Current coin balance.
    #[must_use]
    pub fn coins(&self) -> u32 {
        self.economy.balance()
    }

    /// Grant coins from an external income source.
    pub fn credit_coins(&mut self, amount: u32) {
        self.economy.credit(amount);
    }

    /// Subscribe to coin balance changes. Drop the receiver to unsubscribe.
    pub fn subscribe_coins(&mut self) -> Receiver<CoinsChanged> {
        self.economy.subscribe()
    }

    /// Re-announce the current balance to subscribers, e.g. at session
    /// start so a freshly attached counter renders the opening balance.
    pub fn announce_coins(&mut self) {
        self.economy.announce();
    }

    /// Register a building definition with the catalog.
    pub fn register_building(&mut self, definition: BuildingDefinition) {
        self.catalog.register(definition);
    }

    /// Select a building for placement.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::UnknownBuilding`] for an unregistered ID.
    pub fn select_building(&mut self, id: BuildingTypeId) -> Result<()> {
        self.catalog.select(id)
    }

    /// Clear the build-menu selection.
    pub fn clear_selection(&mut self) {
        self.catalog.clear_selection();
    }

    /// The building catalog.
    #[must_use]
    pub fn catalog(&self) -> &BuildingCatalog {
        &self.catalog
    }

    /// Whether a placement is in progress.
    #[must_use]
    pub fn is_placing(&self) -> bool {
        self.engine.is_placing()
    }

    /// The active placement cursor, if any.
    #[must_use]
    pub fn placement_cursor(&self) -> Option<&PlacementCursor> {
        self.engine.cursor()
    }

    /// The most recent successful placement, if any.
    #[must_use]
    pub fn latest_commit(&self) -> Option<&CommittedPlacement> {
        self.engine.latest_commit()
    }

    /// The roster of buildings placed this session.
    #[must_use]
    pub fn roster(&self) -> &SessionRoster {
        &self.roster
    }

    /// The build window countdown.
    #[must_use]
    pub fn build_timer(&self) -> &BuildTimer {
        &self.timer
    }

    /// Request a phase switch and apply the enter/exit actions.
    ///
    /// No transition is refused here; legality is the calling layer's
    /// policy. Leaving the building phase abandons any in-progress
    /// placement with no grid or economy residue, and entering it restarts
    /// the build timer.
    pub fn switch_phase(&mut self, target: Phase) -> PhaseTransition {
        let transition = self.phases.switch_state(target);
        if transition.exited == Phase::Building {
            self.engine.cancel();
        }
        if transition.entered == Phase::Building {
            self.timer.reset();
        }
        transition
    }

    /// Enter placement mode for the current selection.
    ///
    /// The trigger is only wired up during the building phase; requests in
    /// any other phase are ignored. A no-op while already placing.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::CannotBuild`] when nothing is selected or the
    /// selection is unaffordable.
    pub fn begin_placement(&mut self, pointer: Vec3Fixed) -> Result<()> {
        if self.phases.current() != Phase::Building {
            tracing::debug!(
                phase = ?self.phases.current(),
                "build trigger ignored outside the build window"
            );
            return Ok(());
        }
        self.engine.begin_placement(
            self.catalog.selected_building(),
            &self.economy,
            pointer,
            &self.grid,
        )
    }

    /// Advance the session by one frame.
    ///
    /// Components run in a fixed order every frame: the phase machine
    /// dispatches exactly one phase hook, the placement engine updates its
    /// cursor from the pointer, input edges are handled (build trigger,
    /// then confirm), and finally the build timer advances. The timer only
    /// counts down while the building phase is active and its surface is
    /// shown.
    ///
    /// User-visible outcomes (a refused build request, a rejected
    /// placement) are reported through [`TickEvents`] rather than as
    /// errors; the frame always completes.
    ///
    /// # Errors
    ///
    /// Only genuine logic errors surface here; none are reachable during
    /// normal play.
    pub fn tick(
        &mut self,
        input: FrameInput,
        feedback: &mut dyn CursorFeedback,
    ) -> Result<TickEvents> {
        // 1. Phase dispatch: exactly one phase hook runs per frame.
        let phase = self.phases.tick();

        // 2. Placement engine cursor update (a no-op while idle).
        let _ = self.engine.tick(input.pointer, &self.grid, feedback)?;

        // 3. Input edges, routed by the active phase.
        let mut committed = None;
        let mut rejected_at = None;
        let mut refusal = None;
        match phase {
            Phase::Building => {
                if input.build_pressed {
                    match self.begin_placement(input.pointer) {
                        Ok(()) => {}
                        Err(GameError::CannotBuild(reason)) => {
                            tracing::warn!(%reason, "cannot build");
                            refusal = Some(reason);
                        }
                        Err(other) => return Err(other),
                    }
                }
                if input.confirm_pressed {
                    match self
                        .engine
                        .confirm(&mut self.grid, &mut self.economy, &mut self.roster)
                    {
                        Ok(Some(placement)) => {
                            self.catalog.clear_selection();
                            committed = Some(placement);
                        }
                        Ok(None) => {}
                        Err(GameError::InvalidPlacement { x, z }) => {
                            self.catalog.clear_selection();
                            rejected_at = Some(GridCoord::new(x, z));
                        }
                        Err(other) => return Err(other),
                    }
                }
            }
            Phase::Start | Phase::Combat | Phase::GameOver => {
                // Placement input is only wired up during the build window.
                // Combat-phase systems (enemies, waves) live outside this core.
            }
        }

        // 4. Build timer.
        self.timer.tick(
            input.delta,
            input.timer_surface_active && phase == Phase::Building,
        );

        Ok(TickEvents {
            phase,
            cursor: self.engine.cursor().copied(),
            committed,
            rejected_at,
            refusal,
            build_time_remaining: self.timer.remaining(),
        })
    }

    /// Serialize the session state for saves or replay.
    ///
    /// Notification subscriptions are transient and excluded; observers
    /// re-subscribe after a restore.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("failed to serialize session: {e}")))
    }

    /// Restore a session from serialized bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data)
            .map_err(|e| GameError::InvalidState(format!("failed to deserialize session: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PrefabId;
    use crate::placement::NoFeedback;

    fn session() -> Game {
        let mut game = Game::new(&LevelLayout::open(10, 10), GameConfig::default());
        game.register_building(BuildingDefinition::new(
            BuildingTypeId::new(1),
            "watchtower",
            100,
            PrefabId::new(1),
            0,
        ));
        game
    }

    #[test]
    fn test_session_starts_in_start_phase() {
        let game = session();
        assert_eq!(game.phase(), Phase::Start);
        assert_eq!(game.coins(), 800);
        assert!(!game.is_placing());
    }

    #[test]
    fn test_entering_building_resets_timer() {
        let mut game = session();
        game.switch_phase(Phase::Building);

        // Burn some of the countdown.
        for _ in 0..5 {
            game.tick(
                FrameInput::idle(Fixed::from_num(1)).with_timer_surface(true),
                &mut NoFeedback,
            )
            .unwrap();
        }
        assert_eq!(game.build_timer().remaining(), Fixed::from_num(55));

        game.switch_phase(Phase::Combat);
        game.switch_phase(Phase::Building);
        assert_eq!(game.build_timer().remaining(), Fixed::from_num(60));
    }

    #[test]
    fn test_leaving_building_cancels_placement() {
        let mut game = session();
        game.switch_phase(Phase::Building);
        game.select_building(BuildingTypeId::new(1)).unwrap();
        game.begin_placement(Vec3Fixed::on_ground(
            Fixed::from_num(3),
            Fixed::from_num(4),
        ))
        .unwrap();
        assert!(game.is_placing());

        game.switch_phase(Phase::Combat);
        assert!(!game.is_placing());
        assert_eq!(game.coins(), 800);
        assert_eq!(game.grid().occupied_count(), 0);
    }

    #[test]
    fn test_build_trigger_ignored_outside_building_phase() {
        let mut game = session();
        game.select_building(BuildingTypeId::new(1)).unwrap();

        for phase in [Phase::Start, Phase::Combat, Phase::GameOver] {
            game.switch_phase(phase);
            game.begin_placement(Vec3Fixed::ZERO).unwrap();
            assert!(!game.is_placing());
        }
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut game = session();
        game.switch_phase(Phase::Building);
        game.select_building(BuildingTypeId::new(1)).unwrap();
        game.begin_placement(Vec3Fixed::on_ground(
            Fixed::from_num(2),
            Fixed::from_num(2),
        ))
        .unwrap();
        game.tick(
            FrameInput::idle(Fixed::from_num(1))
                .with_pointer(Vec3Fixed::on_ground(
                    Fixed::from_num(2),
                    Fixed::from_num(2),
                ))
                .with_confirm_pressed()
                .with_timer_surface(true),
            &mut NoFeedback,
        )
        .unwrap();

        let bytes = game.serialize().unwrap();
        let restored = Game::deserialize(&bytes).unwrap();

        assert_eq!(restored.phase(), Phase::Building);
        assert_eq!(restored.coins(), 700);
        assert_eq!(
            restored.grid().is_occupied(GridCoord::new(2, 2)),
            Ok(true)
        );
        assert_eq!(restored.roster().len(), 1);
        assert_eq!(
            restored.build_timer().remaining(),
            game.build_timer().remaining()
        );
    }
}
