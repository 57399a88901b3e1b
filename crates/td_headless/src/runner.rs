//! Drives a scripted session tick by tick and reports the outcome.

use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};

use td_core::catalog::BuildingTypeId;
use td_core::economy::CoinsChanged;
use td_core::error::Result;
use td_core::grid::{GridCoord, TileGrid};
use td_core::level::LevelLayout;
use td_core::math::{Fixed, Vec3Fixed};
use td_core::phase::Phase;
use td_core::placement::CursorFeedback;
use td_core::session::{FrameInput, Game};

use crate::scenario::{Scenario, Step};

/// One committed placement, flattened for the JSON report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementRecord {
    /// World instance handle.
    pub instance: u64,
    /// Cell column.
    pub x: i32,
    /// Cell row.
    pub z: i32,
    /// Price paid.
    pub price: u32,
}

/// Outcome summary of a scripted run, serialized to stdout as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Scenario name.
    pub scenario: String,
    /// Total frames ticked.
    pub ticks: u64,
    /// Placements committed, in order.
    pub placements: Vec<PlacementRecord>,
    /// Confirms rejected on occupied cells.
    pub rejections: u32,
    /// Build triggers refused (no selection or unaffordable).
    pub refusals: u32,
    /// Coin balance changes observed on the notification channel.
    pub coin_changes: u32,
    /// Coin balance after the final step.
    pub final_coins: u32,
    /// Phase after the final step.
    pub final_phase: Phase,
    /// Occupied cells after the final step (level geometry included).
    pub occupied_cells: usize,
}

/// Everything a finished run leaves behind.
#[derive(Debug)]
pub struct RunOutcome {
    /// The outcome summary.
    pub report: RunReport,
    /// The finished session, for inspection or rendering.
    pub game: Game,
}

/// Cursor feedback sink that traces presentation changes instead of
/// touching materials.
#[derive(Debug, Clone, Copy, Default)]
struct TraceFeedback;

impl CursorFeedback for TraceFeedback {
    fn set_cursor_valid(&mut self, valid: bool) {
        tracing::trace!(valid, "cursor feedback");
    }
}

/// Replays a scenario against a level, one frame at a time.
#[derive(Debug)]
pub struct HeadlessRunner {
    game: Game,
    coins: Receiver<CoinsChanged>,
    scenario: Scenario,
}

impl HeadlessRunner {
    /// Build a session for the scenario: seed the grid, register the
    /// catalog, and attach the coin counter before announcing the opening
    /// balance.
    #[must_use]
    pub fn new(level: &LevelLayout, scenario: Scenario) -> Self {
        let mut game = Game::new(level, scenario.config);
        for spec in &scenario.buildings {
            game.register_building(spec.to_definition());
        }
        let coins = game.subscribe_coins();
        game.announce_coins();
        Self {
            game,
            coins,
            scenario,
        }
    }

    /// Execute every step and produce the run outcome.
    ///
    /// # Errors
    ///
    /// Propagates core logic errors; scripted scenarios are not expected
    /// to trigger any.
    pub fn run(mut self) -> Result<RunOutcome> {
        let mut feedback = TraceFeedback;
        let mut report = RunReport {
            scenario: self.scenario.name.clone(),
            ticks: 0,
            placements: Vec::new(),
            rejections: 0,
            refusals: 0,
            coin_changes: 0,
            final_coins: 0,
            final_phase: self.game.phase(),
            occupied_cells: 0,
        };

        for step in &self.scenario.steps {
            match step {
                Step::SwitchPhase(target) => {
                    let transition = self.game.switch_phase(*target);
                    tracing::info!(
                        exited = ?transition.exited,
                        entered = ?transition.entered,
                        "phase switch"
                    );
                }
                Step::Select(id) => {
                    if let Err(error) = self.game.select_building(BuildingTypeId::new(*id)) {
                        tracing::warn!(%error, "selection failed");
                    }
                }
                Step::ClearSelection => self.game.clear_selection(),
                Step::Credit(amount) => self.game.credit_coins(*amount),
                Step::Frames {
                    count,
                    pointer,
                    build,
                    confirm,
                    timer_surface,
                    delta,
                } => {
                    let pointer = Vec3Fixed::new(
                        Fixed::from_num(pointer.0),
                        Fixed::from_num(pointer.1),
                        Fixed::from_num(pointer.2),
                    );
                    for i in 0..*count {
                        let input = FrameInput {
                            delta: Fixed::from_num(*delta),
                            pointer,
                            build_pressed: *build && i == 0,
                            confirm_pressed: *confirm && i == 0,
                            timer_surface_active: *timer_surface,
                        };
                        let events = self.game.tick(input, &mut feedback)?;
                        report.ticks += 1;

                        if let Some(placement) = events.committed {
                            tracing::info!(
                                instance = placement.instance,
                                x = placement.coord.x,
                                z = placement.coord.z,
                                price = placement.price,
                                "placement committed"
                            );
                            report.placements.push(PlacementRecord {
                                instance: placement.instance,
                                x: placement.coord.x,
                                z: placement.coord.z,
                                price: placement.price,
                            });
                        }
                        if events.rejected_at.is_some() {
                            report.rejections += 1;
                        }
                        if events.refusal.is_some() {
                            report.refusals += 1;
                        }
                    }
                }
            }
        }

        for change in self.coins.try_iter() {
            tracing::info!(balance = change.balance, "coins changed");
            report.coin_changes += 1;
        }
        report.final_coins = self.game.coins();
        report.final_phase = self.game.phase();
        report.occupied_cells = self.game.grid().occupied_count();

        Ok(RunOutcome {
            report,
            game: self.game,
        })
    }
}

/// Render grid occupancy as ASCII, one row per cell row, `#` for occupied
/// cells and `.` for open ground. Rows are printed with `z` increasing
/// downward.
#[must_use]
pub fn render_grid(grid: &TileGrid) -> String {
    let mut out = String::new();
    for z in 0..grid.height() {
        for x in 0..grid.width() {
            let occupied = grid
                .is_occupied(GridCoord::new(x as i32, z as i32))
                .unwrap_or(false);
            out.push(if occupied { '#' } else { '.' });
        }
        out.push('\n');
    }
    out
}
