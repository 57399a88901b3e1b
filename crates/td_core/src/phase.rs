//! Gameplay phase state machine.
//!
//! Phases are mutually exclusive gameplay modes; exactly one is current at
//! all times after initialization. The machine is a dispatch table, not a
//! guarded automaton: any phase may switch to any other on request, and
//! transition legality (e.g. only the menu layer may move Start into
//! Building) is the calling layer's policy. The session applies the
//! concrete enter/exit actions for each transition.

use serde::{Deserialize, Serialize};

/// The four mutually exclusive gameplay phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Pre-game menu; no gameplay systems run.
    Start,
    /// Build window: the placement engine is reachable and the build timer
    /// counts down.
    Building,
    /// Combat: enemy systems run (outside this core); placement is closed.
    Combat,
    /// Game over screen; awaiting a restart request.
    GameOver,
}

impl Phase {
    /// All phases, in their canonical order.
    pub const ALL: [Phase; 4] = [Phase::Start, Phase::Building, Phase::Combat, Phase::GameOver];
}

/// Report of a completed phase switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTransition {
    /// Phase that was exited.
    pub exited: Phase,
    /// Phase that was entered.
    pub entered: Phase,
}

/// Owns the single current phase and dispatches per-frame ticks to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMachine {
    /// The currently active phase.
    current: Phase,
    /// Frames ticked since the current phase was entered.
    ticks_in_phase: u64,
}

impl PhaseMachine {
    /// Create a machine starting in `initial`.
    #[must_use]
    pub const fn new(initial: Phase) -> Self {
        Self {
            current: initial,
            ticks_in_phase: 0,
        }
    }

    /// The currently active phase.
    #[must_use]
    pub const fn current(&self) -> Phase {
        self.current
    }

    /// Frames ticked since the current phase was entered.
    #[must_use]
    pub const fn ticks_in_phase(&self) -> u64 {
        self.ticks_in_phase
    }

    /// Exit the current phase and enter `target`.
    ///
    /// No transition is refused; switching to the current phase exits and
    /// re-enters it. The returned report tells the caller which enter/exit
    /// actions to apply.
    pub fn switch_state(&mut self, target: Phase) -> PhaseTransition {
        let exited = self.current;
        self.current = target;
        self.ticks_in_phase = 0;
        tracing::debug!(?exited, entered = ?target, "phase switch");
        PhaseTransition {
            exited,
            entered: target,
        }
    }

    /// Advance the current phase by one frame.
    ///
    /// Returns the phase whose per-frame hook should run this frame:
    /// always exactly the current one.
    pub fn tick(&mut self) -> Phase {
        self.ticks_in_phase += 1;
        self.current
    }
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new(Phase::Start)
    }
}
