//! Error types for the game core.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game core errors.
///
/// Nothing here is fatal: every error leaves the game in a well-defined
/// state that the next tick can proceed from.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Coordinate outside the grid extent. Call sites are expected to
    /// bounds-check before touching the grid, so reaching this is a
    /// programmer error rather than a gameplay outcome.
    #[error("coordinate ({x}, {z}) is outside the {width}x{height} grid")]
    OutOfBounds {
        /// X component of the offending coordinate.
        x: i32,
        /// Z component of the offending coordinate.
        z: i32,
        /// Grid width in cells.
        width: u32,
        /// Grid height in cells.
        height: u32,
    },

    /// Placement could not start: no building is selected, or the selected
    /// building costs more than the current balance.
    #[error("cannot build: {0}")]
    CannotBuild(String),

    /// The confirmed target cell was already occupied. The in-progress
    /// placement is aborted and the engine returns to idle.
    #[error("tile ({x}, {z}) is already occupied")]
    InvalidPlacement {
        /// X component of the rejected cell.
        x: i32,
        /// Z component of the rejected cell.
        z: i32,
    },

    /// A debit exceeded the coin balance. Affordability is checked before
    /// placement starts, so hitting this mid-commit signals a logic error.
    #[error("insufficient funds: need {required} coins, have {available}")]
    InsufficientFunds {
        /// Coins required by the debit.
        required: u32,
        /// Coins available at debit time.
        available: u32,
    },

    /// Reference to a building type the catalog does not know.
    #[error("unknown building type: {0}")]
    UnknownBuilding(u32),

    /// Invalid game state.
    #[error("invalid game state: {0}")]
    InvalidState(String),
}
