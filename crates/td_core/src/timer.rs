//! Build-phase countdown timer.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed};

/// Countdown limiting how long the build window stays open.
///
/// The timer counts down only while its host surface is active; while the
/// surface is inactive it continuously resets to the full duration.
/// `remaining` is not floored at zero: once the countdown passes zero it
/// keeps falling, and the presentation layer decides whether to clamp what
/// it shows. Use [`BuildTimer::is_expired`] to act on expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTimer {
    /// Full countdown duration in seconds.
    #[serde(with = "fixed_serde")]
    duration: Fixed,
    /// Seconds left on the countdown; may be negative.
    #[serde(with = "fixed_serde")]
    remaining: Fixed,
}

impl BuildTimer {
    /// Create a timer with a full countdown.
    #[must_use]
    pub const fn new(duration: Fixed) -> Self {
        Self {
            duration,
            remaining: duration,
        }
    }

    /// Full countdown duration in seconds.
    #[must_use]
    pub const fn duration(&self) -> Fixed {
        self.duration
    }

    /// Seconds left on the countdown; may be negative.
    #[must_use]
    pub const fn remaining(&self) -> Fixed {
        self.remaining
    }

    /// Whether the countdown has reached or passed zero.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining <= Fixed::ZERO
    }

    /// Restart the countdown from the full duration.
    pub fn reset(&mut self) {
        self.remaining = self.duration;
    }

    /// Advance the timer by `delta` seconds.
    ///
    /// Counts down while `host_surface_active`; otherwise snaps back to the
    /// full duration, so the countdown only ever runs while its surface is
    /// shown.
    pub fn tick(&mut self, delta: Fixed, host_surface_active: bool) {
        if host_surface_active {
            self.remaining -= delta;
        } else {
            self.remaining = self.duration;
        }
    }
}
