//! Completion rules of moving effects.

use moving_effects_core::{projection::TILE_HALF_WIDTH, TerminationReason, Tile};

/// Lifecycle states of a moving effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lifecycle {
    /// The effect is travelling.
    #[default]
    Active,
    /// The effect finished. Terminal.
    Terminated(TerminationReason),
}

/// Tracks whether an effect is still travelling and transitions it exactly once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TerminationPolicy {
    state: Lifecycle,
}

impl TerminationPolicy {
    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> Lifecycle {
        self.state
    }

    /// Reports whether the effect is still travelling.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.state, Lifecycle::Active)
    }

    /// Moves an active effect into the terminated state.
    ///
    /// Returns `false` when the effect had already terminated.
    pub fn terminate(&mut self, reason: TerminationReason) -> bool {
        match self.state {
            Lifecycle::Active => {
                self.state = Lifecycle::Terminated(reason);
                true
            }
            Lifecycle::Terminated(_) => false,
        }
    }
}

/// Duration-driven effects end once the clock reaches their end tick.
pub(crate) const fn expired(now: u64, end_tick: u64) -> bool {
    now >= end_tick
}

/// Speed-driven effects end once the target is within one tile width.
pub(crate) fn within_reach(distance: f32) -> bool {
    distance <= TILE_HALF_WIDTH
}

/// Speed-driven effects also end once they step onto the target's column and row.
pub(crate) const fn reached_target_tile(tile: Tile, target: Tile) -> bool {
    tile.same_column_and_row(target)
}
