//! Values exchanged between an effect and its motion strategy.

use glam::Vec3;
use moving_effects_core::{TerminationReason, Tile};

use crate::anchor::AnchorPoint;

/// Position and orientation of an effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kinematics {
    /// Discrete world position.
    pub tile: Tile,
    /// Sub-tile screen offset relative to `tile`.
    pub offset: Vec3,
    /// Facing angle in radians.
    pub facing_angle: f32,
}

/// Snapshot of everything a strategy reads during one tick.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StepInput {
    pub(crate) now: u64,
    pub(crate) last_update_tick: u64,
    pub(crate) delta: f32,
    pub(crate) interval_ms: u32,
    pub(crate) viewpoint: Tile,
    pub(crate) source: AnchorPoint,
    pub(crate) target: AnchorPoint,
    /// Set when the source is a fixed point that travels with the effect.
    pub(crate) source_tracks_effect: bool,
}

impl StepInput {
    /// Screen distance an effect may cover during this frame.
    pub(crate) fn frame_speed(&self) -> f32 {
        self.interval_ms as f32 * self.delta
    }
}

/// Outcome of one strategy step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Progress {
    Moving(Kinematics),
    Finished(TerminationReason),
}
