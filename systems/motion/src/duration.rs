//! Fixed-duration interpolation toward the target.
//!
//! Every tick re-derives the remaining path and the speed needed to cover it
//! before `end_tick`, so floating-point drift does not accumulate and a moving
//! target bends the trajectory toward its latest position.

use glam::Vec3;
use moving_effects_core::{
    angle::capped_facing_angle,
    projection::{from_screen_3d, to_screen_2d, to_screen_3d, MOBILE_EYE_HEIGHT},
    TerminationReason,
};

use crate::{
    anchor::AnchorPoint,
    step::{Kinematics, Progress, StepInput},
    termination::expired,
};

/// Motion that reaches the target exactly when `end_tick` is due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DurationMotion {
    end_tick: u64,
}

impl DurationMotion {
    pub(crate) const fn new(end_tick: u64) -> Self {
        Self { end_tick }
    }

    pub(crate) fn step(&self, current: Kinematics, input: &StepInput) -> Progress {
        if expired(input.now, self.end_tick) {
            return Progress::Finished(TerminationReason::Expired);
        }

        let source = to_screen_3d(current.tile.as_ivec3(), current.offset);
        let target = target_screen(input.target);
        let path = target - source;

        let remaining = self.end_tick.saturating_sub(input.last_update_tick);
        if remaining == 0 {
            return Progress::Finished(TerminationReason::Collapsed);
        }

        let speed = path.length() / remaining as f32;
        let elapsed = input.now.saturating_sub(input.last_update_tick) as f32;
        let position = source + path.normalize_or_zero() * (speed * elapsed);
        let (tile, offset) = from_screen_3d(position);

        let viewpoint = input.viewpoint.as_ivec3();
        let source_tile = if input.source_tracks_effect {
            tile
        } else {
            input.source.tile
        };
        let facing_angle = capped_facing_angle(
            to_screen_2d(source_tile.as_ivec3() - viewpoint) + offset.truncate(),
            to_screen_2d(input.target.tile.as_ivec3() - viewpoint),
            input.frame_speed(),
        );

        Progress::Moving(Kinematics {
            tile,
            offset,
            facing_angle,
        })
    }
}

/// Entity targets carry their walking offset, and mobiles are aimed at eye height.
fn target_screen(target: AnchorPoint) -> Vec3 {
    let mut position = target.tile.as_ivec3();
    if target.mobile {
        position.z += MOBILE_EYE_HEIGHT;
    }
    to_screen_3d(position, target.offset)
}
