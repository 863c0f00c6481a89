//! Facing angles of moving effects.
//!
//! Duration-driven and speed-driven motion derive their facing angle through
//! different operations and both are kept.

use glam::Vec2;

/// Facing angle used by duration-driven motion.
///
/// The displacement from `source` to `target` is normalized when it is longer
/// than `frame_speed`, the distance an effect may cover in one frame.
#[must_use]
pub fn capped_facing_angle(source: Vec2, target: Vec2, frame_speed: f32) -> f32 {
    let displacement = target - source;
    let displacement = if displacement.length() > frame_speed {
        displacement.normalize_or_zero()
    } else {
        displacement
    };
    facing(displacement)
}

/// Facing angle used by speed-driven motion, taken from the raw pre-step path.
#[must_use]
pub fn direct_facing_angle(path: Vec2) -> f32 {
    facing(path)
}

fn facing(displacement: Vec2) -> f32 {
    (-displacement.y).atan2(-displacement.x)
}
