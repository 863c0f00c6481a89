//! Constant-speed travel on the isometric screen.

use moving_effects_core::{
    angle::direct_facing_angle,
    projection::{diamond_decompose, screen_to_monitor, to_screen_2d},
    TerminationReason, Tile,
};

use crate::{
    step::{Kinematics, Progress, StepInput},
    termination::{reached_target_tile, within_reach},
};

/// Motion that advances a fixed screen distance per frame until the target
/// tile is reached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct SpeedMotion;

impl SpeedMotion {
    pub(crate) fn step(&self, current: Kinematics, input: &StepInput) -> Progress {
        let viewpoint = input.viewpoint.as_ivec3();
        let source_tile = input.source.tile.as_ivec3();
        let source_delta = source_tile - viewpoint;
        let source = to_screen_2d(source_delta) + current.offset.truncate();
        let target = to_screen_2d(input.target.tile.as_ivec3() - viewpoint);

        let path = target - source;
        let distance = path.length();
        let frame_speed = input.frame_speed();
        // Never overshoot: the last step lands exactly on the target.
        let step = if distance > frame_speed {
            path / distance * frame_speed
        } else {
            path
        };

        if within_reach(distance) {
            return Progress::Finished(TerminationReason::WithinReach);
        }

        let monitor = screen_to_monitor(source);
        let delta = diamond_decompose(monitor.x, monitor.y);
        let reached = viewpoint.truncate() + delta;
        let reached_tile = Tile::from_ivec3(reached.extend(source_tile.z));

        if reached_target_tile(reached_tile, input.target.tile) {
            return Progress::Finished(TerminationReason::TargetTileReached);
        }

        let mut next = Kinematics {
            tile: input.source.tile,
            offset: current.offset,
            facing_angle: direct_facing_angle(path),
        };

        if reached != source_tile.truncate() {
            // Re-express the screen point relative to the newly entered tile.
            let residual = source - to_screen_2d(delta.extend(source_delta.z));
            next.tile = reached_tile;
            next.offset.x = residual.x;
            next.offset.y = residual.y;
        }

        next.offset += step.extend(0.0);
        Progress::Moving(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::AnchorPoint;
    use glam::Vec3;
    use moving_effects_core::projection::SPAWN_OFFSET;

    const VIEWPOINT: Tile = Tile::new(1_000, 1_000, 0);
    const EPSILON: f32 = 1e-3;

    fn input(source: Tile, target: Tile) -> StepInput {
        StepInput {
            now: 0,
            last_update_tick: 0,
            delta: 1.0,
            interval_ms: 200,
            viewpoint: VIEWPOINT,
            source: AnchorPoint::fixed(source),
            target: AnchorPoint::fixed(target),
            source_tracks_effect: false,
        }
    }

    fn launched(tile: Tile, offset: Vec3) -> Kinematics {
        Kinematics {
            tile,
            offset,
            facing_angle: 0.0,
        }
    }

    fn moved(progress: Progress) -> Kinematics {
        match progress {
            Progress::Moving(kinematics) => kinematics,
            Progress::Finished(reason) => panic!("effect finished early: {reason:?}"),
        }
    }

    #[test]
    fn first_frame_advances_by_frame_speed() {
        let target = Tile::new(1_010, 1_000, 0);
        let current = launched(VIEWPOINT, SPAWN_OFFSET);

        let next = moved(SpeedMotion.step(current, &input(VIEWPOINT, target)));

        let distance = (198.0_f32 * 198.0 + 220.0 * 220.0).sqrt();
        assert_eq!(next.tile, VIEWPOINT);
        assert!((next.offset.x - (22.0 + 198.0 * 200.0 / distance)).abs() < EPSILON);
        assert!((next.offset.y - 220.0 * 200.0 / distance).abs() < EPSILON);
        assert!((next.facing_angle - (-220.0_f32).atan2(-198.0)).abs() < 1e-5);
    }

    #[test]
    fn commits_to_entered_tile_and_reaches_target() {
        let target = Tile::new(1_010, 1_000, 0);
        let first = moved(SpeedMotion.step(
            launched(VIEWPOINT, SPAWN_OFFSET),
            &input(VIEWPOINT, target),
        ));

        let second = moved(SpeedMotion.step(first, &input(VIEWPOINT, target)));

        assert_eq!(second.tile, Tile::new(1_007, 1_000, 0));
        assert!((second.offset.x - 66.0).abs() < EPSILON, "{:?}", second.offset);
        assert!((second.offset.y - 66.0).abs() < EPSILON, "{:?}", second.offset);

        assert_eq!(
            SpeedMotion.step(second, &input(second.tile, target)),
            Progress::Finished(TerminationReason::WithinReach)
        );
    }

    #[test]
    fn stepping_onto_target_column_and_row_finishes() {
        let target = Tile::new(1_001, 1_000, 0);
        let current = launched(VIEWPOINT, Vec3::new(43.0, 43.0, 0.0));

        assert_eq!(
            SpeedMotion.step(current, &input(VIEWPOINT, target)),
            Progress::Finished(TerminationReason::TargetTileReached)
        );
    }

    #[test]
    fn target_within_one_tile_width_finishes() {
        let target = Tile::new(1_001, 1_000, 0);
        let current = launched(VIEWPOINT, Vec3::new(22.0, 22.0, 0.0));

        assert_eq!(
            SpeedMotion.step(current, &input(VIEWPOINT, target)),
            Progress::Finished(TerminationReason::WithinReach)
        );
    }

    #[test]
    fn altitude_of_source_is_kept_on_commit() {
        let source = Tile::new(1_000, 1_000, 5);
        let target = Tile::new(1_000, 1_010, 5);
        // Screen point (-44, 24) decomposes onto tile delta (-1, 1).
        let current = launched(source, Vec3::new(-44.0, 44.0, 0.0));

        let next = moved(SpeedMotion.step(current, &input(source, target)));

        let step = 200.0 / 2.0_f32.sqrt();
        assert_eq!(next.tile, Tile::new(999, 1_001, 5));
        assert!((next.offset.x + step).abs() < EPSILON, "{:?}", next.offset);
        assert!((next.offset.y - (44.0 + step)).abs() < EPSILON, "{:?}", next.offset);
    }
}
