//! Frame loop driving the world and the effect motion system.

use std::{io::Write, time::Duration};

use anyhow::Result;
use moving_effects_core::{Command, Event};
use moving_effects_system_motion::{EffectMotion, EffectSnapshot};
use moving_effects_world::{self as world, query, World};

use crate::scenario::Scenario;

/// Totals reported once the replay stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Summary {
    /// Frames simulated.
    pub(crate) frames: u32,
    /// Impacts spawned.
    pub(crate) impacts: usize,
    /// Effects still travelling when the frame limit was hit.
    pub(crate) remaining: usize,
}

/// Replays `scenario` for at most `max_frames`, stopping early once every
/// effect has arrived.
///
/// Per-frame lines go to `out` unless `quiet` is set.
pub(crate) fn run<W: Write>(
    scenario: &Scenario,
    max_frames: u32,
    quiet: bool,
    out: &mut W,
) -> Result<Summary> {
    let mut world = World::new();
    let mut motion = EffectMotion::new();
    let mut events = Vec::new();

    for command in scenario.setup_commands() {
        world::apply(&mut world, command, &mut events);
    }
    for spawn in &scenario.effects {
        let _ = motion.spawn(spawn, query::now(&world), &world);
    }

    let dt = Duration::from_millis(scenario.frame_ms);
    let mut frames = 0;

    while frames < max_frames && !motion.is_empty() {
        events.clear();
        for command in scenario.script_commands(frames) {
            world::apply(&mut world, command, &mut events);
        }
        world::apply(&mut world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        motion.handle(&events, &world, &mut commands);
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }

        if !quiet {
            let now = query::now(&world);
            for snapshot in motion.snapshots() {
                write_frame(out, frames, now, &snapshot)?;
            }
            for event in &events {
                if let Event::ImpactSpawned { effect, tile } = event {
                    writeln!(
                        out,
                        "frame {frames:>4} t={now:>7} impact effect={} tile=({}, {}, {})",
                        effect.get(),
                        tile.x(),
                        tile.y(),
                        tile.z()
                    )?;
                }
            }
        }

        frames += 1;
    }

    let summary = Summary {
        frames,
        impacts: query::impacts(&world).len(),
        remaining: motion.len(),
    };
    tracing::info!(
        frames = summary.frames,
        impacts = summary.impacts,
        remaining = summary.remaining,
        "replay finished"
    );
    Ok(summary)
}

fn write_frame<W: Write>(
    out: &mut W,
    frame: u32,
    now: u64,
    snapshot: &EffectSnapshot,
) -> Result<()> {
    writeln!(
        out,
        "frame {frame:>4} t={now:>7} effect={} tile=({}, {}, {}) offset=({:.3}, {:.3}, {:.3}) angle={:.4}",
        snapshot.id.get(),
        snapshot.tile.x(),
        snapshot.tile.y(),
        snapshot.tile.z(),
        snapshot.offset.x,
        snapshot.offset.y,
        snapshot.offset.z,
        snapshot.facing_angle,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_scenario_arrives_on_third_frame() {
        let mut out = Vec::new();

        let summary = run(&Scenario::builtin(), 10, false, &mut out).expect("replay runs");

        assert_eq!(
            summary,
            Summary {
                frames: 3,
                impacts: 1,
                remaining: 0,
            }
        );
        let text = String::from_utf8(out).expect("utf-8 output");
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3, "{text}");
        assert!(lines[0].starts_with("frame    0 t=   1000 effect=1 tile=(1000, 1000, 0)"));
        assert!(lines[1].contains("tile=(1007, 1000, 0) offset=(66.000, 66.000, 0.000)"));
        assert!(lines[2].contains("impact effect=1 tile=(1010, 1000, 0)"));
    }

    #[test]
    fn quiet_replay_writes_nothing() {
        let mut out = Vec::new();

        let summary = run(&Scenario::builtin(), 10, true, &mut out).expect("replay runs");

        assert!(out.is_empty());
        assert_eq!(summary.impacts, 1);
    }

    #[test]
    fn frame_limit_leaves_effects_in_flight() {
        let mut out = Vec::new();

        let summary = run(&Scenario::builtin(), 1, true, &mut out).expect("replay runs");

        assert_eq!(summary.frames, 1);
        assert_eq!(summary.impacts, 0);
        assert_eq!(summary.remaining, 1);
    }
}
