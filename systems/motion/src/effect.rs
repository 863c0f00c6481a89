//! Per-effect state and the update that advances it by one frame.

use glam::Vec3;
use moving_effects_core::{
    projection::SPAWN_OFFSET, Anchor, EffectId, EffectSpawn, FrameClock, ImpactRequest,
    MotionMode, TerminationReason, Tile, WorldState,
};

use crate::{
    anchor::AnchorResolver,
    duration::DurationMotion,
    speed::SpeedMotion,
    step::{Kinematics, Progress, StepInput},
    termination::{Lifecycle, TerminationPolicy},
};

/// Outcome reported once when an effect stops travelling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Termination {
    /// Effect that terminated.
    pub effect: EffectId,
    /// Why it terminated.
    pub reason: TerminationReason,
    /// Tile the effect occupied when it terminated.
    pub tile: Tile,
    /// Follow-up impact to spawn at the target.
    pub impact: ImpactRequest,
}

/// Read-only view of an effect handed to renderers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectSnapshot {
    /// Identifier of the effect.
    pub id: EffectId,
    /// Tile the effect occupies.
    pub tile: Tile,
    /// Sub-tile screen offset.
    pub offset: Vec3,
    /// Facing angle in radians.
    pub facing_angle: f32,
    /// Whether the sprite keeps a fixed orientation.
    pub fixed_direction: bool,
    /// Graphic identifier.
    pub graphic: u16,
    /// Hue identifier.
    pub hue: u16,
    /// Animation frame interval in milliseconds.
    pub animation_interval_ms: u32,
}

/// A projectile-like effect travelling from a source to a target.
#[derive(Clone, Debug)]
pub struct MovingEffect {
    id: EffectId,
    kinematics: Kinematics,
    mode: MotionMode,
    last_update_tick: u64,
    interval_ms: u32,
    fixed_direction: bool,
    graphic: u16,
    hue: u16,
    source: AnchorResolver,
    target: AnchorResolver,
    termination: TerminationPolicy,
}

impl MovingEffect {
    /// Creates an effect at the resolved source, leaving from the centre of its tile.
    pub fn new<W>(id: EffectId, spawn: &EffectSpawn, now: u64, world: &W) -> Self
    where
        W: WorldState + ?Sized,
    {
        let mut source = AnchorResolver::new(spawn.source, spawn.source_tile, world);
        let target = AnchorResolver::new(spawn.target, spawn.target_tile, world);
        let origin = source.resolve(world);

        Self {
            id,
            kinematics: Kinematics {
                tile: origin.tile,
                offset: SPAWN_OFFSET,
                facing_angle: 0.0,
            },
            mode: MotionMode::from_duration(now, spawn.duration),
            last_update_tick: now,
            interval_ms: spawn.interval_ms(),
            fixed_direction: spawn.fixed_direction,
            graphic: spawn.graphic,
            hue: spawn.hue,
            source,
            target,
            termination: TerminationPolicy::default(),
        }
    }

    /// Identifier of the effect.
    #[must_use]
    pub const fn id(&self) -> EffectId {
        self.id
    }

    /// Current position and orientation.
    #[must_use]
    pub const fn kinematics(&self) -> Kinematics {
        self.kinematics
    }

    /// Motion strategy chosen at construction.
    #[must_use]
    pub const fn mode(&self) -> MotionMode {
        self.mode
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn lifecycle(&self) -> Lifecycle {
        self.termination.state()
    }

    /// Whether the effect is still travelling.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.termination.is_active()
    }

    /// Clock reading of the most recent update.
    #[must_use]
    pub const fn last_update_tick(&self) -> u64 {
        self.last_update_tick
    }

    /// Anchors of the source and the target, in that order.
    #[must_use]
    pub const fn anchors(&self) -> (Anchor, Anchor) {
        (self.source.anchor(), self.target.anchor())
    }

    /// Read-only view for renderers.
    #[must_use]
    pub const fn snapshot(&self) -> EffectSnapshot {
        EffectSnapshot {
            id: self.id,
            tile: self.kinematics.tile,
            offset: self.kinematics.offset,
            facing_angle: self.kinematics.facing_angle,
            fixed_direction: self.fixed_direction,
            graphic: self.graphic,
            hue: self.hue,
            animation_interval_ms: self.interval_ms,
        }
    }

    /// Advances the effect by one frame.
    ///
    /// Returns the termination the first time the effect stops; terminated
    /// effects are left untouched and report nothing.
    pub fn update<W>(&mut self, clock: FrameClock, world: &W) -> Option<Termination>
    where
        W: WorldState + ?Sized,
    {
        if !self.termination.is_active() {
            return None;
        }

        // A clock that runs backwards is treated as standing still.
        let now = clock.now.max(self.last_update_tick);
        let source = self.source.resolve(world);
        let target = self.target.resolve(world);
        let input = StepInput {
            now,
            last_update_tick: self.last_update_tick,
            delta: clock.delta.max(0.0),
            interval_ms: self.interval_ms,
            viewpoint: world.viewpoint(),
            source,
            target,
            source_tracks_effect: matches!(self.source.anchor(), Anchor::Fixed(_)),
        };

        let progress = match self.mode {
            MotionMode::Duration { end_tick } => {
                DurationMotion::new(end_tick).step(self.kinematics, &input)
            }
            MotionMode::Speed => SpeedMotion.step(self.kinematics, &input),
        };

        match progress {
            Progress::Moving(next) => {
                match self.mode {
                    MotionMode::Duration { .. } => self.source.follow(next.tile),
                    MotionMode::Speed => {
                        if next.tile != source.tile {
                            self.source.pin(next.tile);
                        }
                    }
                }
                self.kinematics = next;
                self.last_update_tick = now;
                tracing::trace!(
                    effect = self.id.get(),
                    tile = ?next.tile,
                    offset = ?next.offset,
                    "moving effect advanced"
                );
                None
            }
            Progress::Finished(reason) => {
                self.last_update_tick = now;
                if !self.termination.terminate(reason) {
                    return None;
                }
                tracing::debug!(
                    effect = self.id.get(),
                    ?reason,
                    tile = ?self.kinematics.tile,
                    "moving effect terminated"
                );
                Some(Termination {
                    effect: self.id,
                    reason,
                    tile: self.kinematics.tile,
                    impact: ImpactRequest {
                        tile: target.tile,
                        graphic: self.graphic,
                        hue: self.hue,
                    },
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moving_effects_core::{projection::to_screen_3d, Command, EntityId, EntityKind};
    use moving_effects_world::{self as world, World};

    fn spawn(duration: i32) -> EffectSpawn {
        EffectSpawn {
            source: EntityId::NONE,
            source_tile: Tile::new(1_000, 1_000, 0),
            target: EntityId::NONE,
            target_tile: Tile::new(1_010, 1_000, 0),
            graphic: 0x36d4,
            hue: 0x0481,
            fixed_direction: false,
            duration,
            speed: 1,
        }
    }

    #[test]
    fn starts_at_source_with_spawn_offset() {
        let world = World::new();

        let effect = MovingEffect::new(EffectId::new(1), &spawn(0), 40, &world);

        assert_eq!(effect.kinematics().tile, Tile::new(1_000, 1_000, 0));
        assert_eq!(effect.kinematics().offset, SPAWN_OFFSET);
        assert_eq!(effect.mode(), MotionMode::Speed);
        assert_eq!(effect.last_update_tick(), 40);
        assert_eq!(effect.snapshot().animation_interval_ms, 200);
    }

    #[test]
    fn entity_source_provides_starting_tile() {
        let mut world = World::new();
        let mut events = Vec::new();
        let caster = EntityId::new(12);
        world::apply(
            &mut world,
            Command::PlaceEntity {
                id: caster,
                kind: EntityKind::Mobile,
                tile: Tile::new(1_004, 998, 7),
            },
            &mut events,
        );
        let mut request = spawn(3);
        request.source = caster;

        let effect = MovingEffect::new(EffectId::new(1), &request, 0, &world);

        assert_eq!(effect.kinematics().tile, Tile::new(1_004, 998, 7));
        assert_eq!(effect.anchors().0, Anchor::Entity(caster));
        assert_eq!(effect.mode(), MotionMode::Duration { end_tick: 300 });
    }

    #[test]
    fn backwards_clock_does_not_move_the_effect() {
        let world = World::new();
        let mut effect = MovingEffect::new(EffectId::new(1), &spawn(10), 500, &world);

        assert!(effect.update(FrameClock::new(400, 0.016), &world).is_none());

        let start = to_screen_3d(Tile::new(1_000, 1_000, 0).as_ivec3(), SPAWN_OFFSET);
        let now = effect.kinematics();
        let position = to_screen_3d(now.tile.as_ivec3(), now.offset);
        assert_eq!(effect.last_update_tick(), 500);
        assert!(effect.is_active());
        assert!((position - start).length() < 1e-3, "{position:?}");
    }

    #[test]
    fn termination_is_reported_once() {
        let world = World::new();
        let mut effect = MovingEffect::new(EffectId::new(4), &spawn(1), 0, &world);

        let termination = effect
            .update(FrameClock::new(100, 0.1), &world)
            .expect("effect expires");
        assert_eq!(termination.reason, TerminationReason::Expired);
        assert_eq!(
            termination.impact,
            ImpactRequest {
                tile: Tile::new(1_010, 1_000, 0),
                graphic: 0x36d4,
                hue: 0x0481,
            }
        );

        assert!(effect.update(FrameClock::new(200, 0.1), &world).is_none());
        assert_eq!(
            effect.lifecycle(),
            Lifecycle::Terminated(TerminationReason::Expired)
        );
    }

    #[test]
    fn fixed_source_follows_duration_effect() {
        let world = World::new();
        let mut effect = MovingEffect::new(EffectId::new(1), &spawn(10), 0, &world);

        assert!(effect.update(FrameClock::new(500, 0.5), &world).is_none());

        let (source, _) = effect.anchors();
        assert_eq!(source, Anchor::Fixed(effect.kinematics().tile));
    }

    #[test]
    fn speed_effect_pins_source_after_leaving_its_tile() {
        let mut world = World::new();
        let mut events = Vec::new();
        let caster = EntityId::new(2);
        world::apply(
            &mut world,
            Command::PlaceEntity {
                id: caster,
                kind: EntityKind::Mobile,
                tile: Tile::new(1_000, 1_000, 0),
            },
            &mut events,
        );
        let mut request = spawn(0);
        request.source = caster;
        let mut effect = MovingEffect::new(EffectId::new(1), &request, 0, &world);

        assert!(effect.update(FrameClock::new(1_000, 1.0), &world).is_none());
        assert_eq!(effect.anchors().0, Anchor::Entity(caster));

        assert!(effect.update(FrameClock::new(2_000, 1.0), &world).is_none());
        assert_eq!(effect.kinematics().tile, Tile::new(1_007, 1_000, 0));
        assert_eq!(effect.anchors().0, Anchor::Fixed(Tile::new(1_007, 1_000, 0)));
    }
}
