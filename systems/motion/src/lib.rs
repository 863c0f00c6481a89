#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that moves visual effects from a source toward a target and
//! requests impacts once they arrive.

mod anchor;
mod duration;
mod effect;
mod speed;
mod step;
mod termination;

use moving_effects_core::{Command, EffectId, EffectSpawn, Event, FrameClock, WorldState};

pub use anchor::{AnchorPoint, AnchorResolver};
pub use effect::{EffectSnapshot, MovingEffect, Termination};
pub use step::Kinematics;
pub use termination::{Lifecycle, TerminationPolicy};

/// Effect motion system that owns every live moving effect in spawn order.
#[derive(Debug)]
pub struct EffectMotion {
    effects: Vec<MovingEffect>,
    next_effect_id: u32,
    scratch: Vec<Termination>,
}

impl Default for EffectMotion {
    fn default() -> Self {
        Self {
            effects: Vec::new(),
            next_effect_id: 1,
            scratch: Vec::new(),
        }
    }
}

impl EffectMotion {
    /// Creates an empty effect motion system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a moving effect and returns its identifier.
    pub fn spawn<W>(&mut self, spawn: &EffectSpawn, now: u64, world: &W) -> EffectId
    where
        W: WorldState + ?Sized,
    {
        let id = EffectId::new(self.next_effect_id);
        self.next_effect_id = self.next_effect_id.wrapping_add(1).max(1);

        let effect = MovingEffect::new(id, spawn, now, world);
        tracing::debug!(
            effect = id.get(),
            mode = ?effect.mode(),
            tile = ?effect.kinematics().tile,
            "moving effect spawned"
        );
        self.effects.push(effect);
        id
    }

    /// Removes an effect without spawning an impact.
    pub fn cancel(&mut self, id: EffectId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let _ = self.effects.remove(index);
        tracing::debug!(effect = id.get(), "moving effect cancelled");
        true
    }

    /// Advances every effect once per `Event::TimeAdvanced`, emitting
    /// `Command::SpawnImpact` for each effect that arrived.
    pub fn handle<W>(&mut self, events: &[Event], world: &W, out: &mut Vec<Command>)
    where
        W: WorldState + ?Sized,
    {
        for event in events {
            if let Event::TimeAdvanced { now, delta } = event {
                self.advance(FrameClock::new(*now, *delta), world, out);
            }
        }
    }

    /// Advances every effect by one frame.
    pub fn advance<W>(&mut self, clock: FrameClock, world: &W, out: &mut Vec<Command>)
    where
        W: WorldState + ?Sized,
    {
        self.scratch.clear();

        for effect in &mut self.effects {
            if let Some(termination) = effect.update(clock, world) {
                self.scratch.push(termination);
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        self.effects.retain(MovingEffect::is_active);
        self.scratch.sort_by_key(|termination| termination.effect);

        out.reserve(self.scratch.len());
        out.extend(self.scratch.drain(..).map(|termination| Command::SpawnImpact {
            effect: termination.effect,
            tile: termination.impact.tile,
            graphic: termination.impact.graphic,
            hue: termination.impact.hue,
        }));
    }

    /// Read-only snapshots of every live effect in spawn order.
    #[must_use]
    pub fn snapshots(&self) -> Vec<EffectSnapshot> {
        self.effects.iter().map(MovingEffect::snapshot).collect()
    }

    /// Finds the live effect with the provided identifier.
    #[must_use]
    pub fn get(&self, id: EffectId) -> Option<&MovingEffect> {
        self.position(id).map(|index| &self.effects[index])
    }

    /// Number of live effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Whether no effect is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    fn position(&self, id: EffectId) -> Option<usize> {
        self.effects
            .binary_search_by_key(&id, |effect| effect.id())
            .ok()
    }
}
