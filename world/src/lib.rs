#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the moving-effects engine.

mod entities;

use moving_effects_core::{
    Command, EffectId, EntityId, EntityPosition, Event, Tile, WorldState,
};

use self::entities::EntityRegistry;

const DEFAULT_VIEWPOINT: Tile = Tile::new(1_000, 1_000, 0);

/// Stationary impact spawned where a moving effect ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Impact {
    /// Moving effect that requested the impact.
    pub effect: EffectId,
    /// Tile the impact occupies.
    pub tile: Tile,
    /// Graphic passed through from the moving effect.
    pub graphic: u16,
    /// Hue passed through from the moving effect.
    pub hue: u16,
    /// Clock reading at which the impact was spawned.
    pub spawned_at: u64,
}

/// Represents the authoritative world state.
#[derive(Debug)]
pub struct World {
    entities: EntityRegistry,
    viewpoint: Tile,
    now: u64,
    impacts: Vec<Impact>,
}

impl World {
    /// Creates an empty world with the viewpoint at its default tile.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: EntityRegistry::default(),
            viewpoint: DEFAULT_VIEWPOINT,
            now: 0,
            impacts: Vec::new(),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldState for World {
    fn lookup(&self, id: EntityId) -> Option<EntityPosition> {
        self.entities
            .get(id)
            .filter(|entity| !entity.destroyed)
            .map(|entity| entity.position())
    }

    fn viewpoint(&self) -> Tile {
        self.viewpoint
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    tracing::trace!(?command, now = world.now, "applying world command");

    match command {
        Command::PlaceEntity { id, kind, tile } => {
            world.entities.place(id, kind, tile);
            out_events.push(Event::EntityPlaced { id, tile });
        }
        Command::MoveEntity { id, tile, offset } => {
            if let Some(from) = world.entities.relocate(id, tile, offset) {
                out_events.push(Event::EntityMoved { id, from, to: tile });
            }
        }
        Command::DestroyEntity { id } => {
            if world.entities.destroy(id) {
                out_events.push(Event::EntityDestroyed { id });
            }
        }
        Command::SetViewpoint { tile } => {
            if world.viewpoint != tile {
                world.viewpoint = tile;
                out_events.push(Event::ViewpointChanged { tile });
            }
        }
        Command::Tick { dt } => {
            let elapsed = u64::try_from(dt.as_millis()).unwrap_or(u64::MAX);
            world.now = world.now.saturating_add(elapsed);
            out_events.push(Event::TimeAdvanced {
                now: world.now,
                delta: dt.as_secs_f32(),
            });
        }
        Command::SpawnImpact {
            effect,
            tile,
            graphic,
            hue,
        } => {
            world.impacts.push(Impact {
                effect,
                tile,
                graphic,
                hue,
                spawned_at: world.now,
            });
            out_events.push(Event::ImpactSpawned { effect, tile });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use moving_effects_core::{EntityId, EntityKind, Tile};

    use super::{Impact, World};

    /// Current reading of the simulation clock in milliseconds.
    #[must_use]
    pub fn now(world: &World) -> u64 {
        world.now
    }

    /// Tile of the local viewpoint.
    #[must_use]
    pub fn viewpoint(world: &World) -> Tile {
        world.viewpoint
    }

    /// Impacts spawned so far, in spawn order.
    #[must_use]
    pub fn impacts(world: &World) -> &[Impact] {
        &world.impacts
    }

    /// Captures a read-only view of every entity, destroyed ones included.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        let snapshots = world
            .entities
            .iter()
            .map(|(id, entity)| EntitySnapshot {
                id,
                kind: entity.kind,
                tile: entity.tile,
                destroyed: entity.destroyed,
            })
            .collect();
        EntityView { snapshots }
    }

    /// Read-only snapshot describing all entities in identifier order.
    #[derive(Clone, Debug, Default)]
    pub struct EntityView {
        snapshots: Vec<EntitySnapshot>,
    }

    impl EntityView {
        /// Iterator over the captured entity snapshots in deterministic order.
        pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
            self.snapshots.iter()
        }

        /// Finds the snapshot of the provided entity.
        #[must_use]
        pub fn get(&self, id: EntityId) -> Option<&EntitySnapshot> {
            self.snapshots
                .binary_search_by_key(&id, |snapshot| snapshot.id)
                .ok()
                .map(|index| &self.snapshots[index])
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<EntitySnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single entity used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct EntitySnapshot {
        /// Identifier of the entity.
        pub id: EntityId,
        /// Kind of the entity.
        pub kind: EntityKind,
        /// Tile occupied by the entity.
        pub tile: Tile,
        /// Whether the entity has been destroyed.
        pub destroyed: bool,
    }
}
