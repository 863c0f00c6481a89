#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the moving-effects engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the effect-motion system. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. The motion system reads entity
//! positions through the [`WorldState`] trait and responds exclusively with new
//! command batches.

use std::time::Duration;

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

pub mod angle;
pub mod projection;

/// Base animation delay of item effects, in milliseconds.
pub const ITEM_EFFECT_ANIMATION_DELAY_MS: u32 = 50;

/// Number of clock ticks (milliseconds) in one unit of spawn duration.
///
/// Spawn durations are expressed in hundredths of a second.
pub const DURATION_UNIT_TICKS: u64 = 100;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Places a new entity into the world.
    PlaceEntity {
        /// Identifier the entity is known by.
        id: EntityId,
        /// Kind of entity, which decides the eye-height bias of targets.
        kind: EntityKind,
        /// Tile the entity occupies after placement.
        tile: Tile,
    },
    /// Moves an existing entity to a new tile and sub-tile offset.
    MoveEntity {
        /// Identifier of the entity to move.
        id: EntityId,
        /// Destination tile.
        tile: Tile,
        /// Sub-tile screen offset relative to the destination tile.
        offset: Vec3,
    },
    /// Marks an entity as destroyed. Destroyed entities stop resolving.
    DestroyEntity {
        /// Identifier of the entity to destroy.
        id: EntityId,
    },
    /// Relocates the local viewpoint that screen math is expressed against.
    SetViewpoint {
        /// Tile occupied by the local player.
        tile: Tile,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests a stationary impact effect where a moving effect ended.
    SpawnImpact {
        /// Moving effect that requested the impact.
        effect: EffectId,
        /// Tile the impact is spawned at.
        tile: Tile,
        /// Graphic passed through from the moving effect.
        graphic: u16,
        /// Hue passed through from the moving effect.
        hue: u16,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Clock reading after the advance, in milliseconds.
        now: u64,
        /// Length of the frame that just elapsed, in seconds.
        delta: f32,
    },
    /// Confirms that an entity was placed.
    EntityPlaced {
        /// Identifier of the placed entity.
        id: EntityId,
        /// Tile the entity occupies.
        tile: Tile,
    },
    /// Confirms that an entity moved.
    EntityMoved {
        /// Identifier of the entity that moved.
        id: EntityId,
        /// Tile the entity occupied before moving.
        from: Tile,
        /// Tile the entity occupies after moving.
        to: Tile,
    },
    /// Confirms that an entity was destroyed.
    EntityDestroyed {
        /// Identifier of the destroyed entity.
        id: EntityId,
    },
    /// Announces that the local viewpoint moved.
    ViewpointChanged {
        /// Tile of the new viewpoint.
        tile: Tile,
    },
    /// Confirms that an impact effect was spawned.
    ImpactSpawned {
        /// Moving effect that requested the impact.
        effect: EffectId,
        /// Tile the impact was spawned at.
        tile: Tile,
    },
}

/// Identifier of a world entity, as carried by the network layer.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(u32);

impl EntityId {
    /// Identifier that never refers to an entity.
    pub const NONE: Self = Self(0);

    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Reports whether the identifier lies in the range reserved for entities.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.0 > 0 && self.0 < 0x8000_0000
    }
}

/// Unique identifier assigned to a moving effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(u32);

impl EffectId {
    /// Creates a new effect identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Discrete world position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    x: u16,
    y: u16,
    z: i8,
}

impl Tile {
    /// Creates a new tile coordinate.
    #[must_use]
    pub const fn new(x: u16, y: u16, z: i8) -> Self {
        Self { x, y, z }
    }

    /// Builds a tile from signed components.
    ///
    /// Components outside the `u16`/`i8` ranges are a caller contract
    /// violation and wrap.
    #[must_use]
    pub const fn from_ivec3(value: IVec3) -> Self {
        Self {
            x: value.x as u16,
            y: value.y as u16,
            z: value.z as i8,
        }
    }

    /// Column of the tile.
    #[must_use]
    pub const fn x(&self) -> u16 {
        self.x
    }

    /// Row of the tile.
    #[must_use]
    pub const fn y(&self) -> u16 {
        self.y
    }

    /// Altitude of the tile.
    #[must_use]
    pub const fn z(&self) -> i8 {
        self.z
    }

    /// Widens the tile into a signed vector for delta arithmetic.
    #[must_use]
    pub fn as_ivec3(&self) -> IVec3 {
        IVec3::new(i32::from(self.x), i32::from(self.y), i32::from(self.z))
    }

    /// Reports whether both tiles share the same column and row.
    #[must_use]
    pub const fn same_column_and_row(&self, other: Tile) -> bool {
        self.x == other.x && self.y == other.y
    }
}

/// Broad classification of world entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Characters and creatures. Effects aim at their eye height.
    Mobile,
    /// Items lying on the ground.
    Item,
}

/// Point-in-time position of an entity as reported by the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntityPosition {
    /// Tile occupied by the entity.
    pub tile: Tile,
    /// Sub-tile screen offset of the entity while it walks between tiles.
    pub offset: Vec3,
    /// Kind of the entity.
    pub kind: EntityKind,
}

/// Read-only access to the world state consumed by the motion system.
pub trait WorldState {
    /// Looks up a live entity. Missing and destroyed entities yield `None`.
    fn lookup(&self, id: EntityId) -> Option<EntityPosition>;

    /// Tile of the local viewpoint, normally the player.
    fn viewpoint(&self) -> Tile;
}

/// Clock reading captured at the start of a frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameClock {
    /// Current simulation time in milliseconds.
    pub now: u64,
    /// Length of the previous frame in seconds.
    pub delta: f32,
}

impl FrameClock {
    /// Creates a new clock reading.
    #[must_use]
    pub const fn new(now: u64, delta: f32) -> Self {
        Self { now, delta }
    }
}

/// Where an effect starts from or travels to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anchor {
    /// A live entity, resolved every tick.
    Entity(EntityId),
    /// A coordinate captured once.
    Fixed(Tile),
}

/// Arguments describing a moving effect at spawn time.
///
/// Source and target are each given as an entity identifier together with a
/// fallback coordinate. The coordinate is used when the identifier is invalid
/// or does not resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSpawn {
    /// Entity the effect leaves from.
    #[serde(default)]
    pub source: EntityId,
    /// Fallback coordinate of the source.
    pub source_tile: Tile,
    /// Entity the effect travels to.
    #[serde(default)]
    pub target: EntityId,
    /// Fallback coordinate of the target.
    pub target_tile: Tile,
    /// Opaque graphic identifier passed through to rendering.
    #[serde(default)]
    pub graphic: u16,
    /// Opaque hue identifier passed through to rendering.
    #[serde(default)]
    pub hue: u16,
    /// Whether the renderer should keep the sprite orientation fixed.
    #[serde(default)]
    pub fixed_direction: bool,
    /// Flight duration in hundredths of a second. Non-positive selects speed mode.
    #[serde(default)]
    pub duration: i32,
    /// Animation speed byte.
    #[serde(default)]
    pub speed: u8,
}

impl EffectSpawn {
    /// Animation interval derived from the speed byte, in milliseconds.
    #[must_use]
    pub fn interval_ms(&self) -> u32 {
        let base = ITEM_EFFECT_ANIMATION_DELAY_MS * 2;
        base + u32::from(self.speed) * base
    }
}

/// Motion strategy of an effect, chosen once at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionMode {
    /// Interpolate so that the target is reached at `end_tick`.
    Duration {
        /// Clock reading at which the effect expires.
        end_tick: u64,
    },
    /// Step toward the target at a speed bounded by the animation interval.
    Speed,
}

impl MotionMode {
    /// Selects the motion mode for a spawn duration given in hundredths of a second.
    #[must_use]
    pub fn from_duration(now: u64, duration: i32) -> Self {
        match u64::try_from(duration) {
            Ok(hundredths) if hundredths > 0 => Self::Duration {
                end_tick: now.saturating_add(hundredths * DURATION_UNIT_TICKS),
            },
            _ => Self::Speed,
        }
    }
}

/// Reasons an effect stops travelling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    /// The duration elapsed.
    Expired,
    /// No time remained to cover the path, so the effect arrived at once.
    Collapsed,
    /// The target came within one tile width.
    WithinReach,
    /// The effect stepped onto the target tile.
    TargetTileReached,
}

/// Request for the effect factory to spawn a follow-up impact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImpactRequest {
    /// Tile the impact should appear at.
    pub tile: Tile,
    /// Graphic of the moving effect that ended.
    pub graphic: u16,
    /// Hue of the moving effect that ended.
    pub hue: u16,
}
