use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use moving_effects_core::{Command, EffectSpawn, EntityId, EntityKind, Event, Tile};
use moving_effects_system_motion::{EffectMotion, EffectSnapshot};
use moving_effects_world::{self as world, query, World};

#[test]
fn deterministic_replay_produces_identical_runs() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first.impacts.len(), 3, "every effect should arrive: {first:?}");
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::new();
    let mut motion = EffectMotion::new();
    let mut log = Vec::new();
    let mut frames = Vec::new();

    for command in commands {
        let mut events = Vec::new();
        world::apply(&mut world, command, &mut events);
        if events
            .iter()
            .any(|event| matches!(event, Event::EntityPlaced { id, .. } if id.get() == 2))
        {
            spawn_volley(&mut motion, &world);
        }
        record_events(&events, &mut log);
        process_motion(&mut world, &mut motion, events, &mut log);
        frames.extend(motion.snapshots().iter().map(FrameRecord::from));
    }

    let impacts = query::impacts(&world)
        .iter()
        .map(|impact| (impact.effect.get(), impact.tile, impact.spawned_at))
        .collect();

    ReplayOutcome {
        frames,
        impacts,
        events: log,
    }
}

fn spawn_volley(motion: &mut EffectMotion, world: &World) {
    let now = query::now(world);
    let caster = EntityId::new(1);
    let victim = EntityId::new(2);
    let volley = [
        EffectSpawn {
            source: caster,
            source_tile: Tile::default(),
            target: victim,
            target_tile: Tile::default(),
            graphic: 0x36d4,
            hue: 0,
            fixed_direction: false,
            duration: 0,
            speed: 1,
        },
        EffectSpawn {
            source: caster,
            source_tile: Tile::default(),
            target: victim,
            target_tile: Tile::default(),
            graphic: 0x379f,
            hue: 0x21,
            fixed_direction: false,
            duration: 8,
            speed: 0,
        },
        EffectSpawn {
            source: EntityId::NONE,
            source_tile: Tile::new(995, 1_003, 0),
            target: EntityId::NONE,
            target_tile: Tile::new(1_004, 996, 0),
            graphic: 0x0f51,
            hue: 0,
            fixed_direction: true,
            duration: 0,
            speed: 3,
        },
    ];

    for spawn in &volley {
        let _ = motion.spawn(spawn, now, world);
    }
}

fn process_motion(
    world: &mut World,
    motion: &mut EffectMotion,
    events: Vec<Event>,
    log: &mut Vec<EventRecord>,
) {
    let mut commands = Vec::new();
    motion.handle(&events, world, &mut commands);

    for command in commands {
        let mut generated_events = Vec::new();
        world::apply(world, command, &mut generated_events);
        record_events(&generated_events, log);
    }
}

fn record_events(events: &[Event], log: &mut Vec<EventRecord>) {
    log.extend(events.iter().map(EventRecord::from));
}

fn scripted_commands() -> Vec<Command> {
    let mut commands = vec![
        Command::PlaceEntity {
            id: EntityId::new(1),
            kind: EntityKind::Mobile,
            tile: Tile::new(1_000, 1_000, 0),
        },
        Command::PlaceEntity {
            id: EntityId::new(2),
            kind: EntityKind::Mobile,
            tile: Tile::new(1_008, 1_002, 0),
        },
    ];

    for frame in 0..120 {
        commands.push(Command::Tick {
            dt: Duration::from_millis(16),
        });
        if frame == 20 {
            commands.push(Command::MoveEntity {
                id: EntityId::new(2),
                tile: Tile::new(1_009, 1_002, 0),
                offset: glam::Vec3::new(6.0, -6.0, 0.0),
            });
        }
    }

    commands
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    frames: Vec<FrameRecord>,
    impacts: Vec<(u32, Tile, u64)>,
    events: Vec<EventRecord>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct FrameRecord {
    effect: u32,
    tile: Tile,
    offset_bits: [u32; 3],
    facing_bits: u32,
}

impl From<&EffectSnapshot> for FrameRecord {
    fn from(snapshot: &EffectSnapshot) -> Self {
        Self {
            effect: snapshot.id.get(),
            tile: snapshot.tile,
            offset_bits: snapshot.offset.to_array().map(f32::to_bits),
            facing_bits: snapshot.facing_angle.to_bits(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum EventRecord {
    TimeAdvanced { now: u64 },
    EntityPlaced { id: u32, tile: Tile },
    EntityMoved { id: u32, to: Tile },
    EntityDestroyed { id: u32 },
    ViewpointChanged { tile: Tile },
    ImpactSpawned { effect: u32, tile: Tile },
}

impl From<&Event> for EventRecord {
    fn from(event: &Event) -> Self {
        match event {
            Event::TimeAdvanced { now, .. } => Self::TimeAdvanced { now: *now },
            Event::EntityPlaced { id, tile } => Self::EntityPlaced {
                id: id.get(),
                tile: *tile,
            },
            Event::EntityMoved { id, to, .. } => Self::EntityMoved {
                id: id.get(),
                to: *to,
            },
            Event::EntityDestroyed { id } => Self::EntityDestroyed { id: id.get() },
            Event::ViewpointChanged { tile } => Self::ViewpointChanged { tile: *tile },
            Event::ImpactSpawned { effect, tile } => Self::ImpactSpawned {
                effect: effect.get(),
                tile: *tile,
            },
        }
    }
}
