//! Scenario files describing entities, effects and scripted world changes.

use std::{collections::BTreeSet, fs, path::Path};

use anyhow::{Context, Result};
use glam::Vec3;
use moving_effects_core::{Command, EffectSpawn, EntityId, EntityKind, Tile};
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_FRAME_MS: u64 = 16;
const DEFAULT_MAX_FRAMES: u32 = 600;
const DEFAULT_VIEWPOINT: Tile = Tile::new(1_000, 1_000, 0);

/// Scenario replayed by the command-line adapter.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    /// Simulated length of one frame in milliseconds.
    #[serde(default = "default_frame_ms")]
    pub(crate) frame_ms: u64,
    /// Frame limit after which the replay stops.
    #[serde(default = "default_max_frames")]
    pub(crate) max_frames: u32,
    /// Tile of the local viewpoint.
    #[serde(default = "default_viewpoint")]
    pub(crate) viewpoint: Tile,
    /// Entities placed before the first frame.
    #[serde(default)]
    pub(crate) entities: Vec<EntitySpec>,
    /// Effects spawned before the first frame.
    #[serde(default)]
    pub(crate) effects: Vec<EffectSpawn>,
    /// World changes applied at the start of the listed frames.
    #[serde(default)]
    pub(crate) script: Vec<ScriptStep>,
}

/// Entity placed when the scenario starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct EntitySpec {
    pub(crate) id: EntityId,
    pub(crate) kind: EntityKind,
    pub(crate) tile: Tile,
}

/// Scripted world change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScriptStep {
    pub(crate) frame: u32,
    pub(crate) action: ScriptAction,
    #[serde(default)]
    pub(crate) id: EntityId,
    #[serde(default)]
    pub(crate) tile: Option<Tile>,
}

/// Kinds of scripted world changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ScriptAction {
    /// Moves an entity onto `tile`.
    Move,
    /// Destroys an entity.
    Destroy,
    /// Moves the local viewpoint onto `tile`.
    Viewpoint,
}

impl ScriptAction {
    const fn needs_entity(self) -> bool {
        matches!(self, Self::Move | Self::Destroy)
    }

    const fn needs_tile(self) -> bool {
        matches!(self, Self::Move | Self::Viewpoint)
    }
}

/// Semantic problems found in a scenario that parsed successfully.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ScenarioError {
    /// Frames must advance the clock.
    #[error("frame_ms must be greater than zero")]
    ZeroFrameLength,
    /// Two entities share an identifier.
    #[error("entity {0} is declared more than once")]
    DuplicateEntity(u32),
    /// A script step refers to an entity that is never placed.
    #[error("script step at frame {frame} refers to unknown entity {id}")]
    UnknownEntity {
        /// Frame of the offending step.
        frame: u32,
        /// Identifier named by the step.
        id: u32,
    },
    /// A script step that needs a destination has none.
    #[error("script step at frame {frame} ({action:?}) is missing a tile")]
    MissingTile {
        /// Frame of the offending step.
        frame: u32,
        /// Action of the offending step.
        action: ScriptAction,
    },
}

impl Scenario {
    /// Reads and validates a scenario file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid scenario at {}", path.display()))
    }

    /// Parses and validates scenario text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(contents).context("failed to parse scenario TOML")?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Homing bolt launched from the viewpoint toward a tile ten steps east,
    /// advancing one second per frame.
    pub(crate) fn builtin() -> Self {
        Self {
            frame_ms: 1_000,
            max_frames: 10,
            viewpoint: DEFAULT_VIEWPOINT,
            entities: Vec::new(),
            effects: vec![EffectSpawn {
                source: EntityId::NONE,
                source_tile: DEFAULT_VIEWPOINT,
                target: EntityId::NONE,
                target_tile: Tile::new(1_010, 1_000, 0),
                graphic: 0x36d4,
                hue: 0,
                fixed_direction: false,
                duration: 0,
                speed: 1,
            }],
            script: Vec::new(),
        }
    }

    /// Checks the rules that the file format cannot express.
    pub(crate) fn validate(&self) -> Result<(), ScenarioError> {
        if self.frame_ms == 0 {
            return Err(ScenarioError::ZeroFrameLength);
        }

        let mut known = BTreeSet::new();
        for entity in &self.entities {
            if !known.insert(entity.id) {
                return Err(ScenarioError::DuplicateEntity(entity.id.get()));
            }
        }

        for step in &self.script {
            if step.action.needs_entity() && !known.contains(&step.id) {
                return Err(ScenarioError::UnknownEntity {
                    frame: step.frame,
                    id: step.id.get(),
                });
            }
            if step.action.needs_tile() && step.tile.is_none() {
                return Err(ScenarioError::MissingTile {
                    frame: step.frame,
                    action: step.action,
                });
            }
        }

        Ok(())
    }

    /// Commands establishing the viewpoint and every entity.
    pub(crate) fn setup_commands(&self) -> Vec<Command> {
        let mut commands = Vec::with_capacity(self.entities.len() + 1);
        commands.push(Command::SetViewpoint {
            tile: self.viewpoint,
        });
        commands.extend(self.entities.iter().map(|entity| Command::PlaceEntity {
            id: entity.id,
            kind: entity.kind,
            tile: entity.tile,
        }));
        commands
    }

    /// Commands scripted for the provided frame, in file order.
    pub(crate) fn script_commands(&self, frame: u32) -> Vec<Command> {
        self.script
            .iter()
            .filter(|step| step.frame == frame)
            .filter_map(|step| match step.action {
                ScriptAction::Move => step.tile.map(|tile| Command::MoveEntity {
                    id: step.id,
                    tile,
                    offset: Vec3::ZERO,
                }),
                ScriptAction::Destroy => Some(Command::DestroyEntity { id: step.id }),
                ScriptAction::Viewpoint => step.tile.map(|tile| Command::SetViewpoint { tile }),
            })
            .collect()
    }
}

fn default_frame_ms() -> u64 {
    DEFAULT_FRAME_MS
}

fn default_max_frames() -> u32 {
    DEFAULT_MAX_FRAMES
}

fn default_viewpoint() -> Tile {
    DEFAULT_VIEWPOINT
}
