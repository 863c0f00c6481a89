//! Authoritative entity state management utilities.

use std::collections::BTreeMap;

use glam::Vec3;
use moving_effects_core::{EntityId, EntityKind, EntityPosition, Tile};

/// Snapshot of an entity stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct EntityState {
    /// Kind of entity that was placed.
    pub(crate) kind: EntityKind,
    /// Tile occupied by the entity.
    pub(crate) tile: Tile,
    /// Sub-tile offset of the entity while walking.
    pub(crate) offset: Vec3,
    /// Whether the entity has been destroyed.
    pub(crate) destroyed: bool,
}

impl EntityState {
    pub(crate) fn position(&self) -> EntityPosition {
        EntityPosition {
            tile: self.tile,
            offset: self.offset,
            kind: self.kind,
        }
    }
}

/// Registry that stores entities keyed by identifier.
#[derive(Debug, Default)]
pub(crate) struct EntityRegistry {
    entries: BTreeMap<EntityId, EntityState>,
}

impl EntityRegistry {
    /// Inserts a fresh entity, replacing any previous entry with the same identifier.
    pub(crate) fn place(&mut self, id: EntityId, kind: EntityKind, tile: Tile) {
        let _ = self.entries.insert(
            id,
            EntityState {
                kind,
                tile,
                offset: Vec3::ZERO,
                destroyed: false,
            },
        );
    }

    /// Relocates a live entity, returning the tile it left.
    pub(crate) fn relocate(&mut self, id: EntityId, tile: Tile, offset: Vec3) -> Option<Tile> {
        let entry = self.entries.get_mut(&id).filter(|entry| !entry.destroyed)?;
        let previous = entry.tile;
        entry.tile = tile;
        entry.offset = offset;
        Some(previous)
    }

    /// Flags a live entity as destroyed. Returns `false` when nothing changed.
    pub(crate) fn destroy(&mut self, id: EntityId) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) if !entry.destroyed => {
                entry.destroyed = true;
                true
            }
            _ => false,
        }
    }

    /// Retrieves an entity, destroyed or not.
    pub(crate) fn get(&self, id: EntityId) -> Option<&EntityState> {
        self.entries.get(&id)
    }

    /// Iterates over all entities in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (EntityId, &EntityState)> {
        self.entries.iter().map(|(id, state)| (*id, state))
    }
}
