//! Resolution of effect anchors against the world state.

use glam::Vec3;
use moving_effects_core::{Anchor, EntityId, EntityKind, EntityPosition, Tile, WorldState};

/// Position of an anchor at the time it was resolved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnchorPoint {
    /// Tile the anchor occupies.
    pub tile: Tile,
    /// Sub-tile offset of the anchored entity. Zero for fixed anchors.
    pub offset: Vec3,
    /// Whether the anchored entity is a mobile.
    pub mobile: bool,
}

impl AnchorPoint {
    /// Point of a fixed coordinate.
    #[must_use]
    pub const fn fixed(tile: Tile) -> Self {
        Self {
            tile,
            offset: Vec3::ZERO,
            mobile: false,
        }
    }
}

impl From<EntityPosition> for AnchorPoint {
    fn from(position: EntityPosition) -> Self {
        Self {
            tile: position.tile,
            offset: position.offset,
            mobile: position.kind == EntityKind::Mobile,
        }
    }
}

/// Resolves one anchor every tick, freezing at the last known point once the
/// anchored entity disappears.
#[derive(Clone, Debug)]
pub struct AnchorResolver {
    anchor: Anchor,
    last_known: AnchorPoint,
    lost: bool,
}

impl AnchorResolver {
    /// Anchors to `entity` when it is valid and currently resolves, and to
    /// `fallback` otherwise.
    pub fn new<W>(entity: EntityId, fallback: Tile, world: &W) -> Self
    where
        W: WorldState + ?Sized,
    {
        let resolved = if entity.is_valid() {
            world.lookup(entity)
        } else {
            None
        };

        match resolved {
            Some(position) => Self {
                anchor: Anchor::Entity(entity),
                last_known: position.into(),
                lost: false,
            },
            None => Self::fixed(fallback),
        }
    }

    /// Anchors to a fixed coordinate.
    #[must_use]
    pub const fn fixed(tile: Tile) -> Self {
        Self {
            anchor: Anchor::Fixed(tile),
            last_known: AnchorPoint::fixed(tile),
            lost: false,
        }
    }

    /// Anchor currently in effect.
    #[must_use]
    pub const fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// Whether the anchored entity disappeared and the point is frozen.
    #[must_use]
    pub const fn is_lost(&self) -> bool {
        self.lost
    }

    /// Point returned by the most recent resolution.
    #[must_use]
    pub const fn last_known(&self) -> AnchorPoint {
        self.last_known
    }

    /// Resolves the anchor against the world. Never fails.
    pub fn resolve<W>(&mut self, world: &W) -> AnchorPoint
    where
        W: WorldState + ?Sized,
    {
        let Anchor::Entity(id) = self.anchor else {
            return self.last_known;
        };

        if self.lost {
            return self.last_known;
        }

        match world.lookup(id) {
            Some(position) => self.last_known = position.into(),
            None => {
                self.lost = true;
                tracing::debug!(
                    entity = id.get(),
                    tile = ?self.last_known.tile,
                    "anchor entity unavailable, freezing at last known point"
                );
            }
        }

        self.last_known
    }

    /// Moves a fixed anchor along with the effect. Entity anchors are untouched.
    pub fn follow(&mut self, tile: Tile) {
        if let Anchor::Fixed(_) = self.anchor {
            *self = Self::fixed(tile);
        }
    }

    /// Replaces the anchor with a fixed coordinate, detaching any entity.
    pub fn pin(&mut self, tile: Tile) {
        *self = Self::fixed(tile);
    }
}
