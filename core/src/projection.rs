//! Conversions between world tiles and screen space.
//!
//! Two screen spaces are in use. The 3D form keeps the world axes and scales
//! them by [`TILE_HALF_WIDTH`] and [`HEIGHT_SCALE`]; duration-driven motion
//! interpolates in it because it can be split back into a tile and an offset
//! with a floor and a remainder. The 2D form is the isometric projection seen
//! by the viewer, expressed relative to a viewpoint tile; speed-driven motion
//! steps in it and snaps back to the grid through [`diamond_decompose`].

use glam::{IVec2, IVec3, Vec2, Vec3};

use crate::Tile;

/// Screen units covered by half the width of a tile.
pub const TILE_HALF_WIDTH: f32 = 22.0;

/// Screen units covered by one unit of tile altitude.
pub const HEIGHT_SCALE: f32 = 4.0;

/// Altitude added to mobile targets so effects aim at their eyes.
pub const MOBILE_EYE_HEIGHT: i32 = 8;

/// Offset every moving effect starts with, so it leaves from the sender's centre.
pub const SPAWN_OFFSET: Vec3 = Vec3::new(TILE_HALF_WIDTH, 0.0, 0.0);

const TILE_HALF_WIDTH_UNITS: i32 = 22;
const HEIGHT_SCALE_UNITS: i32 = 4;

/// Projects a tile position and sub-tile offset into 3D screen space.
#[must_use]
pub fn to_screen_3d(position: IVec3, offset: Vec3) -> Vec3 {
    let origin = position.as_vec3() * Vec3::new(TILE_HALF_WIDTH, TILE_HALF_WIDTH, HEIGHT_SCALE);
    origin
        + Vec3::new(
            (offset.x + offset.y) / 2.0,
            (offset.y - offset.x) / 2.0,
            offset.z,
        )
}

/// Splits a 3D screen point into the tile containing it and the residual offset.
#[must_use]
pub fn from_screen_3d(screen: Vec3) -> (Tile, Vec3) {
    let tile = IVec3::new(
        (screen.x / TILE_HALF_WIDTH).floor() as i32,
        (screen.y / TILE_HALF_WIDTH).floor() as i32,
        (screen.z / HEIGHT_SCALE).floor() as i32,
    );
    let residual_x = screen.x.rem_euclid(TILE_HALF_WIDTH);
    let residual_y = screen.y.rem_euclid(TILE_HALF_WIDTH);
    let residual_z = screen.z.rem_euclid(HEIGHT_SCALE);
    let offset = Vec3::new(
        residual_x - residual_y,
        residual_x + residual_y,
        residual_z,
    );
    (Tile::from_ivec3(tile), offset)
}

/// Projects a tile delta measured from the viewpoint onto the isometric screen.
#[must_use]
pub fn to_screen_2d(delta: IVec3) -> Vec2 {
    IVec2::new(
        (delta.x - delta.y) * TILE_HALF_WIDTH_UNITS,
        (delta.x + delta.y) * TILE_HALF_WIDTH_UNITS - delta.z * HEIGHT_SCALE_UNITS,
    )
    .as_vec2()
}

/// Expresses an isometric screen point in whole monitor units, truncating toward zero.
#[must_use]
pub fn screen_to_monitor(screen: Vec2) -> IVec2 {
    IVec2::new(
        (screen.x / TILE_HALF_WIDTH) as i32,
        (screen.y / TILE_HALF_WIDTH) as i32,
    )
}

/// Maps a screen offset in monitor units back onto tile deltas.
///
/// The result must stay bit-exact, including the arithmetic shifts on the
/// axes and the truncating halving elsewhere, because it decides which tile
/// a moving effect snaps to.
#[must_use]
pub fn diamond_decompose(dx: i32, dy: i32) -> IVec2 {
    if dx == 0 {
        let half = dy >> 1;
        return IVec2::new(half, half);
    }

    if dy == 0 {
        let half = dx >> 1;
        return IVec2::new(half, -half);
    }

    let abs_x = dx.abs();
    let abs_y = dy.abs();
    let both_negative = dx < 0 && dy < 0;
    let both_positive = dx > 0 && dy > 0;

    let mut y = 0;
    if abs_y > abs_x {
        if both_negative {
            y = abs_x - abs_y;
        } else if both_positive {
            y = abs_y - abs_x;
        }
    } else if abs_x > abs_y {
        if both_negative {
            y = -(abs_y - abs_x);
        } else if both_positive {
            y = -(abs_x - abs_y);
        }
    }

    if y == 0 && dx != dy {
        y = if dy < 0 {
            -(abs_x + abs_y)
        } else {
            abs_x + abs_y
        };
    }

    y /= 2;
    IVec2::new(dx + y, y)
}
