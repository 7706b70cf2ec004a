#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-frame visibility probe for the first-person corridor view.
//!
//! The probe ray-marches the camera's forward corridor one cell at a time:
//! band `d` covers the cell `d + 1` steps ahead, and for each band the cells
//! one step to the camera's left and right decide where side walls appear.
//! The march stops at the first straight-ahead wall, the nearest front
//! occluder; rendering never needs anything beyond it. The scan owns no
//! state and is recomputed every frame.

use grid_crawl_core::{DepthBand, DepthScan, MonsterMarker};
use grid_crawl_world::{query, World};

/// Upper bound on forward ray steps, guarding against unenclosed grids.
pub const MAX_RAY_DEPTH: u16 = 256;

/// Scans the corridor ahead of the player.
///
/// `max_depth` bounds how many bands are recorded; it is clamped to
/// [`MAX_RAY_DEPTH`]. When no wall is found within the bound,
/// [`DepthScan::nearest_front`] is `None` and the caller falls back to its
/// geometry depth limit.
#[must_use]
pub fn scan(world: &World, max_depth: u16) -> DepthScan {
    let limit = max_depth.min(MAX_RAY_DEPTH);
    let mut bands = Vec::with_capacity(usize::from(limit.min(16)));
    let mut nearest_front = None;

    for depth in 0..limit {
        let forward = i32::from(depth) + 1;
        let ahead = world.transform_local(forward, 0);

        if query::is_wall(world, ahead.x(), ahead.y()) {
            // The occluding band carries no side or monster information;
            // the compositor draws its front face and stops.
            bands.push(DepthBand::default());
            nearest_front = Some(depth);
            break;
        }

        let left = world.transform_local(forward, -1);
        let right = world.transform_local(forward, 1);
        bands.push(DepthBand {
            left_wall: query::is_wall(world, left.x(), left.y()),
            right_wall: query::is_wall(world, right.x(), right.y()),
            monster: query::monster_at(world, ahead).map(|monster| MonsterMarker {
                name: monster.name,
                hp: monster.hp,
            }),
        });
    }

    DepthScan::from_parts(bands, nearest_front)
}
