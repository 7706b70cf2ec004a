//! Painter's-algorithm frame composition.
//!
//! The compositor walks the depth scan from the farthest rendered band back
//! to the player, emitting side walls per band, the front wall only at the
//! exact occluding depth, and monster sprites inside unoccluded bands. The
//! output is a flat operation list a backend replays in order.

use crate::{
    projection::{FogSettings, Projection, Quad, ScreenRect, Side},
    Color,
};
use glam::Vec2;
use grid_crawl_core::DepthScan;

/// Per-depth brightening applied before fog so near geometry reads darker.
const DEPTH_LIGHTEN_STEP: f32 = 0.08;

/// Monster sprite width as a fraction of its band's far rectangle.
const SPRITE_WIDTH_RATIO: f32 = 0.5;
/// Monster sprite height as a fraction of its band's far rectangle.
const SPRITE_HEIGHT_RATIO: f32 = 0.6;

/// Colors used for the corridor geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallPalette {
    /// Fill for front-facing wall rectangles.
    pub front: Color,
    /// Fill for side-wall quads.
    pub side: Color,
}

impl Default for WallPalette {
    fn default() -> Self {
        Self {
            front: Color::from_rgb_u8(110, 98, 84),
            side: Color::from_rgb_u8(86, 76, 64),
        }
    }
}

/// Single screen-space draw operation.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// Axis-aligned filled rectangle.
    Rect {
        /// Rectangle in logical coordinates.
        rect: ScreenRect,
        /// Fill color.
        color: Color,
    },
    /// Filled four-point polygon.
    Quad {
        /// Polygon in logical coordinates.
        quad: Quad,
        /// Fill color.
        color: Color,
    },
    /// Labelled sprite placeholder the backend renders as it sees fit.
    Sprite {
        /// Bounding rectangle in logical coordinates.
        rect: ScreenRect,
        /// Tint combining fog brightness and alpha.
        tint: Color,
        /// Display name of the sprite's subject.
        label: String,
    },
}

/// Composed corridor view, ordered back-to-front.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Frame {
    /// Draw operations a backend replays in order.
    pub ops: Vec<DrawOp>,
}

/// Composes the corridor view for one frame.
///
/// The rendered depth count is the occluding depth plus one when the scan
/// found a wall, otherwise the projection's geometry depth limit. Bands are
/// emitted far to near so nearer geometry paints over farther geometry.
#[must_use]
pub fn compose(
    scan: &DepthScan,
    projection: &Projection,
    fog: &FogSettings,
    palette: &WallPalette,
) -> Frame {
    let occluder = scan.nearest_front();
    let depth_count = match occluder {
        Some(front) => front.saturating_add(1),
        None => projection.geometry_depth_limit(),
    };

    let mut ops = Vec::new();
    for depth in (0..depth_count).rev() {
        let (brightness, alpha) = fog.factors(depth, occluder);
        let shade = |color: Color| {
            color
                .lighten(f32::from(depth) * DEPTH_LIGHTEN_STEP)
                .scaled(brightness)
                .with_alpha(alpha)
        };

        if occluder == Some(depth) {
            // The occluding band is a bare front face; the scan records no
            // side or monster information for it.
            ops.push(DrawOp::Rect {
                rect: projection.front_rect(depth),
                color: shade(palette.front),
            });
            continue;
        }

        let Some(band) = scan.band(depth) else {
            continue;
        };
        if band.left_wall {
            ops.push(DrawOp::Quad {
                quad: projection.side_quad(depth, Side::Left),
                color: shade(palette.side),
            });
        }
        if band.right_wall {
            ops.push(DrawOp::Quad {
                quad: projection.side_quad(depth, Side::Right),
                color: shade(palette.side),
            });
        }
        if let Some(monster) = &band.monster {
            ops.push(DrawOp::Sprite {
                rect: sprite_rect(projection, depth),
                tint: Color::new(1.0, 1.0, 1.0, 1.0)
                    .scaled(brightness)
                    .with_alpha(alpha),
                label: monster.name.clone(),
            });
        }
    }

    Frame { ops }
}

/// Bounding box for a monster standing in the band at `depth`.
///
/// Sized against the band's far rectangle and anchored to its floor line so
/// the sprite shrinks with distance but stays grounded.
fn sprite_rect(projection: &Projection, depth: u16) -> ScreenRect {
    let base = projection.front_rect(depth.saturating_add(1));
    let width = base.width() * SPRITE_WIDTH_RATIO;
    let height = base.height() * SPRITE_HEIGHT_RATIO;
    let center_x = (base.min.x + base.max.x) / 2.0;

    ScreenRect::new(
        Vec2::new(center_x - width / 2.0, base.max.y - height),
        Vec2::new(center_x + width / 2.0, base.max.y),
    )
}
