//! Depth-indexed screen geometry for the nested-rectangle corridor view.
//!
//! Every depth band projects to a front rectangle centered on the screen and
//! two side quads joining consecutive rectangles. Two strategies produce the
//! per-depth margins: a fixed anchor table tuned for a four-band view, and a
//! vanishing-point formula that supports arbitrarily deep corridors.

use crate::RenderingError;
use glam::Vec2;

/// Logical resolution all frame coordinates are expressed in.
const LOGICAL_WIDTH: f32 = 800.0;
const LOGICAL_HEIGHT: f32 = 600.0;

/// Horizontal margins for the anchor strategy, nearest depth first.
const ANCHOR_MARGINS_X: [f32; 4] = [40.0, 140.0, 220.0, 280.0];
/// Vertical margins paired with [`ANCHOR_MARGINS_X`].
const ANCHOR_MARGINS_Y: [f32; 4] = [40.0, 110.0, 160.0, 200.0];

/// Smallest front-rectangle extent still worth rasterizing.
const MIN_RECT_EXTENT: f32 = 4.0;

/// Hard cap on the geometry depth limit for the vanishing-point strategy.
const GEOMETRY_DEPTH_CAP: u16 = 256;

/// Axis-aligned screen rectangle in logical coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenRect {
    /// Top-left corner.
    pub min: Vec2,
    /// Bottom-right corner.
    pub max: Vec2,
}

impl ScreenRect {
    /// Creates a rectangle from its top-left and bottom-right corners.
    #[must_use]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Horizontal extent of the rectangle.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Vertical extent of the rectangle.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

/// Four-point polygon in logical coordinates, wound top-near first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    /// Corner points in draw order.
    pub points: [Vec2; 4],
}

/// Which flank of a depth band a side quad belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// The player's left.
    Left,
    /// The player's right.
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Strategy {
    Anchors,
    VanishingPoint { k: f32 },
}

/// Maps discrete depth indices to nested screen rectangles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    strategy: Strategy,
}

impl Projection {
    /// Creates a projection driven by the fixed anchor table.
    #[must_use]
    pub const fn anchors() -> Self {
        Self {
            strategy: Strategy::Anchors,
        }
    }

    /// Creates a projection converging on the screen center.
    ///
    /// `k` controls how quickly depths approach the vanishing point; margins
    /// never reach the center for any finite depth. Returns an error when `k`
    /// is not positive.
    pub fn vanishing_point(k: f32) -> Result<Self, RenderingError> {
        if !(k > 0.0) {
            return Err(RenderingError::InvalidConvergence { k });
        }

        Ok(Self {
            strategy: Strategy::VanishingPoint { k },
        })
    }

    /// Logical resolution the produced geometry is expressed in.
    #[must_use]
    pub const fn logical_size(&self) -> Vec2 {
        Vec2::new(LOGICAL_WIDTH, LOGICAL_HEIGHT)
    }

    fn margins(&self, depth: u16) -> Vec2 {
        match self.strategy {
            Strategy::Anchors => {
                let index = usize::from(depth).min(ANCHOR_MARGINS_X.len() - 1);
                Vec2::new(ANCHOR_MARGINS_X[index], ANCHOR_MARGINS_Y[index])
            }
            Strategy::VanishingPoint { k } => {
                let depth = f32::from(depth);
                let margin_x = (LOGICAL_WIDTH / 2.0) * depth / (depth + k);
                // The vertical margin scales with the horizontal one so the
                // side-quad edges stay straight lines towards the center.
                let margin_y = margin_x * (LOGICAL_HEIGHT / LOGICAL_WIDTH);
                Vec2::new(margin_x, margin_y)
            }
        }
    }

    /// Screen rectangle of the wall face presented at `depth`.
    #[must_use]
    pub fn front_rect(&self, depth: u16) -> ScreenRect {
        let margins = self.margins(depth);
        ScreenRect::new(
            margins,
            Vec2::new(LOGICAL_WIDTH - margins.x, LOGICAL_HEIGHT - margins.y),
        )
    }

    /// Side-wall polygon joining the rectangles at `depth` and `depth + 1`.
    #[must_use]
    pub fn side_quad(&self, depth: u16, side: Side) -> Quad {
        let near = self.margins(depth);
        let far = self.margins(depth.saturating_add(1));
        let (near_x, far_x) = match side {
            Side::Left => (near.x, far.x),
            Side::Right => (LOGICAL_WIDTH - near.x, LOGICAL_WIDTH - far.x),
        };

        Quad {
            points: [
                Vec2::new(near_x, near.y),
                Vec2::new(near_x, LOGICAL_HEIGHT - near.y),
                Vec2::new(far_x, LOGICAL_HEIGHT - far.y),
                Vec2::new(far_x, far.y),
            ],
        }
    }

    /// Number of depth bands worth rendering when no wall occludes the view.
    ///
    /// Anchor margins stop changing past the last table entry, so the table
    /// length bounds the useful depth. The vanishing-point strategy marches
    /// until the front rectangle drops below a minimum extent.
    #[must_use]
    pub fn geometry_depth_limit(&self) -> u16 {
        match self.strategy {
            Strategy::Anchors => ANCHOR_MARGINS_X.len() as u16,
            Strategy::VanishingPoint { .. } => {
                let mut depth = 0;
                while depth < GEOMETRY_DEPTH_CAP {
                    let rect = self.front_rect(depth + 1);
                    if rect.width() < MIN_RECT_EXTENT || rect.height() < MIN_RECT_EXTENT {
                        break;
                    }
                    depth += 1;
                }
                depth
            }
        }
    }
}

/// Linear fog window applied to depth bands beyond the near threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FogSettings {
    /// Last depth rendered fully solid.
    pub near: u16,
    /// Depth at which the far values are fully reached.
    pub far: u16,
    /// Brightness multiplier applied at `far` and beyond.
    pub far_brightness: f32,
    /// Alpha value applied at `far` and beyond.
    pub far_alpha: f32,
}

impl FogSettings {
    /// Creates a fog window.
    ///
    /// Returns an error when the window ends before it starts.
    pub fn new(
        near: u16,
        far: u16,
        far_brightness: f32,
        far_alpha: f32,
    ) -> Result<Self, RenderingError> {
        if far < near {
            return Err(RenderingError::InvalidFogWindow { near, far });
        }

        Ok(Self {
            near,
            far,
            far_brightness: far_brightness.clamp(0.0, 1.0),
            far_alpha: far_alpha.clamp(0.0, 1.0),
        })
    }

    /// Brightness and alpha factors for a band at `depth`.
    ///
    /// The nearest occluding depth is exempt: the front face must stay solid
    /// even when it sits deep inside the fog window, otherwise a long
    /// corridor's end wall fades out entirely.
    #[must_use]
    pub fn factors(&self, depth: u16, occluder: Option<u16>) -> (f32, f32) {
        if occluder == Some(depth) || depth <= self.near {
            return (1.0, 1.0);
        }

        let t = if self.far == self.near {
            1.0
        } else {
            (f32::from(depth - self.near) / f32::from(self.far - self.near)).min(1.0)
        };

        (
            1.0 + (self.far_brightness - 1.0) * t,
            1.0 + (self.far_alpha - 1.0) * t,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_margins_grow_with_depth_and_clamp_past_the_table() {
        let projection = Projection::anchors();

        for depth in 0..6 {
            let near = projection.front_rect(depth);
            let far = projection.front_rect(depth + 1);
            assert!(far.min.x >= near.min.x, "depth {depth} shrank");
            assert!(far.width() <= near.width());
        }
        assert_eq!(projection.front_rect(4), projection.front_rect(40));
    }

    #[test]
    fn vanishing_margins_converge_without_reaching_the_center() {
        let projection = Projection::vanishing_point(2.0).expect("positive k");

        let mut previous = -1.0;
        for depth in 0..200 {
            let rect = projection.front_rect(depth);
            assert!(rect.min.x > previous, "margin must strictly grow");
            assert!(rect.min.x < LOGICAL_WIDTH / 2.0);
            assert!(rect.min.y < LOGICAL_HEIGHT / 2.0);
            assert!(rect.width() > 0.0);
            previous = rect.min.x;
        }
    }

    #[test]
    fn vanishing_point_rejects_non_positive_constants() {
        assert!(Projection::vanishing_point(0.0).is_err());
        assert!(Projection::vanishing_point(-1.0).is_err());
    }

    #[test]
    fn side_quads_join_consecutive_rectangles() {
        let projection = Projection::anchors();
        let quad = projection.side_quad(1, Side::Left);
        let near = projection.front_rect(1);
        let far = projection.front_rect(2);

        assert_eq!(quad.points[0], near.min);
        assert_eq!(quad.points[3], far.min);
    }

    #[test]
    fn right_quads_mirror_left_quads() {
        let projection = Projection::anchors();
        let left = projection.side_quad(0, Side::Left);
        let right = projection.side_quad(0, Side::Right);

        for (l, r) in left.points.iter().zip(right.points.iter()) {
            assert_eq!(r.x, LOGICAL_WIDTH - l.x);
            assert_eq!(r.y, l.y);
        }
    }

    #[test]
    fn geometry_depth_limit_bounds_both_strategies() {
        assert_eq!(Projection::anchors().geometry_depth_limit(), 4);

        let vanishing = Projection::vanishing_point(2.0).expect("positive k");
        let limit = vanishing.geometry_depth_limit();
        assert!(limit > 4);
        assert!(limit <= 256);
        let last = vanishing.front_rect(limit);
        assert!(last.width() >= 4.0);
        assert!(last.height() >= 4.0);
    }

    #[test]
    fn fog_rejects_inverted_windows() {
        assert!(FogSettings::new(5, 2, 0.35, 0.55).is_err());
    }

    #[test]
    fn fog_attenuates_linearly_and_exempts_the_occluder() {
        let fog = FogSettings::new(1, 5, 0.5, 0.0).expect("valid window");

        assert_eq!(fog.factors(0, None), (1.0, 1.0));
        assert_eq!(fog.factors(1, None), (1.0, 1.0));
        let (brightness, alpha) = fog.factors(3, None);
        assert!((brightness - 0.75).abs() < 1e-6);
        assert!((alpha - 0.5).abs() < 1e-6);
        assert_eq!(fog.factors(5, None), (0.5, 0.0));
        assert_eq!(fog.factors(9, None), (0.5, 0.0));
        // The occluding depth stays solid regardless of the window.
        assert_eq!(fog.factors(5, Some(5)), (1.0, 1.0));
    }
}
