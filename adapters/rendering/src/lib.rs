#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for the first-person dungeon view.
//!
//! The crate turns a depth scan of the corridor ahead of the player into a
//! flat list of screen-space draw operations. Backends stay dumb: they clear
//! the screen, replay the operations and print the HUD, and never touch game
//! state.

use anyhow::Result as AnyResult;
use glam::Vec2;
use grid_crawl_core::{Facing, GridPos};
use std::{error::Error, fmt, time::Duration};

mod compositor;
mod projection;

pub use compositor::{compose, DrawOp, Frame, WallPalette};
pub use projection::{FogSettings, Projection, Quad, ScreenRect, Side};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Returns a new color with every channel scaled towards black.
    #[must_use]
    pub fn scaled(self, brightness: f32) -> Self {
        let brightness = brightness.clamp(0.0, 1.0);

        Self {
            red: self.red * brightness,
            green: self.green * brightness,
            blue: self.blue * brightness,
            alpha: self.alpha,
        }
    }

    /// Returns the same color with a replacement alpha channel.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Whether a turn-left press was detected on this frame.
    pub turn_left: bool,
    /// Whether a turn-right press was detected on this frame.
    pub turn_right: bool,
    /// Whether a step-forward press was detected on this frame.
    pub step_forward: bool,
    /// Whether a step-back press was detected on this frame.
    pub step_back: bool,
    /// Whether the save shortcut was pressed on this frame.
    pub save_requested: bool,
    /// Whether the load shortcut was pressed on this frame.
    pub load_requested: bool,
}

/// Player status displayed alongside the corridor view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HudState {
    /// Player position in grid coordinates.
    pub position: GridPos,
    /// Direction the player is facing.
    pub facing: Facing,
    /// Remaining hit points.
    pub hp: i32,
    /// Gold carried by the player.
    pub gold: i32,
    /// Name and attack bonus of the equipped weapon, if any.
    pub weapon: Option<(String, i32)>,
    /// Event messages drained from the world on this frame, oldest first.
    pub messages: Vec<String>,
}

impl Default for HudState {
    fn default() -> Self {
        Self {
            position: GridPos::new(0, 0),
            facing: Facing::North,
            hp: 0,
            gold: 0,
            weapon: None,
            messages: Vec::new(),
        }
    }
}

/// Scene description combining the composed frame and HUD state.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Draw operations for the corridor view, ordered back-to-front.
    pub frame: Frame,
    /// Player status shown by the HUD.
    pub hud: HudState,
    /// Fill color for the upper half of the view.
    pub ceiling: Color,
    /// Fill color for the lower half of the view.
    pub floor: Color,
    /// Logical resolution the frame coordinates are expressed in.
    pub logical_size: Vec2,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(frame: Frame, hud: HudState, ceiling: Color, floor: Color, logical_size: Vec2) -> Self {
        Self {
            frame,
            hud,
            ceiling,
            floor,
            logical_size,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting dungeon scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta,
    /// per-frame input captured by the adapter, and may mutate the scene
    /// before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The vanishing-point convergence constant must be positive.
    InvalidConvergence {
        /// Provided constant that failed validation.
        k: f32,
    },
    /// The fog window must not end before it starts.
    InvalidFogWindow {
        /// First fogged depth.
        near: u16,
        /// Depth at which the far values are fully reached.
        far: u16,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConvergence { k } => {
                write!(f, "convergence constant must be positive (received {k})")
            }
            Self::InvalidFogWindow { near, far } => {
                write!(f, "fog window must satisfy near <= far (received {near}..{far})")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lighten_moves_channels_towards_white() {
        let color = Color::from_rgb_u8(100, 150, 200).lighten(0.5);

        assert!(color.red > 100.0 / 255.0);
        assert!(color.green > 150.0 / 255.0);
        assert!(color.blue > 200.0 / 255.0);
        assert_eq!(color.alpha, 1.0);
    }

    #[test]
    fn scaled_preserves_alpha_and_clamps_brightness() {
        let color = Color::new(0.8, 0.4, 0.2, 0.9).scaled(1.5);

        assert_eq!(color, Color::new(0.8, 0.4, 0.2, 0.9));
        assert_eq!(Color::new(1.0, 1.0, 1.0, 1.0).scaled(0.5).red, 0.5);
    }

    #[test]
    fn with_alpha_replaces_only_the_alpha_channel() {
        let color = Color::from_rgb_u8(10, 20, 30).with_alpha(0.25);

        assert_eq!(color.alpha, 0.25);
        assert_eq!(color.red, 10.0 / 255.0);
    }
}
