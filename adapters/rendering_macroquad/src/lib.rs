#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for the dungeon view.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The backend replays the composed draw operations in order, scales the
//! logical resolution to the window with letterboxing, and prints the HUD
//! with macroquad's text primitives. It owns no game state beyond the scene
//! handed to the update closure.

use anyhow::Result;
use glam::Vec2;
use grid_crawl_rendering::{
    Color, DrawOp, FrameInput, Presentation, RenderingBackend, Scene, ScreenRect,
};
use macroquad::input::{is_key_pressed, KeyCode};
use macroquad::math::Vec2 as MacroquadVec2;
use std::time::Duration;

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Left` or `A` rotates the player counter-clockwise.
    turn_left: bool,
    /// `Right` or `D` rotates the player clockwise.
    turn_right: bool,
    /// `Up` or `W` steps toward the current facing.
    step_forward: bool,
    /// `Down` or `S` steps away from the current facing.
    step_back: bool,
    /// `F5` writes the save file.
    save_pressed: bool,
    /// `F9` reloads the save file.
    load_pressed: bool,
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            turn_left: is_key_pressed(KeyCode::Left) || is_key_pressed(KeyCode::A),
            turn_right: is_key_pressed(KeyCode::Right) || is_key_pressed(KeyCode::D),
            step_forward: is_key_pressed(KeyCode::Up) || is_key_pressed(KeyCode::W),
            step_back: is_key_pressed(KeyCode::Down) || is_key_pressed(KeyCode::S),
            save_pressed: is_key_pressed(KeyCode::F5),
            load_pressed: is_key_pressed(KeyCode::F9),
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
        }
    }
}

fn frame_input_from(keyboard: KeyboardShortcuts) -> FrameInput {
    FrameInput {
        turn_left: keyboard.turn_left,
        turn_right: keyboard.turn_right,
        step_forward: keyboard.step_forward,
        step_back: keyboard.step_back,
        save_requested: keyboard.save_pressed,
        load_requested: keyboard.load_pressed,
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Copy, Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display
    /// refresh rate or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend prints frame rate metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Clone, Copy, Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second average once one
    /// second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let per_second = if seconds <= f32::EPSILON {
            0.0
        } else {
            self.frames as f32 / seconds
        };
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(per_second)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: scene.logical_size.x as i32,
            window_height: scene.logical_size.y as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));

                update_scene(frame_dt, frame_input_from(keyboard), &mut scene);

                let metrics = SceneMetrics::new(
                    scene.logical_size,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );

                draw_backdrop(&scene, &metrics);
                for op in &scene.frame.ops {
                    draw_op(op, &metrics);
                }
                draw_hud(&scene, &metrics);

                if show_fps {
                    if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                        println!("FPS: {per_second:.2}");
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Maps logical scene coordinates onto the physical window with letterboxing.
#[derive(Clone, Copy, Debug)]
struct SceneMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
}

impl SceneMetrics {
    fn new(logical_size: Vec2, screen_width: f32, screen_height: f32) -> Self {
        let scale = if logical_size.x <= f32::EPSILON || logical_size.y <= f32::EPSILON {
            1.0
        } else {
            (screen_width / logical_size.x).min(screen_height / logical_size.y)
        };
        let offset_x = (screen_width - logical_size.x * scale) * 0.5;
        let offset_y = (screen_height - logical_size.y * scale) * 0.5;

        Self {
            scale,
            offset_x,
            offset_y,
        }
    }

    fn point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            self.offset_x + point.x * self.scale,
            self.offset_y + point.y * self.scale,
        )
    }

    fn rect(&self, rect: &ScreenRect) -> (f32, f32, f32, f32) {
        let min = self.point(rect.min);
        (
            min.x,
            min.y,
            rect.width() * self.scale,
            rect.height() * self.scale,
        )
    }
}

fn draw_backdrop(scene: &Scene, metrics: &SceneMetrics) {
    let top_left = metrics.point(Vec2::ZERO);
    let width = scene.logical_size.x * metrics.scale;
    let half_height = scene.logical_size.y * metrics.scale * 0.5;

    macroquad::shapes::draw_rectangle(
        top_left.x,
        top_left.y,
        width,
        half_height,
        to_macroquad_color(scene.ceiling),
    );
    macroquad::shapes::draw_rectangle(
        top_left.x,
        top_left.y + half_height,
        width,
        half_height,
        to_macroquad_color(scene.floor),
    );
}

fn draw_op(op: &DrawOp, metrics: &SceneMetrics) {
    match op {
        DrawOp::Rect { rect, color } => {
            let (x, y, width, height) = metrics.rect(rect);
            macroquad::shapes::draw_rectangle(x, y, width, height, to_macroquad_color(*color));
        }
        DrawOp::Quad { quad, color } => {
            let points: Vec<Vec2> = quad.points.iter().map(|p| metrics.point(*p)).collect();
            let color = to_macroquad_color(*color);
            macroquad::shapes::draw_triangle(
                MacroquadVec2::new(points[0].x, points[0].y),
                MacroquadVec2::new(points[1].x, points[1].y),
                MacroquadVec2::new(points[2].x, points[2].y),
                color,
            );
            macroquad::shapes::draw_triangle(
                MacroquadVec2::new(points[0].x, points[0].y),
                MacroquadVec2::new(points[2].x, points[2].y),
                MacroquadVec2::new(points[3].x, points[3].y),
                color,
            );
        }
        DrawOp::Sprite { rect, tint, label } => {
            let (x, y, width, height) = metrics.rect(rect);
            let body = Color::from_rgb_u8(150, 40, 46);
            let fill = Color::new(
                body.red * tint.red,
                body.green * tint.green,
                body.blue * tint.blue,
                tint.alpha,
            );
            macroquad::shapes::draw_rectangle(x, y, width, height, to_macroquad_color(fill));
            macroquad::shapes::draw_rectangle_lines(
                x,
                y,
                width,
                height,
                2.0,
                to_macroquad_color(fill.lighten(0.3)),
            );

            let font_size = (16.0 * metrics.scale).max(10.0);
            let text_width = macroquad::text::measure_text(label, None, font_size as u16, 1.0).width;
            macroquad::text::draw_text(
                label,
                x + (width - text_width) * 0.5,
                y - 4.0 * metrics.scale,
                font_size,
                to_macroquad_color(Color::new(1.0, 1.0, 1.0, tint.alpha)),
            );
        }
    }
}

fn draw_hud(scene: &Scene, metrics: &SceneMetrics) {
    let hud = &scene.hud;
    let text_color = to_macroquad_color(Color::new(0.92, 0.9, 0.82, 1.0));
    let font_size = (18.0 * metrics.scale).max(12.0);
    let line_step = font_size * 1.2;
    let left = metrics.offset_x + 8.0 * metrics.scale;
    let mut cursor = metrics.offset_y + line_step;

    let status = format!(
        "({}, {}) facing {}",
        hud.position.x(),
        hud.position.y(),
        hud.facing.label()
    );
    macroquad::text::draw_text(&status, left, cursor, font_size, text_color);
    cursor += line_step;

    let vitals = match &hud.weapon {
        Some((name, attack)) => {
            format!("HP {}  Gold {}  {} (+{})", hud.hp, hud.gold, name, attack)
        }
        None => format!("HP {}  Gold {}  unarmed", hud.hp, hud.gold),
    };
    macroquad::text::draw_text(&vitals, left, cursor, font_size, text_color);

    // Most recent messages sit above the bottom edge, oldest first.
    let visible = hud.messages.iter().rev().take(3).rev();
    let count = hud.messages.len().min(3) as f32;
    let mut message_y =
        metrics.offset_y + scene.logical_size.y * metrics.scale - line_step * count;
    for message in visible {
        macroquad::text::draw_text(message, left, message_y, font_size, text_color);
        message_y += line_step;
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
