#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the dungeon crawl.

mod save;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use grid_crawl_core::Command;
use grid_crawl_rendering::{
    compose, Color, FogSettings, Frame, FrameInput, HudState, Presentation, Projection,
    RenderingBackend, Scene, WallPalette,
};
use grid_crawl_rendering_macroquad::MacroquadBackend;
use grid_crawl_system_visibility::{scan, MAX_RAY_DEPTH};
use grid_crawl_world::{apply, query, restore, snapshot, DungeonConfig, World};
use std::path::PathBuf;

/// Convergence constant for the vanishing-point projection.
const VANISHING_K: f32 = 2.0;

/// Depth at which fog starts to attenuate.
const FOG_NEAR: u16 = 1;
/// Brightness multiplier at the far end of the fog window.
const FOG_FAR_BRIGHTNESS: f32 = 0.35;
/// Alpha at the far end of the fog window.
const FOG_FAR_ALPHA: f32 = 0.55;

/// Number of HUD message lines retained between frames.
const MESSAGE_HISTORY: usize = 6;

/// Projection strategy selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ProjectionKind {
    /// Fixed anchor table with four nested depth rectangles.
    Anchors,
    /// Vanishing-point formula supporting arbitrarily deep corridors.
    Vanishing,
}

/// First-person grid dungeon crawl.
#[derive(Debug, Parser)]
#[command(name = "grid-crawl")]
struct Args {
    /// Dungeon width in cells, normalised to an odd value of at least five.
    #[arg(long, default_value_t = 21)]
    width: u32,
    /// Dungeon height in cells, normalised to an odd value of at least five.
    #[arg(long, default_value_t = 21)]
    height: u32,
    /// Maze seed; a random seed is drawn when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Projection strategy for the corridor view.
    #[arg(long, value_enum, default_value = "anchors")]
    projection: ProjectionKind,
    /// Path of the save file written by F5 and read by F9.
    #[arg(long, default_value = "grid-crawl-save.json")]
    save_path: PathBuf,
    /// Synchronise presentation with the display refresh rate.
    #[arg(long)]
    vsync: bool,
    /// Print frame rate metrics once per second.
    #[arg(long)]
    show_fps: bool,
}

/// Entry point for the dungeon crawl command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut world = World::new(DungeonConfig::new(args.width, args.height, seed));

    let projection = match args.projection {
        ProjectionKind::Anchors => Projection::anchors(),
        ProjectionKind::Vanishing => Projection::vanishing_point(VANISHING_K)
            .context("failed to configure the vanishing-point projection")?,
    };
    let fog = FogSettings::new(
        FOG_NEAR,
        projection.geometry_depth_limit(),
        FOG_FAR_BRIGHTNESS,
        FOG_FAR_ALPHA,
    )
    .context("failed to configure the fog window")?;
    let palette = WallPalette::default();
    let save_path = args.save_path;

    let scene = Scene::new(
        Frame::default(),
        HudState::default(),
        Color::from_rgb_u8(36, 34, 52),
        Color::from_rgb_u8(52, 44, 36),
        projection.logical_size(),
    );
    let presentation = Presentation::new("Grid Crawl", Color::from_rgb_u8(12, 10, 8), scene);

    let backend = MacroquadBackend::new()
        .with_vsync(args.vsync)
        .with_show_fps(args.show_fps);

    let mut messages: Vec<String> = Vec::new();
    let mut events = Vec::new();
    backend.run(presentation, move |_frame_dt, input, scene| {
        events.clear();
        for command in commands_from(input) {
            apply(&mut world, command, &mut events);
        }

        if input.save_requested {
            match save::write_save(&save_path, &snapshot(&world)) {
                Ok(()) => messages.push(format!("Saved to {}.", save_path.display())),
                Err(error) => messages.push(format!("Save failed: {error}.")),
            }
        }
        if input.load_requested {
            match save::read_save(&save_path) {
                Ok(record) => {
                    restore(&mut world, &record);
                    messages.push(format!("Loaded {}.", save_path.display()));
                }
                Err(error) => messages.push(format!("Load failed: {error}.")),
            }
        }

        messages.extend(world.drain_messages());
        if messages.len() > MESSAGE_HISTORY {
            let excess = messages.len() - MESSAGE_HISTORY;
            drop(messages.drain(..excess));
        }

        let depth_scan = scan(&world, MAX_RAY_DEPTH);
        scene.frame = compose(&depth_scan, &projection, &fog, &palette);
        scene.hud = hud_state(&world, &messages);
    })
}

fn commands_from(input: FrameInput) -> Vec<Command> {
    let mut commands = Vec::new();
    if input.turn_left {
        commands.push(Command::TurnLeft);
    }
    if input.turn_right {
        commands.push(Command::TurnRight);
    }
    if input.step_forward {
        commands.push(Command::StepForward);
    }
    if input.step_back {
        commands.push(Command::StepBack);
    }
    commands
}

fn hud_state(world: &World, messages: &[String]) -> HudState {
    let player = query::player(world);

    HudState {
        position: player.position,
        facing: player.facing,
        hp: player.hp,
        gold: player.gold,
        weapon: player
            .weapon
            .map(|weapon| (weapon.name().to_owned(), weapon.attack())),
        messages: messages.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_follow_the_pressed_shortcuts() {
        let input = FrameInput {
            turn_left: true,
            step_forward: true,
            ..FrameInput::default()
        };

        assert_eq!(
            commands_from(input),
            vec![Command::TurnLeft, Command::StepForward]
        );
    }

    #[test]
    fn idle_frames_produce_no_commands() {
        assert!(commands_from(FrameInput::default()).is_empty());
    }

    #[test]
    fn hud_reflects_the_player_snapshot() {
        let world = World::new(DungeonConfig::default());
        let messages = vec!["You found 5 gold.".to_owned()];

        let hud = hud_state(&world, &messages);

        assert_eq!(hud.position, query::player(&world).position);
        assert_eq!(hud.hp, query::player(&world).hp);
        assert_eq!(hud.messages, messages);
    }
}
