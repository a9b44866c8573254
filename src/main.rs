//! Tilespark demo binary.
//!
//! Loads a scene INI file (tilesets, animations, particle systems and
//! entities) and either renders it in a raylib window (`raylib` feature) or
//! runs it headless into a recording draw list.
//!
//! ```sh
//! cargo run -- --headless --frames 120 --report report.json
//! cargo run --features raylib -- --config assets/demo.ini
//! ```

use std::path::PathBuf;

use clap::Parser;
use log::{error, info};

use tilespark::Result;
use tilespark::game::{run_headless, setup_world};
use tilespark::resources::gameconfig::DEFAULT_CONFIG_PATH;
use tilespark::scene::Scene;

const DEFAULT_HEADLESS_FRAMES: u64 = 250;

/// Tilespark 2D
#[derive(Parser)]
#[command(version, about = "Tile animation and particle renderer on bevy_ecs")]
struct Cli {
    /// Scene configuration file.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Stop after N frames. Headless runs default to 250.
    #[arg(long, value_name = "N")]
    frames: Option<u64>,

    /// Run without a window, recording draws instead of rasterizing.
    #[arg(long)]
    headless: bool,

    /// Write the headless frame report as JSON to PATH.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Seed for particle sampling.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    info!("Loading scene from {}", cli.config.display());
    let scene = Scene::load_from_file(&cli.config)?;
    if cli.headless {
        headless(scene, cli)
    } else {
        windowed(scene, cli)
    }
}

fn headless(scene: Scene, cli: &Cli) -> Result<()> {
    let dt = scene.config.frame_delta();
    let mut world = setup_world(scene, cli.seed)?;
    let frames = cli.frames.unwrap_or(DEFAULT_HEADLESS_FRAMES);
    let report = run_headless(&mut world, frames, dt, cli.seed);
    if let Some(path) = &cli.report {
        report.write_json(path)?;
    }
    Ok(())
}

#[cfg(feature = "raylib")]
fn windowed(scene: Scene, cli: &Cli) -> Result<()> {
    window::run(scene, cli)
}

#[cfg(not(feature = "raylib"))]
fn windowed(scene: Scene, cli: &Cli) -> Result<()> {
    log::warn!("Built without the raylib feature, running headless");
    headless(scene, cli)
}

#[cfg(feature = "raylib")]
mod window {
    use raylib::prelude::*;

    use tilespark::Result;
    use tilespark::game::{setup_world, update_schedule};
    use tilespark::scene::Scene;
    use tilespark::systems::raylib_render::{RaylibContext, TextureStore};
    use tilespark::systems::render::render_pass;
    use tilespark::systems::time::update_world_time;

    use super::Cli;

    pub fn run(scene: Scene, cli: &Cli) -> Result<()> {
        let config = scene.config.clone();
        let mut builder = raylib::init();
        builder
            .size(config.window_width as i32, config.window_height as i32)
            .title("Tilespark")
            .resizable();
        if config.vsync {
            builder.vsync();
        }
        if config.fullscreen {
            builder.fullscreen();
        }
        let (mut rl, thread) = builder.build();
        rl.set_target_fps(config.target_fps);

        let textures = TextureStore::load(&mut rl, &thread, &scene.tilesets)?;
        let mut world = setup_world(scene, cli.seed)?;
        let mut schedule = update_schedule();

        let mut frames = 0u64;
        while !rl.window_should_close() && cli.frames.is_none_or(|n| frames < n) {
            update_world_time(&mut world, rl.get_frame_time());
            let (width, height) = (rl.get_screen_width().max(1), rl.get_screen_height().max(1));
            world.insert_resource(config.window_projection(width as u32, height as u32));
            schedule.run(&mut world);

            let mut d = rl.begin_drawing(&thread);
            d.clear_background(Color::BLACK);
            let mut ctx = RaylibContext::new(&mut d, &textures);
            render_pass(&mut world, &mut ctx);
            frames += 1;
        }
        log::info!("Window closed after {} frames", frames);
        Ok(())
    }
}
