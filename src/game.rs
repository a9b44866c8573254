//! World setup and the per-frame loop shared by the binary and tests.
//!
//! One frame is: advance [`WorldTime`], run the update [`Schedule`]
//! (animation cursors), then a render pass. Particle systems age as they are
//! drawn, so the render pass is part of the frame even in headless mode.

use std::path::Path;

use bevy_ecs::prelude::*;
use log::{debug, info};
use serde::Serialize;

use crate::error::{Result, TilesparkError};
use crate::resources::drawlist::{DrawList, DrawSummary};
use crate::resources::projection::Projection;
use crate::resources::worldtime::WorldTime;
use crate::scene::Scene;
use crate::systems::animation::animation;
use crate::systems::render::record_draw_list;
use crate::systems::time::update_world_time;

/// Summary of a headless run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub frames: u64,
    pub seed: u64,
    pub entities: usize,
    pub elapsed: f32,
    /// Draw counts of the last frame.
    pub last_frame: DrawSummary,
    /// Draw counts summed over every frame.
    pub totals: DrawSummary,
}

impl FrameReport {
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| TilesparkError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Frame report written to {}", path.display());
        Ok(())
    }
}

/// Update systems run once per frame before rendering.
pub fn update_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(animation);
    schedule
}

/// Create a world holding the scene's resources and entities.
pub fn setup_world(scene: Scene, seed: u64) -> Result<World> {
    let mut world = World::new();
    world.insert_resource(WorldTime::default().with_time_scale(1.0));
    world.insert_resource(Projection::default());
    world.insert_resource(DrawList::new());
    let mut rng = fastrand::Rng::with_seed(seed);
    scene.install(&mut world, &mut rng)?;
    Ok(world)
}

/// Advance time and animations, then record the frame into the world's [`DrawList`].
pub fn run_frame(world: &mut World, schedule: &mut Schedule, dt: f32) {
    update_world_time(world, dt);
    schedule.run(world);
    record_draw_list(world);
}

fn add(acc: &mut DrawSummary, frame: &DrawSummary) {
    acc.point_draws += frame.point_draws;
    acc.particles += frame.particles;
    acc.textures += frame.textures;
    acc.texts += frame.texts;
}

/// Run `frames` frames without a window.
pub fn run_headless(world: &mut World, frames: u64, dt: f32, seed: u64) -> FrameReport {
    let mut schedule = update_schedule();
    let mut totals = DrawSummary::default();
    let mut last_frame = DrawSummary::default();
    for frame in 0..frames {
        run_frame(world, &mut schedule, dt);
        last_frame = world.resource::<DrawList>().summary();
        add(&mut totals, &last_frame);
        debug!("Frame {}: {:?}", frame, last_frame);
    }
    let entities = world.query::<Entity>().iter(world).count();
    let report = FrameReport {
        frames,
        seed,
        entities,
        elapsed: world.resource::<WorldTime>().elapsed,
        last_frame,
        totals,
    };
    info!(
        "Headless run: {} frames, {} entities, {} particle draws, {} textures, {} texts",
        report.frames, report.entities, totals.point_draws, totals.textures, totals.texts
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = "
[particles.sparks]
generations = 3
particles_per_generation = 2

[entity.sparks]
particles = sparks

[entity.label]
text = hi
";

    #[test]
    fn test_headless_counts_draws() {
        let scene = Scene::load_from_str(SCENE).unwrap();
        let mut world = setup_world(scene, 7).unwrap();
        let report = run_headless(&mut world, 3, 0.5, 7);
        assert_eq!(report.frames, 3);
        assert_eq!(report.entities, 2);
        assert_eq!(report.last_frame.point_draws, 3);
        assert_eq!(report.last_frame.particles, 6);
        assert_eq!(report.totals.texts, 3);
        assert!((report.elapsed - 1.5).abs() < 1e-6);
    }

    fn empty_report() -> FrameReport {
        FrameReport {
            frames: 0,
            seed: 0,
            entities: 0,
            elapsed: 0.0,
            last_frame: DrawSummary::default(),
            totals: DrawSummary::default(),
        }
    }

    #[test]
    fn test_report_write_failure_is_io_error() {
        let path = std::env::temp_dir().join("tilespark-no-such-dir").join("nested").join("report.json");
        let err = empty_report().write_json(&path).unwrap_err();
        assert!(matches!(err, TilesparkError::Io { path: ref p, .. } if *p == path));
    }

    #[test]
    fn test_report_written_as_json() {
        let path = std::env::temp_dir().join(format!("tilespark-report-{}.json", std::process::id()));
        empty_report().write_json(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["frames"], 0);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_report_serializes() {
        let report = FrameReport {
            frames: 1,
            seed: 2,
            entities: 0,
            elapsed: 0.0,
            last_frame: DrawSummary::default(),
            totals: DrawSummary::default(),
        };
        let value: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["frames"], 1);
        assert_eq!(value["totals"]["particles"], 0);
    }
}
