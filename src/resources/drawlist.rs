//! Recording render context.
//!
//! [`DrawList`] implements [`RenderContext`] by recording every submission
//! as a [`DrawOp`] instead of rasterizing. The headless binary mode renders
//! into it, and tests inspect it to check draw order and particle ranges.

use bevy_ecs::prelude::Resource;
use glam::{Mat4, Vec2};
use log::warn;
use serde::Serialize;

use crate::components::drawable::Text;
use crate::render::{DrawCommand, ParticleVertex, RenderContext};
use crate::resources::tileset::TileRect;

/// One recorded submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawOp {
    Points {
        transform: Mat4,
        life: i32,
        command: DrawCommand,
    },
    Texture {
        transform: Mat4,
        tex_key: String,
        src: Option<TileRect>,
        size: Vec2,
    },
    Text {
        transform: Mat4,
        content: String,
    },
}

/// Counts of what a [`DrawList`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DrawSummary {
    pub point_draws: usize,
    pub particles: usize,
    pub textures: usize,
    pub texts: usize,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct DrawList {
    ops: Vec<DrawOp>,
    transform: Mat4,
    life: i32,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drop recorded ops; the bound transform and life are kept.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn point_draws(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Points { .. }))
            .count()
    }

    pub fn summary(&self) -> DrawSummary {
        self.ops.iter().fold(DrawSummary::default(), |mut acc, op| {
            match op {
                DrawOp::Points { command, .. } => {
                    acc.point_draws += 1;
                    acc.particles += command.count;
                }
                DrawOp::Texture { .. } => acc.textures += 1,
                DrawOp::Text { .. } => acc.texts += 1,
            }
            acc
        })
    }
}

impl RenderContext for DrawList {
    fn set_transform(&mut self, transform: &Mat4) {
        self.transform = *transform;
    }

    fn set_generation_life(&mut self, life: i32) {
        self.life = life;
    }

    fn draw_arrays(&mut self, buffer: &[ParticleVertex], command: DrawCommand) {
        if command.slice(buffer).is_none() {
            warn!(
                "Skipping draw of {} vertices at {}: buffer holds {}",
                command.count,
                command.first,
                buffer.len()
            );
            return;
        }
        self.ops.push(DrawOp::Points {
            transform: self.transform,
            life: self.life,
            command,
        });
    }

    fn draw_texture(&mut self, transform: &Mat4, tex_key: &str, src: Option<TileRect>, size: Vec2) {
        self.ops.push(DrawOp::Texture {
            transform: *transform,
            tex_key: tex_key.to_string(),
            src,
            size,
        });
    }

    fn draw_text(&mut self, transform: &Mat4, text: &Text) {
        self.ops.push(DrawOp::Text {
            transform: *transform,
            content: text.content.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytemuck::Zeroable;

    #[test]
    fn test_points_capture_bound_state() {
        let mut list = DrawList::new();
        let m = Mat4::from_translation(glam::Vec3::new(3.0, 4.0, 0.0));
        let buffer = [ParticleVertex::zeroed(); 8];
        list.set_transform(&m);
        list.set_generation_life(5);
        list.draw_arrays(&buffer, DrawCommand::points(4, 4));
        assert_eq!(
            list.ops(),
            &[DrawOp::Points {
                transform: m,
                life: 5,
                command: DrawCommand::points(4, 4),
            }]
        );
    }

    #[test]
    fn test_out_of_bounds_draw_is_skipped() {
        let mut list = DrawList::new();
        let buffer = [ParticleVertex::zeroed(); 2];
        list.draw_arrays(&buffer, DrawCommand::points(1, 2));
        assert!(list.ops().is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let mut list = DrawList::new();
        let buffer = [ParticleVertex::zeroed(); 6];
        list.draw_arrays(&buffer, DrawCommand::points(0, 3));
        list.draw_arrays(&buffer, DrawCommand::points(3, 3));
        list.draw_texture(&Mat4::IDENTITY, "hero", None, Vec2::new(32.0, 32.0));
        list.draw_text(&Mat4::IDENTITY, &Text::new("hi", 10.0));
        assert_eq!(
            list.summary(),
            DrawSummary {
                point_draws: 2,
                particles: 6,
                textures: 1,
                texts: 1,
            }
        );
        list.clear();
        assert_eq!(list.summary(), DrawSummary::default());
    }
}
