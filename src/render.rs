//! Render-context capability and the packed particle vertex layout.
//!
//! Drawables never talk to a graphics library directly. They receive a
//! [`RenderContext`] at draw time together with a 4x4 transform and submit
//! geometry through it. The context owns whatever per-backend bookkeeping is
//! needed (shader uniform locations, bound buffers); nothing is kept in
//! process-wide state.
//!
//! Implementations:
//! - [`crate::resources::drawlist::DrawList`] – records every call, used by
//!   the headless binary mode and by tests
//! - `crate::systems::raylib_render::RaylibContext` – immediate-mode raylib
//!   backend (behind the `raylib` feature)

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec4};
use serde::{Deserialize, Serialize};

use crate::components::drawable::Text;
use crate::resources::tileset::TileRect;

/// Number of floats stored per particle in the vertex buffer.
pub const FLOATS_PER_PARTICLE: usize = 12;

/// Point size used by backends when rasterizing particles.
pub const PARTICLE_POINT_SIZE: f32 = 5.0;

/// One particle as laid out in the vertex buffer.
///
/// `#[repr(C)]` so the buffer can be reinterpreted as a flat `&[f32]` and
/// uploaded as-is: position (2), velocity (2), color (4), color delta (4).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct ParticleVertex {
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    pub color: [f32; 4],
    pub color_delta: [f32; 4],
}

impl ParticleVertex {
    /// Evaluate the particle at generation life `t`.
    ///
    /// This is the point stage every backend applies: the particle travels
    /// along its velocity one unit per tick and its color drifts by the delta,
    /// clamped to `[0, 1]`.
    pub fn shade(&self, t: i32) -> (Vec2, Vec4) {
        let t = t.max(0) as f32;
        let position = Vec2::from(self.position) + Vec2::from(self.velocity) * t;
        let color = (Vec4::from(self.color) + Vec4::from(self.color_delta) * t)
            .clamp(Vec4::ZERO, Vec4::ONE);
        (position, color)
    }

    /// View a vertex slice as the flat float stream a GPU buffer expects.
    pub fn as_floats(vertices: &[ParticleVertex]) -> &[f32] {
        bytemuck::cast_slice(vertices)
    }
}

/// Primitive kind of a [`DrawCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Primitive {
    Points,
}

/// A ranged draw over a vertex buffer, in vertices (not floats).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawCommand {
    pub first: usize,
    pub count: usize,
    pub primitive: Primitive,
}

impl DrawCommand {
    pub fn points(first: usize, count: usize) -> Self {
        Self {
            first,
            count,
            primitive: Primitive::Points,
        }
    }

    /// The vertices this command covers, or `None` if it runs past `buffer`.
    pub fn slice<'a>(&self, buffer: &'a [ParticleVertex]) -> Option<&'a [ParticleVertex]> {
        buffer.get(self.first..self.first.checked_add(self.count)?)
    }
}

/// Target that drawables submit their geometry to.
///
/// The particle path mirrors a programmable pipeline: a transform and a
/// per-generation life uniform are set, then ranged draws are issued over
/// the particle system's own vertex buffer.
pub trait RenderContext {
    /// Set the model-view-projection matrix for subsequent particle draws.
    fn set_transform(&mut self, transform: &Mat4);

    /// Set the life uniform (`t`) consumed by the particle point stage.
    fn set_generation_life(&mut self, life: i32);

    /// Draw `command.count` vertices of `buffer` starting at `command.first`.
    fn draw_arrays(&mut self, buffer: &[ParticleVertex], command: DrawCommand);

    /// Draw a textured quad of `size` at `transform`, optionally cropped to `src`.
    fn draw_texture(&mut self, transform: &Mat4, tex_key: &str, src: Option<TileRect>, size: Vec2);

    /// Draw a line of text at `transform`.
    fn draw_text(&mut self, transform: &Mat4, text: &Text);
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn vertex() -> ParticleVertex {
        ParticleVertex {
            position: [10.0, 20.0],
            velocity: [1.0, -1.0],
            color: [0.5, 0.5, 0.5, 1.0],
            color_delta: [0.1, -0.1, 0.0, -0.25],
        }
    }

    #[test]
    fn test_vertex_is_twelve_floats() {
        assert_eq!(
            std::mem::size_of::<ParticleVertex>(),
            FLOATS_PER_PARTICLE * std::mem::size_of::<f32>()
        );
    }

    #[test]
    fn test_as_floats_keeps_attribute_order() {
        let v = [vertex()];
        let floats = ParticleVertex::as_floats(&v);
        assert_eq!(floats.len(), FLOATS_PER_PARTICLE);
        assert_eq!(&floats[0..4], &[10.0, 20.0, 1.0, -1.0]);
        assert_eq!(&floats[8..12], &[0.1, -0.1, 0.0, -0.25]);
    }

    #[test]
    fn test_shade_at_zero_is_initial_state() {
        let (pos, color) = vertex().shade(0);
        assert_eq!(pos, Vec2::new(10.0, 20.0));
        assert_eq!(color, Vec4::new(0.5, 0.5, 0.5, 1.0));
    }

    #[test]
    fn test_shade_moves_and_clamps() {
        let (pos, color) = vertex().shade(4);
        assert!(approx_eq(pos.x, 14.0));
        assert!(approx_eq(pos.y, 16.0));
        assert!(approx_eq(color.x, 0.9));
        assert!(approx_eq(color.y, 0.1));
        assert!(approx_eq(color.w, 0.0));

        let (_, color) = vertex().shade(100);
        assert!(approx_eq(color.x, 1.0));
        assert!(approx_eq(color.y, 0.0));
    }

    #[test]
    fn test_shade_treats_negative_life_as_zero() {
        assert_eq!(vertex().shade(-3), vertex().shade(0));
    }

    #[test]
    fn test_draw_command_slice_bounds() {
        let buffer = [vertex(); 4];
        assert_eq!(DrawCommand::points(1, 3).slice(&buffer).map(<[_]>::len), Some(3));
        assert!(DrawCommand::points(2, 3).slice(&buffer).is_none());
        assert!(DrawCommand::points(usize::MAX, 2).slice(&buffer).is_none());
    }
}
