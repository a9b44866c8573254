//! Projection resource.
//!
//! The matrix every drawable's model transform is multiplied into before
//! submission. Scenes are laid out in render-space pixels (`[render]` width
//! and height). The recording draw list keeps the identity, the raylib
//! window uses [`Projection::letterbox`] to scale render space into the
//! window, and clip-space pipelines use [`Projection::orthographic`].

use bevy_ecs::prelude::Resource;
use glam::{Mat4, Vec3};

#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct Projection(pub Mat4);

impl Default for Projection {
    fn default() -> Self {
        Projection(Mat4::IDENTITY)
    }
}

impl Projection {
    /// Pixel-space orthographic projection with the origin at the top-left and Y+ down.
    pub fn orthographic(width: f32, height: f32) -> Self {
        Projection(Mat4::orthographic_rh_gl(0.0, width, height, 0.0, -1.0, 1.0))
    }

    /// Scale a `render_width` x `render_height` scene uniformly into a window,
    /// centered with bars on the sides (pillarbox) or top and bottom (letterbox).
    pub fn letterbox(render_width: f32, render_height: f32, window_width: f32, window_height: f32) -> Self {
        if render_width <= 0.0 || render_height <= 0.0 {
            return Self::default();
        }
        let scale = (window_width / render_width).min(window_height / render_height);
        let offset = Vec3::new(
            (window_width - render_width * scale) * 0.5,
            (window_height - render_height * scale) * 0.5,
            0.0,
        );
        Projection(Mat4::from_translation(offset) * Mat4::from_scale(Vec3::new(scale, scale, 1.0)))
    }
}
