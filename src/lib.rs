//! Tilespark library.
//!
//! A small 2D rendering toolkit on `bevy_ecs`: tilesets, frame-range
//! animations over them, generation-ring particle systems and a z-ordered
//! render pass over a closed set of drawables. Rendering goes through the
//! [`render::RenderContext`] trait; the crate ships a recording
//! [`resources::drawlist::DrawList`] and, with the `raylib` feature, a raylib
//! backend.

pub mod components;
pub mod error;
pub mod game;
pub mod render;
pub mod resources;
pub mod scene;
pub mod systems;

pub use error::{Result, TilesparkError};
