//! Engine systems.
//!
//! Submodules overview
//! - [`animation`] – tick animation cursors and update tile sprite frames
//! - [`render`] – z-ordered render pass over every drawable
//! - `raylib_render` – raylib render context (`raylib` feature)
//! - [`time`] – update simulation time and frame count

pub mod animation;
#[cfg(feature = "raylib")]
pub mod raylib_render;
pub mod render;
pub mod time;
