//! ECS components for entities.
//!
//! Submodules overview:
//! - [`animation`] – playback cursor over a shared animation catalog
//! - [`drawable`] – the closed set of drawable variants and their collision rects
//! - [`mapposition`] – world-space position of an entity
//! - [`particlesystem`] – generation-ring particle system and its vertex buffer
//! - [`zindex`] – rendering order hint for 2D drawing

pub mod animation;
pub mod drawable;
pub mod mapposition;
pub mod particlesystem;
pub mod zindex;
