//! ECS resources made available to systems.
//!
//! Long-lived data injected into the world: asset catalogs, timing, the
//! projection and the recording render context.
//!
//! Overview
//! - `animationdata` – append-only animation catalog bound to a tileset
//! - `animationstore` – animation catalogs keyed by name
//! - `configfile` – INI reading helpers shared by the loaders
//! - `drawlist` – render context that records draw calls
//! - `gameconfig` – window and render settings
//! - `particleconfig` – particle system parameters and their store
//! - `projection` – matrix applied in front of every model transform
//! - `tileset` – grid of equally sized tiles over one image
//! - `tilesetstore` – tilesets keyed by name
//! - `worldtime` – simulation time, delta and frame count
pub mod animationdata;
pub mod animationstore;
pub mod configfile;
pub mod drawlist;
pub mod gameconfig;
pub mod particleconfig;
pub mod projection;
pub mod tileset;
pub mod tilesetstore;
pub mod worldtime;
