//! Game configuration resource.
//!
//! Window and render settings read from the `[render]` and `[window]`
//! sections of the scene INI file. Missing keys keep their defaults, so a
//! file holding only tilesets and particle systems is still a valid config.
//!
//! # Configuration File Format
//!
//! ```ini
//! [render]
//! width = 640
//! height = 360
//!
//! [window]
//! width = 1280
//! height = 720
//! fullscreen = false
//! vsync = true
//! target_fps = 60
//! ```

use std::path::PathBuf;

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;

use crate::error::{Result, TilesparkError};
use crate::resources::configfile::{get_parsed, load_ini};
use crate::resources::projection::Projection;

/// Default safe values for startup
const DEFAULT_RENDER_WIDTH: u32 = 640;
const DEFAULT_RENDER_HEIGHT: u32 = 360;
const DEFAULT_WINDOW_WIDTH: u32 = 1280;
const DEFAULT_WINDOW_HEIGHT: u32 = 720;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_VSYNC: bool = true;
const DEFAULT_FULLSCREEN: bool = false;
pub const DEFAULT_CONFIG_PATH: &str = "./assets/demo.ini";

#[derive(Resource, Debug, Clone)]
pub struct GameConfig {
    /// Width of the render area scenes are laid out in, in pixels.
    pub render_width: u32,
    /// Height of the render area, in pixels.
    pub render_height: u32,
    /// Window width in pixels.
    pub window_width: u32,
    /// Window height in pixels.
    pub window_height: u32,
    /// Target frames per second. One frame is one animation/particle tick.
    pub target_fps: u32,
    /// Enable vertical sync.
    pub vsync: bool,
    /// Start in fullscreen mode.
    pub fullscreen: bool,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            render_width: DEFAULT_RENDER_WIDTH,
            render_height: DEFAULT_RENDER_HEIGHT,
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            vsync: DEFAULT_VSYNC,
            fullscreen: DEFAULT_FULLSCREEN,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file at `config_path`.
    pub fn load_from_file(&mut self) -> Result<()> {
        let ini = load_ini(&self.config_path)?;
        self.apply_ini(&ini)
    }

    /// Overwrite fields present in `ini`.
    pub fn apply_ini(&mut self, ini: &Ini) -> Result<()> {
        // [render] section
        if let Some(width) = get_parsed(ini, "render", "width")? {
            self.render_width = width;
        }
        if let Some(height) = get_parsed(ini, "render", "height")? {
            self.render_height = height;
        }

        // [window] section
        if let Some(width) = get_parsed(ini, "window", "width")? {
            self.window_width = width;
        }
        if let Some(height) = get_parsed(ini, "window", "height")? {
            self.window_height = height;
        }
        if let Some(fps) = get_parsed(ini, "window", "target_fps")? {
            self.target_fps = fps;
        }
        if let Some(vsync) = ini.getbool("window", "vsync").map_err(|e| TilesparkError::parse("window", "vsync", e))? {
            self.vsync = vsync;
        }
        if let Some(fullscreen) = ini
            .getbool("window", "fullscreen")
            .map_err(|e| TilesparkError::parse("window", "fullscreen", e))?
        {
            self.fullscreen = fullscreen;
        }

        if self.render_width == 0 || self.render_height == 0 {
            return Err(TilesparkError::invalid(format!(
                "render size {}x{} is empty",
                self.render_width, self.render_height
            )));
        }

        info!(
            "Loaded config: {}x{} render, {}x{} window, fps={}, vsync={}, fullscreen={}",
            self.render_width,
            self.render_height,
            self.window_width,
            self.window_height,
            self.target_fps,
            self.vsync,
            self.fullscreen
        );

        Ok(())
    }

    /// Get the window size.
    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    pub fn render_size(&self) -> (u32, u32) {
        (self.render_width, self.render_height)
    }

    /// Projection fitting the render area into a `window_width` x `window_height` window.
    pub fn window_projection(&self, window_width: u32, window_height: u32) -> Projection {
        Projection::letterbox(
            self.render_width as f32,
            self.render_height as f32,
            window_width as f32,
            window_height as f32,
        )
    }

    /// Seconds per frame at the target rate.
    pub fn frame_delta(&self) -> f32 {
        1.0 / self.target_fps.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::configfile::read_ini;

    #[test]
    fn test_defaults() {
        let c = GameConfig::new();
        assert_eq!(c.render_width, DEFAULT_RENDER_WIDTH);
        assert_eq!(c.window_size(), (DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT));
        assert_eq!(c.config_path, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_apply_ini_keeps_missing_defaults() {
        let ini = read_ini("[render]\nwidth = 320\n[window]\nvsync = false\ntarget_fps = 30\n").unwrap();
        let mut c = GameConfig::new();
        c.apply_ini(&ini).unwrap();
        assert_eq!(c.render_width, 320);
        assert_eq!(c.render_height, DEFAULT_RENDER_HEIGHT);
        assert!(!c.vsync);
        assert_eq!(c.target_fps, 30);
        assert!((c.frame_delta() - 1.0 / 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_apply_ini_rejects_bad_numbers() {
        let ini = read_ini("[window]\nwidth = huge\n").unwrap();
        assert!(matches!(GameConfig::new().apply_ini(&ini), Err(TilesparkError::Parse { .. })));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let mut c = GameConfig::with_path("./nope/config.ini");
        assert!(matches!(c.load_from_file(), Err(TilesparkError::NotFound(_))));
    }

    #[test]
    fn test_window_projection_uses_render_size() {
        let ini = read_ini("[render]\nwidth = 320\nheight = 180\n").unwrap();
        let mut c = GameConfig::new();
        c.apply_ini(&ini).unwrap();
        assert_eq!(c.render_size(), (320, 180));
        let p = c.window_projection(1280, 720).0;
        let corner = p.transform_point3(glam::Vec3::new(320.0, 180.0, 0.0));
        assert_eq!(corner, glam::Vec3::new(1280.0, 720.0, 0.0));
    }
}
