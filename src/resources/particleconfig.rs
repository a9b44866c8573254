//! Particle system configuration and its registry.
//!
//! A [`ParticleSystemConfig`] holds everything a
//! [`ParticleSystem`](crate::components::particlesystem::ParticleSystem) needs
//! to lay out and randomize its buffer. Configs are read once from INI
//! sections named `[particles.<name>]`:
//!
//! ```ini
//! [particles.fire]
//! generations = 30
//! particles_per_generation = 20
//! base_line = 0,0,100,0
//! angle = 60-120
//! base_color_r = 200-255
//! base_color_g = 40-120
//! base_color_b = 0
//! base_color_a = 255
//! delta_color_g = -4
//! delta_color_a = -8
//! startup = staggered
//! ```
//!
//! Color ranges are bytes, either `min-max` or a single value. Color deltas
//! are byte steps per tick and are stored normalized (divided by 255).

use std::path::Path;

use bevy_ecs::prelude::Resource;
use configparser::ini::Ini;
use glam::Vec2;
use log::info;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TilesparkError};
use crate::resources::configfile::{
    get_parsed, get_range, load_ini, parse_list, read_ini, require_parsed, sections_with_prefix,
};

const CHANNELS: [&str; 4] = ["r", "g", "b", "a"];

/// How generation life counters are seeded at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStartup {
    /// Generation `i` starts at life `i`: all generations are live at once,
    /// each one tick out of phase with the previous.
    #[default]
    Staggered,
    /// Generation `i` starts at life `-i`: it stays hidden for `i` ticks,
    /// so the system fills up one generation per tick.
    Delayed,
}

/// Inclusive byte range for one color channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRange {
    pub min: u8,
    pub max: u8,
}

impl ChannelRange {
    pub fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn fixed(value: u8) -> Self {
        Self::new(value, value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSystemConfig {
    pub n_generations: u32,
    pub n_particles_per_generation: u32,
    /// Particles spawn at a random point on the segment `base_line[0]..base_line[1]`.
    pub base_line: [Vec2; 2],
    /// Initial direction range in degrees. 0° points right, angles grow counter-clockwise
    /// on screen (Y+ is down).
    pub min_angle: f32,
    pub max_angle: f32,
    /// RGBA base color ranges.
    pub base_color: [ChannelRange; 4],
    /// RGBA color step per tick, normalized.
    pub color_delta: [f32; 4],
    #[serde(default)]
    pub startup: GenerationStartup,
}

impl ParticleSystemConfig {
    /// A config with the given layout, spawning white particles from the origin
    /// heading right.
    pub fn new(n_generations: u32, n_particles_per_generation: u32) -> Self {
        Self {
            n_generations,
            n_particles_per_generation,
            base_line: [Vec2::ZERO, Vec2::ZERO],
            min_angle: 0.0,
            max_angle: 0.0,
            base_color: [ChannelRange::fixed(255); 4],
            color_delta: [0.0; 4],
            startup: GenerationStartup::Staggered,
        }
    }

    pub fn with_base_line(mut self, from: Vec2, to: Vec2) -> Self {
        self.base_line = [from, to];
        self
    }

    pub fn with_angle(mut self, min: f32, max: f32) -> Self {
        self.min_angle = min;
        self.max_angle = max;
        self
    }

    pub fn with_base_color(mut self, base_color: [ChannelRange; 4]) -> Self {
        self.base_color = base_color;
        self
    }

    pub fn with_color_delta(mut self, color_delta: [f32; 4]) -> Self {
        self.color_delta = color_delta;
        self
    }

    pub fn with_startup(mut self, startup: GenerationStartup) -> Self {
        self.startup = startup;
        self
    }

    /// Total particles across all generations.
    pub fn particle_count(&self) -> Option<usize> {
        (self.n_generations as usize).checked_mul(self.n_particles_per_generation as usize)
    }

    /// Reject layouts and ranges that cannot produce a particle system.
    pub fn validate(&self) -> Result<()> {
        if self.n_generations == 0 {
            return Err(TilesparkError::invalid("particle system needs at least one generation"));
        }
        if self.n_generations > i32::MAX as u32 {
            return Err(TilesparkError::invalid(format!(
                "{} generations exceed the life counter range",
                self.n_generations
            )));
        }
        if self.n_particles_per_generation == 0 {
            return Err(TilesparkError::invalid(
                "particle system needs at least one particle per generation",
            ));
        }
        let floats_finite = self.base_line.iter().all(|p| p.is_finite())
            && self.min_angle.is_finite()
            && self.max_angle.is_finite()
            && self.color_delta.iter().all(|d| d.is_finite());
        if !floats_finite {
            return Err(TilesparkError::invalid("particle system values must be finite"));
        }
        if self.min_angle > self.max_angle {
            return Err(TilesparkError::invalid(format!(
                "angle range {}-{} is inverted",
                self.min_angle, self.max_angle
            )));
        }
        for (channel, range) in CHANNELS.iter().zip(self.base_color.iter()) {
            if range.min > range.max {
                return Err(TilesparkError::invalid(format!(
                    "base color channel '{}' range {}-{} is inverted",
                    channel, range.min, range.max
                )));
            }
        }
        Ok(())
    }

    /// Read `[<section>]` of an already parsed INI.
    pub fn from_ini(ini: &Ini, section: &str) -> Result<Self> {
        let mut config = Self::new(
            require_parsed(ini, section, "generations")?,
            require_parsed(ini, section, "particles_per_generation")?,
        );

        if let Some(raw) = ini.get(section, "base_line") {
            match parse_list::<f32>(&raw).as_deref() {
                Some(&[x0, y0, x1, y1]) => {
                    config.base_line = [Vec2::new(x0, y0), Vec2::new(x1, y1)];
                }
                _ => {
                    return Err(TilesparkError::parse(
                        section,
                        "base_line",
                        format!("expected x0,y0,x1,y1, got '{}'", raw),
                    ));
                }
            }
        }

        if let Some((min, max)) = get_range::<f32>(ini, section, "angle")? {
            config.min_angle = min;
            config.max_angle = max;
        }

        for (i, channel) in CHANNELS.iter().enumerate() {
            if let Some((min, max)) = get_range::<u8>(ini, section, &format!("base_color_{}", channel))? {
                config.base_color[i] = ChannelRange::new(min, max);
            }
            if let Some(step) = get_parsed::<f32>(ini, section, &format!("delta_color_{}", channel))? {
                config.color_delta[i] = step / 255.0;
            }
        }

        if let Some(raw) = ini.get(section, "startup") {
            config.startup = match raw.trim().to_ascii_lowercase().as_str() {
                "staggered" => GenerationStartup::Staggered,
                "delayed" => GenerationStartup::Delayed,
                other => {
                    return Err(TilesparkError::parse(
                        section,
                        "startup",
                        format!("expected 'staggered' or 'delayed', got '{}'", other),
                    ));
                }
            };
        }

        config.validate()?;
        Ok(config)
    }
}

/// Named particle system configurations.
#[derive(Resource, Debug, Clone, Default)]
pub struct ParticleConfigStore {
    pub configs: FxHashMap<String, ParticleSystemConfig>,
}

impl ParticleConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_ini(&load_ini(path.as_ref())?)
    }

    pub fn load_from_str(content: &str) -> Result<Self> {
        Self::from_ini(&read_ini(content)?)
    }

    /// Collect every `[particles.<name>]` section.
    pub fn from_ini(ini: &Ini) -> Result<Self> {
        let mut store = Self::new();
        for (name, section) in sections_with_prefix(ini, "particles") {
            let config = ParticleSystemConfig::from_ini(ini, &section)?;
            info!(
                "Loaded particle system '{}': {} generations x {} particles",
                name, config.n_generations, config.n_particles_per_generation
            );
            store.insert(name, config);
        }
        Ok(store)
    }

    pub fn insert(&mut self, name: impl Into<String>, config: ParticleSystemConfig) {
        self.configs.insert(name.into(), config);
    }

    pub fn get(&self, name: &str) -> Result<&ParticleSystemConfig> {
        self.configs
            .get(name)
            .ok_or_else(|| TilesparkError::NotFound(format!("particle system '{}'", name)))
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}
