//! Generational particle system.
//!
//! A [`ParticleSystem`] owns a packed buffer of
//! `n_generations * n_particles_per_generation` particles. Particles are never
//! spawned or removed one by one: the buffer is partitioned into equally
//! sized generations, and each generation carries a single life counter in a
//! [`GenerationRing`].
//!
//! # How It Works
//!
//! 1. At construction every particle gets a random position on the base line,
//!    a unit velocity inside the angle range, a base color inside the channel
//!    ranges and the fixed color delta. This draw is permanent.
//! 2. Every rendered frame [`ParticleSystem::draw_and_update`] submits each
//!    live generation as one point draw tagged with its life, then advances
//!    all counters once.
//! 3. Lives step modulo `n_generations`, so a generation "respawns" by its
//!    life returning to 0: the same particles replay from their start.
//!
//! The point stage (see [`ParticleVertex::shade`]) turns a particle plus its
//! generation life into a position and color.

use glam::{Mat4, Vec2};
use log::debug;

use crate::components::drawable::{Drawable, Rect};
use crate::error::{Result, TilesparkError};
use crate::render::{DrawCommand, FLOATS_PER_PARTICLE, ParticleVertex, RenderContext};
use crate::resources::particleconfig::{GenerationStartup, ParticleConfigStore, ParticleSystemConfig};

/// Fixed-size ring of per-generation life counters.
///
/// Negative lives mean "not started yet" and count up towards 0. Non-negative
/// lives step modulo the ring length, so every generation cycles with a
/// period equal to the number of generations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRing {
    lives: Box<[i32]>,
}

impl GenerationRing {
    pub fn new(n_generations: u32, startup: GenerationStartup) -> Result<Self> {
        if n_generations == 0 {
            return Err(TilesparkError::invalid("generation ring needs at least one generation"));
        }
        let n = i32::try_from(n_generations).map_err(|_| {
            TilesparkError::invalid(format!("{} generations exceed the life counter range", n_generations))
        })?;
        let lives = (0..n)
            .map(|i| match startup {
                GenerationStartup::Staggered => i,
                GenerationStartup::Delayed => -i,
            })
            .collect();
        Ok(Self { lives })
    }

    pub fn len(&self) -> usize {
        self.lives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lives.is_empty()
    }

    pub fn life(&self, generation: usize) -> Option<i32> {
        self.lives.get(generation).copied()
    }

    pub fn lives(&self) -> &[i32] {
        &self.lives
    }

    pub fn is_live(&self, generation: usize) -> bool {
        self.life(generation).is_some_and(|life| life >= 0)
    }

    /// Advance every counter by one tick.
    pub fn advance(&mut self) {
        let n = self.lives.len() as i32;
        for life in self.lives.iter_mut() {
            *life = if *life < 0 { *life + 1 } else { (*life + 1) % n };
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParticleSystem {
    config: ParticleSystemConfig,
    vertices: Vec<ParticleVertex>,
    generations: GenerationRing,
}

impl ParticleSystem {
    /// Validate `config`, allocate the buffer and draw every particle from `rng`.
    ///
    /// Fails with [`TilesparkError::InvalidConfiguration`] for bad counts or
    /// ranges and with [`TilesparkError::ResourceUnavailable`] if the buffer
    /// cannot be allocated. No partially built system is returned.
    pub fn new(config: ParticleSystemConfig, rng: &mut fastrand::Rng) -> Result<Self> {
        config.validate()?;
        let total = config.particle_count().ok_or_else(|| {
            TilesparkError::ResourceUnavailable(format!(
                "particle buffer of {} x {} particles overflows",
                config.n_generations, config.n_particles_per_generation
            ))
        })?;

        let mut vertices = Vec::new();
        vertices.try_reserve_exact(total).map_err(|e| {
            TilesparkError::ResourceUnavailable(format!(
                "particle buffer of {} floats: {}",
                total.saturating_mul(FLOATS_PER_PARTICLE),
                e
            ))
        })?;
        let generations = GenerationRing::new(config.n_generations, config.startup)?;

        vertices.extend((0..total).map(|_| sample_particle(&config, rng)));

        debug!(
            "Particle system: {} generations x {} particles, base line ({}, {}) - ({}, {}), angle {}..{}",
            config.n_generations,
            config.n_particles_per_generation,
            config.base_line[0].x,
            config.base_line[0].y,
            config.base_line[1].x,
            config.base_line[1].y,
            config.min_angle,
            config.max_angle
        );

        Ok(Self {
            config,
            vertices,
            generations,
        })
    }

    /// Build the system registered as `name` in `store`.
    pub fn from_store(store: &ParticleConfigStore, name: &str, rng: &mut fastrand::Rng) -> Result<Self> {
        Self::new(store.get(name)?.clone(), rng)
    }

    pub fn config(&self) -> &ParticleSystemConfig {
        &self.config
    }

    pub fn n_generations(&self) -> usize {
        self.generations.len()
    }

    pub fn n_particles_per_generation(&self) -> usize {
        self.config.n_particles_per_generation as usize
    }

    /// The whole particle buffer, generation after generation.
    pub fn vertices(&self) -> &[ParticleVertex] {
        &self.vertices
    }

    /// Particles of one generation.
    pub fn generation(&self, index: usize) -> Result<&[ParticleVertex]> {
        let per = self.n_particles_per_generation();
        let start = index
            .checked_mul(per)
            .filter(|_| index < self.n_generations())
            .ok_or_else(|| TilesparkError::out_of_range("generation", index, self.n_generations()))?;
        Ok(&self.vertices[start..start + per])
    }

    pub fn generation_lives(&self) -> &[i32] {
        self.generations.lives()
    }

    pub fn generations(&self) -> &GenerationRing {
        &self.generations
    }

    /// Submit every live generation to `ctx`, then age all generations by one tick.
    ///
    /// Rendering and aging happen together so the ring advances exactly once
    /// per drawn frame.
    pub fn draw_and_update(&mut self, transform: &Mat4, ctx: &mut dyn RenderContext) {
        let per = self.n_particles_per_generation();
        ctx.set_transform(transform);
        for (i, &life) in self.generations.lives().iter().enumerate() {
            if life >= 0 {
                ctx.set_generation_life(life);
                ctx.draw_arrays(&self.vertices, DrawCommand::points(i * per, per));
            }
        }
        self.generations.advance();
    }

    /// Particle systems never collide. Placeholder until they carry bounds.
    pub fn collide(&self, _other: &Drawable) -> bool {
        false
    }

    /// Always empty, see [`collide`](Self::collide).
    pub fn collision_rects(&self) -> &[Rect] {
        &[]
    }
}

fn sample_particle(config: &ParticleSystemConfig, rng: &mut fastrand::Rng) -> ParticleVertex {
    let [from, to] = config.base_line;
    let position: Vec2 = from + (to - from) * rng.f32();

    // Angles are drawn in tenths of a degree.
    let lo = (config.min_angle * 10.0).round() as i32;
    let hi = (config.max_angle * 10.0).round() as i32;
    let theta = (rng.i32(lo..=hi) as f32 * 0.1).to_radians();

    let mut color = [0.0; 4];
    for (c, range) in color.iter_mut().zip(config.base_color.iter()) {
        *c = rng.u8(range.min..=range.max) as f32 / 255.0;
    }

    ParticleVertex {
        position: position.to_array(),
        velocity: [theta.cos(), -theta.sin()],
        color,
        color_delta: config.color_delta,
    }
}
