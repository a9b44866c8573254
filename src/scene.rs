//! Scene loading.
//!
//! A scene is one INI file holding the window settings, every tileset,
//! animation and particle catalog, and the entities to spawn. Entities are
//! declared in `[entity.<name>]` sections and pick exactly one drawable:
//!
//! ```ini
//! [entity.campfire]
//! particles = fire
//! position = 320,300
//! z = 1
//!
//! [entity.hero]
//! animation = hero
//! state = 2
//! position = 100,200
//!
//! [entity.crate]
//! tileset = props
//! tile = 3
//!
//! [entity.title]
//! text = Tilespark
//! font_size = 20
//! ```
//!
//! Sections are spawned in name order. Particle systems sample their
//! particles from the rng handed to [`Scene::spawn`], so a fixed seed gives a
//! reproducible scene.

use std::path::Path;
use std::sync::Arc;

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use glam::Vec2;
use log::info;

use crate::components::animation::Animation;
use crate::components::drawable::{Drawable, Text, TileSprite};
use crate::components::mapposition::MapPosition;
use crate::components::particlesystem::ParticleSystem;
use crate::components::zindex::ZIndex;
use crate::error::{Result, TilesparkError};
use crate::resources::animationstore::AnimationStore;
use crate::resources::configfile::{get_parsed, load_ini, parse_list, read_ini, sections_with_prefix};
use crate::resources::gameconfig::GameConfig;
use crate::resources::particleconfig::ParticleConfigStore;
use crate::resources::tilesetstore::TilesetStore;

const DEFAULT_FONT_SIZE: f32 = 10.0;

/// What an `[entity.<name>]` section draws.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Particles(String),
    Animated { animation: String, state: usize },
    Tile { tileset: String, tile: u32 },
    Text(Text),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntitySpec {
    pub name: String,
    pub kind: EntityKind,
    pub position: Vec2,
    pub z: i32,
}

impl EntitySpec {
    fn from_ini(ini: &Ini, name: String, section: &str) -> Result<Self> {
        let kind = if let Some(particles) = ini.get(section, "particles") {
            EntityKind::Particles(particles.trim().to_string())
        } else if let Some(animation) = ini.get(section, "animation") {
            EntityKind::Animated {
                animation: animation.trim().to_string(),
                state: get_parsed(ini, section, "state")?.unwrap_or(0),
            }
        } else if let Some(tileset) = ini.get(section, "tileset") {
            EntityKind::Tile {
                tileset: tileset.trim().to_string(),
                tile: get_parsed(ini, section, "tile")?.unwrap_or(0),
            }
        } else if let Some(text) = ini.get(section, "text") {
            let font_size = get_parsed(ini, section, "font_size")?.unwrap_or(DEFAULT_FONT_SIZE);
            EntityKind::Text(Text::new(text.trim(), font_size))
        } else {
            return Err(TilesparkError::invalid(format!(
                "entity '{}' has no particles, animation, tileset or text",
                name
            )));
        };

        let position = match ini.get(section, "position") {
            Some(raw) => match parse_list::<f32>(&raw).as_deref() {
                Some(&[x, y]) => Vec2::new(x, y),
                _ => return Err(TilesparkError::parse(section, "position", format!("expected x,y, got '{}'", raw))),
            },
            None => Vec2::ZERO,
        };

        Ok(Self {
            name,
            kind,
            position,
            z: get_parsed(ini, section, "z")?.unwrap_or(0),
        })
    }
}

/// Everything a scene file declares.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub config: GameConfig,
    pub tilesets: TilesetStore,
    pub animations: AnimationStore,
    pub particles: ParticleConfigStore,
    pub entities: Vec<EntitySpec>,
}

impl Scene {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut scene = Self::from_ini(&load_ini(path)?)?;
        scene.config.config_path = path.to_path_buf();
        Ok(scene)
    }

    pub fn load_from_str(content: &str) -> Result<Self> {
        Self::from_ini(&read_ini(content)?)
    }

    pub fn from_ini(ini: &Ini) -> Result<Self> {
        let mut config = GameConfig::new();
        config.apply_ini(ini)?;
        let tilesets = TilesetStore::from_ini(ini)?;
        let animations = AnimationStore::from_ini(ini, &tilesets)?;
        let particles = ParticleConfigStore::from_ini(ini)?;
        let entities = sections_with_prefix(ini, "entity")
            .into_iter()
            .map(|(name, section)| EntitySpec::from_ini(ini, name, &section))
            .collect::<Result<Vec<_>>>()?;
        info!(
            "Loaded scene: {} tilesets, {} animations, {} particle systems, {} entities",
            tilesets.len(),
            animations.len(),
            particles.len(),
            entities.len()
        );
        Ok(Self {
            config,
            tilesets,
            animations,
            particles,
            entities,
        })
    }

    /// Build the drawable (and animation cursor, if any) for one entity.
    pub fn build(&self, spec: &EntitySpec, rng: &mut fastrand::Rng) -> Result<(Drawable, Option<Animation>)> {
        Ok(match &spec.kind {
            EntityKind::Particles(name) => {
                (Drawable::Particles(ParticleSystem::from_store(&self.particles, name, rng)?), None)
            }
            EntityKind::Animated { animation, state } => {
                let data = self.animations.get(animation)?;
                let mut cursor = Animation::new(Arc::clone(data));
                cursor.set_state(*state)?;
                let tile = TileSprite::new(Arc::clone(data.tileset()), cursor.current_frame());
                (Drawable::TileSprite(tile), Some(cursor))
            }
            EntityKind::Tile { tileset, tile } => {
                let tileset = self.tilesets.get(tileset)?;
                tileset.tile_rect(*tile)?;
                (Drawable::TileSprite(TileSprite::new(Arc::clone(tileset), *tile)), None)
            }
            EntityKind::Text(text) => (Drawable::Text(text.clone()), None),
        })
    }

    /// Spawn every declared entity into `world`.
    pub fn spawn(&self, world: &mut World, rng: &mut fastrand::Rng) -> Result<Vec<Entity>> {
        let mut spawned = Vec::with_capacity(self.entities.len());
        for spec in &self.entities {
            let (drawable, animation) = self.build(spec, rng)?;
            let mut entity = world.spawn((
                drawable,
                MapPosition { pos: spec.position },
                ZIndex(spec.z),
            ));
            if let Some(animation) = animation {
                entity.insert(animation);
            }
            spawned.push(entity.id());
        }
        info!("Spawned {} entities", spawned.len());
        Ok(spawned)
    }

    /// Move the stores and config into `world` as resources and spawn the entities.
    pub fn install(self, world: &mut World, rng: &mut fastrand::Rng) -> Result<Vec<Entity>> {
        let spawned = self.spawn(world, rng)?;
        world.insert_resource(self.config);
        world.insert_resource(self.tilesets);
        world.insert_resource(self.animations);
        world.insert_resource(self.particles);
        Ok(spawned)
    }
}
