//! Tileset registry.
//!
//! Tilesets are declared in `[tileset.<name>]` sections. The section name is
//! also the texture key renderers use to find the image.
//!
//! ```ini
//! [tileset.hero]
//! src = assets/hero.png
//! image_width = 64
//! image_height = 64
//! tile_width = 32
//! tile_height = 32
//! collision = 0-3:4,4,24,24 | 2:0,0,8,8
//! ```
//!
//! `collision` entries are `tiles:x,y,width,height`, where `tiles` is a
//! single tile or an inclusive `first-last` range, separated by `|`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use configparser::ini::Ini;
use log::info;
use rustc_hash::FxHashMap;

use crate::error::{Result, TilesparkError};
use crate::resources::configfile::{
    load_ini, parse_list, parse_range, read_ini, require_parsed, sections_with_prefix,
};
use crate::resources::tileset::{TileRect, Tileset};

/// A loaded tileset and the image path it was declared with.
#[derive(Debug, Clone)]
pub struct TilesetEntry {
    pub tileset: Arc<Tileset>,
    pub src: Option<PathBuf>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct TilesetStore {
    pub tilesets: FxHashMap<String, TilesetEntry>,
}

impl TilesetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_ini(&load_ini(path.as_ref())?)
    }

    pub fn load_from_str(content: &str) -> Result<Self> {
        Self::from_ini(&read_ini(content)?)
    }

    pub fn from_ini(ini: &Ini) -> Result<Self> {
        let mut store = Self::new();
        for (name, section) in sections_with_prefix(ini, "tileset") {
            let mut tileset = Tileset::new(
                name.clone(),
                require_parsed(ini, &section, "image_width")?,
                require_parsed(ini, &section, "image_height")?,
                require_parsed(ini, &section, "tile_width")?,
                require_parsed(ini, &section, "tile_height")?,
            )?;
            if let Some(raw) = ini.get(&section, "collision") {
                for entry in raw.split('|').map(str::trim).filter(|e| !e.is_empty()) {
                    let (first, last, rect) = parse_collision(entry)
                        .ok_or_else(|| TilesparkError::parse(&section, "collision", format!("bad entry '{}'", entry)))?;
                    tileset.add_collision_rect(rect, first, last)?;
                }
            }
            info!(
                "Loaded tileset '{}': {} frames of {}x{}",
                name,
                tileset.frame_count(),
                tileset.tile_dimensions().0,
                tileset.tile_dimensions().1
            );
            let src = ini.get(&section, "src").map(|s| PathBuf::from(s.trim()));
            store.insert(name, tileset, src);
        }
        Ok(store)
    }

    pub fn insert(&mut self, name: impl Into<String>, tileset: Tileset, src: Option<PathBuf>) -> Arc<Tileset> {
        let tileset = Arc::new(tileset);
        self.tilesets.insert(
            name.into(),
            TilesetEntry {
                tileset: Arc::clone(&tileset),
                src,
            },
        );
        tileset
    }

    pub fn get(&self, name: &str) -> Result<&Arc<Tileset>> {
        self.tilesets
            .get(name)
            .map(|entry| &entry.tileset)
            .ok_or_else(|| TilesparkError::NotFound(format!("tileset '{}'", name)))
    }

    /// `(texture key, image path)` for every tileset declared with a `src`.
    pub fn sources(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.tilesets
            .iter()
            .filter_map(|(name, entry)| Some((name.as_str(), entry.src.as_deref()?)))
    }

    pub fn len(&self) -> usize {
        self.tilesets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tilesets.is_empty()
    }
}

fn parse_collision(entry: &str) -> Option<(u32, u32, TileRect)> {
    let (tiles, rect) = entry.split_once(':')?;
    let (first, last) = parse_range::<u32>(tiles)?;
    match parse_list::<u32>(rect)?.as_slice() {
        &[x, y, width, height] => Some((first, last, TileRect::new(x, y, width, height))),
        _ => None,
    }
}
