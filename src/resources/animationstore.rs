//! Animation resource registry.
//!
//! This module provides a store of [`AnimationData`] catalogs that can be
//! shared by many entities. Systems look an animation up by its string key
//! and hand the shared handle to an
//! [`Animation`](crate::components::animation::Animation) cursor.
//!
//! Catalogs are read from `[animation.<name>]` sections:
//!
//! ```ini
//! [animation.hero]
//! tileset = hero
//! refresh_rate = 25
//! states = 0-1:0, 2-2:1, 1-2:2
//! ```
//!
//! Each `states` entry is `first-last[:row]` (a single frame is also
//! accepted) and becomes a state in list order.

use std::path::Path;
use std::sync::Arc;

use bevy_ecs::prelude::Resource;
use configparser::ini::Ini;
use log::info;
use rustc_hash::FxHashMap;

use crate::error::{Result, TilesparkError};
use crate::resources::animationdata::{AnimationData, AnimationState, DEFAULT_ANIMATION_REFRESH_RATE};
use crate::resources::configfile::{get_parsed, load_ini, parse_range, read_ini, require_str, sections_with_prefix};
use crate::resources::tilesetstore::TilesetStore;

/// Central registry of reusable animation catalogs keyed by string IDs.
#[derive(Resource, Debug, Clone, Default)]
pub struct AnimationStore {
    pub animations: FxHashMap<String, Arc<AnimationData>>,
}

impl AnimationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file(path: impl AsRef<Path>, tilesets: &TilesetStore) -> Result<Self> {
        Self::from_ini(&load_ini(path.as_ref())?, tilesets)
    }

    pub fn load_from_str(content: &str, tilesets: &TilesetStore) -> Result<Self> {
        Self::from_ini(&read_ini(content)?, tilesets)
    }

    /// Build every `[animation.<name>]` catalog against already loaded tilesets.
    pub fn from_ini(ini: &Ini, tilesets: &TilesetStore) -> Result<Self> {
        let mut store = Self::new();
        for (name, section) in sections_with_prefix(ini, "animation") {
            let tileset = tilesets.get(&require_str(ini, &section, "tileset")?)?;
            let refresh_rate =
                get_parsed(ini, &section, "refresh_rate")?.unwrap_or(DEFAULT_ANIMATION_REFRESH_RATE);
            let mut data = AnimationData::with_refresh_rate(Arc::clone(tileset), refresh_rate);
            if let Some(raw) = ini.get(&section, "states") {
                for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
                    let state = parse_state(entry).ok_or_else(|| {
                        TilesparkError::parse(&section, "states", format!("bad state '{}'", entry))
                    })?;
                    data.add_state(state)?;
                }
            }
            info!(
                "Loaded animation '{}': {} states at refresh rate {}",
                name,
                data.n_states(),
                data.refresh_rate()
            );
            store.insert(name, data);
        }
        Ok(store)
    }

    pub fn insert(&mut self, name: impl Into<String>, data: AnimationData) -> Arc<AnimationData> {
        let data = Arc::new(data);
        self.animations.insert(name.into(), Arc::clone(&data));
        data
    }

    pub fn get(&self, name: &str) -> Result<&Arc<AnimationData>> {
        self.animations
            .get(name)
            .ok_or_else(|| TilesparkError::NotFound(format!("animation '{}'", name)))
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}

fn parse_state(entry: &str) -> Option<AnimationState> {
    let (frames, row) = match entry.split_once(':') {
        Some((frames, row)) => (frames, row.trim().parse().ok()?),
        None => (entry, 0),
    };
    let (first, last) = parse_range::<u32>(frames)?;
    Some(AnimationState::new(first, last).with_row(row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::tileset::Tileset;

    fn tilesets() -> TilesetStore {
        let mut store = TilesetStore::new();
        store.insert("hero", Tileset::new("hero", 64, 64, 32, 32).unwrap(), None);
        store
    }

    #[test]
    fn test_parse_state() {
        assert_eq!(parse_state("0-1:0"), Some(AnimationState::new(0, 1)));
        assert_eq!(parse_state("2-2:1"), Some(AnimationState::new(2, 2).with_row(1)));
        assert_eq!(parse_state("3"), Some(AnimationState::new(3, 3)));
        assert_eq!(parse_state("1-x"), None);
        assert_eq!(parse_state("1-2:row"), None);
    }

    #[test]
    fn test_load_animation() {
        let ini = "[animation.hero]\ntileset = hero\nrefresh_rate = 10\nstates = 0-1:0, 2-2:1, 1-2:2\n";
        let tilesets = tilesets();
        let store = AnimationStore::load_from_str(ini, &tilesets).unwrap();
        let hero = store.get("hero").unwrap();
        assert_eq!(hero.refresh_rate(), 10);
        assert_eq!(hero.n_states(), 3);
        assert_eq!(hero.state(2).unwrap(), &AnimationState::new(1, 2).with_row(2));
        assert!(Arc::ptr_eq(hero.tileset(), tilesets.get("hero").unwrap()));
    }

    #[test]
    fn test_default_refresh_rate() {
        let ini = "[animation.hero]\ntileset = hero\nstates = 0-3\n";
        let store = AnimationStore::load_from_str(ini, &tilesets()).unwrap();
        assert_eq!(store.get("hero").unwrap().refresh_rate(), DEFAULT_ANIMATION_REFRESH_RATE);
    }

    #[test]
    fn test_state_past_tileset_is_out_of_range() {
        let ini = "[animation.hero]\ntileset = hero\nstates = 0-4\n";
        assert!(matches!(
            AnimationStore::load_from_str(ini, &tilesets()),
            Err(TilesparkError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_unknown_tileset_is_not_found() {
        let ini = "[animation.ghost]\ntileset = ghost\nstates = 0-1\n";
        assert!(matches!(
            AnimationStore::load_from_str(ini, &tilesets()),
            Err(TilesparkError::NotFound(_))
        ));
    }

    #[test]
    fn test_unknown_animation_is_not_found() {
        assert!(matches!(AnimationStore::new().get("hero"), Err(TilesparkError::NotFound(_))));
    }
}
