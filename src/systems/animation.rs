//! Animation system.
//!
//! [`animation`] ticks every [`Animation`] cursor once per frame. Each cursor
//! advances its frame every `refresh_rate` ticks; when the entity draws a
//! [`TileSprite`](crate::components::drawable::TileSprite) over the same
//! tileset as the animation, the current frame is copied into it so the
//! renderer picks the right tile. Sprites over another tileset are left alone.
//!
//! # Related
//!
//! - [`crate::components::animation::Animation`] – per-entity playback cursor
//! - [`crate::resources::animationstore::AnimationStore`] – shared catalogs

use std::sync::Arc;

use bevy_ecs::prelude::*;

use crate::components::animation::Animation;
use crate::components::drawable::Drawable;

/// Advance animation playback and update the tile sprite frame.
pub fn animation(mut query: Query<(&mut Animation, Option<&mut Drawable>)>) {
    for (mut anim, drawable) in query.iter_mut() {
        anim.tick();
        if let Some(mut drawable) = drawable
            && let Drawable::TileSprite(tile) = &mut *drawable
            && Arc::ptr_eq(&tile.tileset, anim.data().tileset())
            && tile.tile != anim.current_frame()
        {
            tile.tile = anim.current_frame();
        }
    }
}
