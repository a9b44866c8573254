//! Render pass.
//!
//! Drawables are collected, sorted by [`ZIndex`] (ties broken by entity so
//! the order is stable between frames), then submitted to a
//! [`RenderContext`]. The pass never touches a graphics API directly; the
//! headless binary mode records into a [`DrawList`] and the raylib backend
//! rasterizes.
//!
//! Drawing a particle system also advances its generation ring, so every
//! render pass is one particle tick.

use bevy_ecs::prelude::*;
use glam::{Mat4, Vec2};
use log::warn;

use crate::components::drawable::Drawable;
use crate::components::mapposition::MapPosition;
use crate::components::zindex::ZIndex;
use crate::error::Result;
use crate::render::RenderContext;
use crate::resources::drawlist::DrawList;
use crate::resources::projection::Projection;

fn translation(offset: Vec2) -> Mat4 {
    Mat4::from_translation(offset.extend(0.0))
}

/// Submit one drawable under `transform`.
///
/// GUI containers draw their children in insertion order, each offset from
/// the container origin.
pub fn render_drawable(drawable: &mut Drawable, transform: &Mat4, ctx: &mut dyn RenderContext) -> Result<()> {
    match drawable {
        Drawable::Sprite(sprite) => {
            ctx.draw_texture(transform, &sprite.tex_key, None, sprite.size);
        }
        Drawable::TileSprite(tile) => {
            let src = tile.tile_rect()?;
            ctx.draw_texture(transform, tile.tileset.tex_key(), Some(src), tile.size());
        }
        Drawable::Particles(particles) => particles.draw_and_update(transform, ctx),
        Drawable::Text(text) => ctx.draw_text(transform, text),
        Drawable::Gui(gui) => {
            for child in gui.children.iter_mut() {
                let child_transform = *transform * translation(child.offset);
                render_drawable(&mut child.drawable, &child_transform, ctx)?;
            }
        }
    }
    Ok(())
}

/// Draw every entity holding a [`Drawable`] in z order.
///
/// Entities without a [`MapPosition`] draw at the origin; entities without a
/// [`ZIndex`] draw at z 0. A drawable that fails (for example a tile sprite
/// pointing past its tileset) is logged and skipped.
pub fn render_pass(world: &mut World, ctx: &mut dyn RenderContext) {
    let projection = world.get_resource::<Projection>().copied().unwrap_or_default();

    let mut query = world.query::<(Entity, &mut Drawable, Option<&MapPosition>, Option<&ZIndex>)>();
    let mut to_draw: Vec<_> = query
        .iter_mut(world)
        .map(|(entity, drawable, pos, z)| {
            let pos = pos.map(|p| p.pos).unwrap_or(Vec2::ZERO);
            (z.copied().unwrap_or_default(), entity, pos, drawable)
        })
        .collect();

    to_draw.sort_by_key(|(z, entity, _, _)| (*z, *entity));

    for (_z, entity, pos, mut drawable) in to_draw {
        let transform = projection.0 * translation(pos);
        if let Err(err) = render_drawable(&mut drawable, &transform, ctx) {
            warn!("Skipping drawable on {:?}: {}", entity, err);
        }
    }
}

/// Clear the world's [`DrawList`] and record a fresh render pass into it.
///
/// Inserts an empty list first when the world has none.
pub fn record_draw_list(world: &mut World) {
    if !world.contains_resource::<DrawList>() {
        world.insert_resource(DrawList::new());
    }
    world.resource_scope(|world, mut list: Mut<DrawList>| {
        list.clear();
        render_pass(world, &mut *list);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::components::drawable::{GuiContainer, Sprite, Text, TileSprite};
    use crate::resources::drawlist::DrawOp;
    use crate::resources::tileset::{TileRect, Tileset};

    fn sprite(key: &str) -> Drawable {
        Drawable::Sprite(Sprite {
            tex_key: key.into(),
            size: Vec2::new(8.0, 8.0),
        })
    }

    fn texture_keys(list: &DrawList) -> Vec<String> {
        list.ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Texture { tex_key, .. } => Some(tex_key.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_tile_sprite_submits_tile_rect() {
        let tileset = Arc::new(Tileset::new("tiles", 64, 64, 32, 32).unwrap());
        let mut d = Drawable::TileSprite(TileSprite::new(tileset, 3));
        let mut list = DrawList::new();
        render_drawable(&mut d, &Mat4::IDENTITY, &mut list).unwrap();
        assert_eq!(
            list.ops(),
            &[DrawOp::Texture {
                transform: Mat4::IDENTITY,
                tex_key: "tiles".into(),
                src: Some(TileRect::new(32, 32, 32, 32)),
                size: Vec2::new(32.0, 32.0),
            }]
        );
    }

    #[test]
    fn test_tile_past_tileset_is_error() {
        let tileset = Arc::new(Tileset::new("tiles", 32, 32, 32, 32).unwrap());
        let mut d = Drawable::TileSprite(TileSprite::new(tileset, 1));
        assert!(render_drawable(&mut d, &Mat4::IDENTITY, &mut DrawList::new()).is_err());
    }

    #[test]
    fn test_gui_children_offset_and_ordered() {
        let mut gui = Drawable::Gui(
            GuiContainer::new()
                .with_child(Vec2::new(10.0, 0.0), sprite("panel"))
                .with_child(Vec2::new(12.0, 4.0), Drawable::Text(Text::new("score", 10.0))),
        );
        let mut list = DrawList::new();
        let base = translation(Vec2::new(100.0, 100.0));
        render_drawable(&mut gui, &base, &mut list).unwrap();
        match &list.ops()[..] {
            [DrawOp::Texture { transform: t0, .. }, DrawOp::Text { transform: t1, content }] => {
                assert_eq!(t0.w_axis.truncate(), glam::Vec3::new(110.0, 100.0, 0.0));
                assert_eq!(t1.w_axis.truncate(), glam::Vec3::new(112.0, 104.0, 0.0));
                assert_eq!(content, "score");
            }
            other => panic!("unexpected ops {:?}", other),
        }
    }

    #[test]
    fn test_render_pass_sorts_by_z() {
        let mut world = World::new();
        world.spawn((sprite("top"), ZIndex(10), MapPosition::new(1.0, 2.0)));
        world.spawn((sprite("bottom"), ZIndex(-5)));
        world.spawn(sprite("middle"));
        record_draw_list(&mut world);
        let list = world.resource::<DrawList>();
        assert_eq!(texture_keys(list), vec!["bottom", "middle", "top"]);
        match list.ops().last() {
            Some(DrawOp::Texture { transform, .. }) => {
                assert_eq!(transform.w_axis.truncate(), glam::Vec3::new(1.0, 2.0, 0.0));
            }
            other => panic!("unexpected op {:?}", other),
        }
    }

    #[test]
    fn test_render_pass_applies_projection() {
        let mut world = World::new();
        let projection = Projection::orthographic(640.0, 360.0);
        world.insert_resource(projection);
        world.spawn((sprite("a"), MapPosition::new(5.0, 6.0)));
        record_draw_list(&mut world);
        match world.resource::<DrawList>().ops() {
            [DrawOp::Texture { transform, .. }] => {
                assert_eq!(*transform, projection.0 * translation(Vec2::new(5.0, 6.0)));
            }
            other => panic!("unexpected ops {:?}", other),
        }
    }

    #[test]
    fn test_record_draw_list_replaces_previous_frame() {
        let mut world = World::new();
        world.spawn(sprite("a"));
        record_draw_list(&mut world);
        record_draw_list(&mut world);
        assert_eq!(world.resource::<DrawList>().ops().len(), 1);
    }
}
