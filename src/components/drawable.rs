//! Drawable component: the closed set of things the renderer knows how to draw.
//!
//! Every visible entity carries exactly one [`Drawable`]. The variants are
//! dispatched by [`render_drawable`](crate::systems::render::render_drawable);
//! there is no open trait to implement.
//!
//! - [`Drawable::Sprite`] – a whole texture
//! - [`Drawable::TileSprite`] – one tile of a [`Tileset`], optionally animated
//!   by an [`Animation`](crate::components::animation::Animation) on the same entity
//! - [`Drawable::Particles`] – a [`ParticleSystem`]
//! - [`Drawable::Text`] – a single line of text
//! - [`Drawable::Gui`] – a container drawing its children in insertion order

use std::sync::Arc;

use bevy_ecs::prelude::Component;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::components::particlesystem::ParticleSystem;
use crate::error::Result;
use crate::resources::tileset::{TileRect, Tileset};

/// Axis-aligned rectangle in drawable-local (or world) units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
            ..*self
        }
    }

    /// Strict overlap; rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

impl From<TileRect> for Rect {
    fn from(r: TileRect) -> Self {
        Rect::new(r.x as f32, r.y as f32, r.width as f32, r.height as f32)
    }
}

#[derive(Debug, Clone)]
pub struct Sprite {
    pub tex_key: String,
    pub size: Vec2,
}

#[derive(Debug, Clone)]
pub struct TileSprite {
    pub tileset: Arc<Tileset>,
    pub tile: u32,
}

impl TileSprite {
    pub fn new(tileset: Arc<Tileset>, tile: u32) -> Self {
        Self { tileset, tile }
    }

    pub fn tile_rect(&self) -> Result<TileRect> {
        self.tileset.tile_rect(self.tile)
    }

    pub fn size(&self) -> Vec2 {
        let (w, h) = self.tileset.tile_dimensions();
        Vec2::new(w as f32, h as f32)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub content: String,
    pub font_size: f32,
    pub color: [u8; 4],
}

impl Text {
    pub fn new(content: impl Into<String>, font_size: f32) -> Self {
        Self {
            content: content.into(),
            font_size,
            color: [255, 255, 255, 255],
        }
    }
}

/// Child of a [`GuiContainer`], placed at `offset` from the container origin.
#[derive(Debug, Clone)]
pub struct GuiChild {
    pub offset: Vec2,
    pub drawable: Drawable,
}

#[derive(Debug, Clone, Default)]
pub struct GuiContainer {
    pub children: Vec<GuiChild>,
}

impl GuiContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_child(mut self, offset: Vec2, drawable: Drawable) -> Self {
        self.children.push(GuiChild { offset, drawable });
        self
    }
}

#[derive(Debug, Clone, Component)]
pub enum Drawable {
    Sprite(Sprite),
    TileSprite(TileSprite),
    Particles(ParticleSystem),
    Text(Text),
    Gui(GuiContainer),
}

impl Drawable {
    /// Collision rectangles relative to the drawable's origin.
    ///
    /// Sprites use their full bounds. Tile sprites use the tileset's rects
    /// for the current tile, falling back to the full tile. Particles and
    /// text never collide.
    pub fn collision_rects(&self) -> Vec<Rect> {
        match self {
            Drawable::Sprite(sprite) => vec![Rect::new(0.0, 0.0, sprite.size.x, sprite.size.y)],
            Drawable::TileSprite(tile) => match tile.tileset.collision_rects(tile.tile) {
                Ok(rects) if !rects.is_empty() => rects.iter().copied().map(Rect::from).collect(),
                _ => {
                    let size = tile.size();
                    vec![Rect::new(0.0, 0.0, size.x, size.y)]
                }
            },
            Drawable::Particles(ps) => ps.collision_rects().to_vec(),
            Drawable::Text(_) => Vec::new(),
            Drawable::Gui(gui) => gui
                .children
                .iter()
                .flat_map(|child| {
                    child
                        .drawable
                        .collision_rects()
                        .into_iter()
                        .map(move |r| r.translated(child.offset))
                })
                .collect(),
        }
    }

    /// Whether `self` placed at `at` overlaps `other` placed at `other_at`.
    pub fn collide(&self, at: Vec2, other: &Drawable, other_at: Vec2) -> bool {
        if let Drawable::Particles(ps) = self {
            return ps.collide(other);
        }
        if let Drawable::Particles(ps) = other {
            return ps.collide(self);
        }
        let theirs: Vec<Rect> = other
            .collision_rects()
            .into_iter()
            .map(|r| r.translated(other_at))
            .collect();
        self.collision_rects()
            .into_iter()
            .map(|r| r.translated(at))
            .any(|mine| theirs.iter().any(|t| mine.overlaps(t)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::particleconfig::ParticleSystemConfig;

    fn tileset() -> Arc<Tileset> {
        let mut t = Tileset::new("tiles", 64, 64, 32, 32).unwrap();
        t.add_collision_rect(TileRect::new(8, 8, 16, 16), 1, 1).unwrap();
        Arc::new(t)
    }

    fn sprite(w: f32, h: f32) -> Drawable {
        Drawable::Sprite(Sprite {
            tex_key: "box".into(),
            size: Vec2::new(w, h),
        })
    }

    #[test]
    fn test_rect_overlap_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(0.0, 20.0, 1.0, 1.0)));
    }

    #[test]
    fn test_tile_sprite_uses_tileset_rects() {
        let d = Drawable::TileSprite(TileSprite::new(tileset(), 1));
        assert_eq!(d.collision_rects(), vec![Rect::new(8.0, 8.0, 16.0, 16.0)]);
        let d = Drawable::TileSprite(TileSprite::new(tileset(), 0));
        assert_eq!(d.collision_rects(), vec![Rect::new(0.0, 0.0, 32.0, 32.0)]);
    }

    #[test]
    fn test_sprites_collide_by_bounds() {
        let a = sprite(10.0, 10.0);
        let b = sprite(10.0, 10.0);
        assert!(a.collide(Vec2::ZERO, &b, Vec2::new(5.0, 5.0)));
        assert!(!a.collide(Vec2::ZERO, &b, Vec2::new(50.0, 0.0)));
    }

    #[test]
    fn test_particles_never_collide() {
        let mut rng = fastrand::Rng::with_seed(1);
        let ps = Drawable::Particles(
            ParticleSystem::new(ParticleSystemConfig::new(1, 1), &mut rng).unwrap(),
        );
        let s = sprite(100.0, 100.0);
        assert!(!ps.collide(Vec2::ZERO, &s, Vec2::ZERO));
        assert!(!s.collide(Vec2::ZERO, &ps, Vec2::ZERO));
        assert!(ps.collision_rects().is_empty());
    }

    #[test]
    fn test_gui_offsets_children() {
        let gui = Drawable::Gui(
            GuiContainer::new()
                .with_child(Vec2::new(100.0, 0.0), sprite(10.0, 10.0))
                .with_child(Vec2::ZERO, Drawable::Text(Text::new("score", 12.0))),
        );
        assert_eq!(gui.collision_rects(), vec![Rect::new(100.0, 0.0, 10.0, 10.0)]);
        assert!(gui.collide(Vec2::ZERO, &sprite(5.0, 5.0), Vec2::new(102.0, 2.0)));
        assert!(!gui.collide(Vec2::ZERO, &sprite(5.0, 5.0), Vec2::ZERO));
    }
}
