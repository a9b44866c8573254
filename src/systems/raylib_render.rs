//! Raylib render backend.
//!
//! [`RaylibContext`] implements [`RenderContext`] on top of a raylib draw
//! handle. Particles are shaded on the CPU with [`ParticleVertex::shade`] and
//! drawn as small squares; textures come from a [`TextureStore`] keyed by
//! tileset name. Tilesets without an image are skipped. Transforms map
//! render space to window pixels (see
//! [`Projection::letterbox`](crate::resources::projection::Projection::letterbox));
//! their scale is applied to quad sizes, point sizes and font sizes.

use glam::{Mat4, Vec2, Vec3, Vec4};
use log::{debug, info, warn};
use raylib::prelude::*;
use rustc_hash::FxHashMap;

use crate::components::drawable::Text;
use crate::error::{Result, TilesparkError};
use crate::render::{DrawCommand, PARTICLE_POINT_SIZE, ParticleVertex, RenderContext};
use crate::resources::tileset::TileRect;
use crate::resources::tilesetstore::TilesetStore;

/// Loaded textures keyed by tileset name.
#[derive(Default)]
pub struct TextureStore {
    pub map: FxHashMap<String, Texture2D>,
}

impl TextureStore {
    /// Load the image of every tileset declared with a `src`.
    pub fn load(rl: &mut RaylibHandle, thread: &RaylibThread, tilesets: &TilesetStore) -> Result<Self> {
        let mut store = Self::default();
        for (name, entry) in &tilesets.tilesets {
            if entry.src.is_none() {
                warn!("Tileset '{}' has no src, its tiles will not be drawn", name);
            }
        }
        for (key, path) in tilesets.sources() {
            let path_str = path
                .to_str()
                .ok_or_else(|| TilesparkError::ResourceUnavailable(format!("non UTF-8 path {:?}", path)))?;
            let texture = rl
                .load_texture(thread, path_str)
                .map_err(|e| TilesparkError::ResourceUnavailable(format!("texture '{}': {}", path_str, e)))?;
            info!("Loaded texture '{}' from {}", key, path_str);
            store.map.insert(key.to_string(), texture);
        }
        Ok(store)
    }
}

fn to_color(c: Vec4) -> Color {
    let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::new(byte(c.x), byte(c.y), byte(c.z), byte(c.w))
}

fn origin(transform: &Mat4) -> Vec2 {
    transform.transform_point3(Vec3::ZERO).truncate()
}

fn scale(transform: &Mat4) -> Vec2 {
    Vec2::new(
        transform.x_axis.truncate().length(),
        transform.y_axis.truncate().length(),
    )
}

pub struct RaylibContext<'a, D: RaylibDraw> {
    d: &'a mut D,
    textures: &'a TextureStore,
    transform: Mat4,
    life: i32,
}

impl<'a, D: RaylibDraw> RaylibContext<'a, D> {
    pub fn new(d: &'a mut D, textures: &'a TextureStore) -> Self {
        Self {
            d,
            textures,
            transform: Mat4::IDENTITY,
            life: 0,
        }
    }
}

impl<D: RaylibDraw> RenderContext for RaylibContext<'_, D> {
    fn set_transform(&mut self, transform: &Mat4) {
        self.transform = *transform;
    }

    fn set_generation_life(&mut self, life: i32) {
        self.life = life;
    }

    fn draw_arrays(&mut self, buffer: &[ParticleVertex], command: DrawCommand) {
        let Some(vertices) = command.slice(buffer) else {
            warn!("Skipping draw of {} vertices at {}", command.count, command.first);
            return;
        };
        let size = PARTICLE_POINT_SIZE * scale(&self.transform).x;
        let half = size * 0.5;
        for vertex in vertices {
            let (pos, color) = vertex.shade(self.life);
            let pos = self.transform.transform_point3(pos.extend(0.0));
            self.d.draw_rectangle_v(
                Vector2::new(pos.x - half, pos.y - half),
                Vector2::new(size, size),
                to_color(color),
            );
        }
    }

    fn draw_texture(&mut self, transform: &Mat4, tex_key: &str, src: Option<TileRect>, size: Vec2) {
        let Some(texture) = self.textures.map.get(tex_key) else {
            debug!("Texture '{}' not loaded", tex_key);
            return;
        };
        let src = match src {
            Some(r) => Rectangle::new(r.x as f32, r.y as f32, r.width as f32, r.height as f32),
            None => Rectangle::new(0.0, 0.0, texture.width as f32, texture.height as f32),
        };
        let at = origin(transform);
        let size = size * scale(transform);
        let dest = Rectangle::new(at.x, at.y, size.x, size.y);
        self.d
            .draw_texture_pro(texture, src, dest, Vector2::zero(), 0.0, Color::WHITE);
    }

    fn draw_text(&mut self, transform: &Mat4, text: &Text) {
        let at = origin(transform);
        let [r, g, b, a] = text.color;
        self.d.draw_text(
            &text.content,
            at.x as i32,
            at.y as i32,
            (text.font_size * scale(transform).y) as i32,
            Color::new(r, g, b, a),
        );
    }
}
