//! Tileset resource.
//!
//! A tileset is an image divided into a grid of equally sized tiles, indexed
//! row-major from the top-left. Animations and tile sprites refer to tiles by
//! frame index; the renderer maps an index to a [`TileRect`] in the image.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{Result, TilesparkError};

/// Source rectangle of a tile (or any sub-region) inside an image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TileRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Grid of equally sized tiles over one texture.
#[derive(Debug, Clone)]
pub struct Tileset {
    tex_key: String,
    image_width: u32,
    image_height: u32,
    tile_width: u32,
    tile_height: u32,
    frame_count: u32,
    /// `(first_tile, last_tile, rect)` entries, rect relative to the tile's top-left corner.
    collision: Vec<(u32, u32, TileRect)>,
}

impl Tileset {
    /// Create a tileset over an image of `image_width` x `image_height` pixels.
    ///
    /// Partial tiles at the right or bottom edge are ignored. Grids with more
    /// than `u32::MAX` tiles are rejected.
    pub fn new(
        tex_key: impl Into<String>,
        image_width: u32,
        image_height: u32,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<Self> {
        let tex_key = tex_key.into();
        if tile_width == 0 || tile_height == 0 {
            return Err(TilesparkError::invalid(format!(
                "tileset '{}' has a zero tile dimension ({}x{})",
                tex_key, tile_width, tile_height
            )));
        }
        if tile_width > image_width || tile_height > image_height {
            return Err(TilesparkError::invalid(format!(
                "tileset '{}' tile {}x{} does not fit image {}x{}",
                tex_key, tile_width, tile_height, image_width, image_height
            )));
        }
        let columns = image_width / tile_width;
        let rows = image_height / tile_height;
        let frame_count = columns.checked_mul(rows).ok_or_else(|| {
            TilesparkError::invalid(format!(
                "tileset '{}' grid of {}x{} tiles exceeds the frame index range",
                tex_key, columns, rows
            ))
        })?;
        Ok(Self {
            tex_key,
            image_width,
            image_height,
            tile_width,
            tile_height,
            frame_count,
            collision: Vec::new(),
        })
    }

    pub fn tex_key(&self) -> &str {
        &self.tex_key
    }

    pub fn columns(&self) -> u32 {
        self.image_width / self.tile_width
    }

    pub fn rows(&self) -> u32 {
        self.image_height / self.tile_height
    }

    /// Total number of tiles (frames) in the grid.
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn tile_dimensions(&self) -> (u32, u32) {
        (self.tile_width, self.tile_height)
    }

    pub fn image_dimensions(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    fn check_tile(&self, tile: u32) -> Result<()> {
        if tile >= self.frame_count {
            return Err(TilesparkError::out_of_range(
                "tile",
                tile as usize,
                self.frame_count as usize,
            ));
        }
        Ok(())
    }

    /// Source rectangle of `frame` in the image.
    pub fn tile_rect(&self, frame: u32) -> Result<TileRect> {
        self.check_tile(frame)?;
        let columns = self.columns();
        Ok(TileRect {
            x: (frame % columns) * self.tile_width,
            y: (frame / columns) * self.tile_height,
            width: self.tile_width,
            height: self.tile_height,
        })
    }

    /// Attach `rect` to every tile in `first_tile..=last_tile`.
    ///
    /// The range is stored as one entry regardless of how many tiles it spans.
    pub fn add_collision_rect(&mut self, rect: TileRect, first_tile: u32, last_tile: u32) -> Result<()> {
        self.check_tile(last_tile)?;
        if first_tile > last_tile {
            return Err(TilesparkError::invalid(format!(
                "collision tile range {}-{} is inverted",
                first_tile, last_tile
            )));
        }
        self.collision.push((first_tile, last_tile, rect));
        Ok(())
    }

    /// Collision rectangles of `tile` in insertion order, empty for tiles without any.
    pub fn collision_rects(&self, tile: u32) -> Result<SmallVec<[TileRect; 2]>> {
        self.check_tile(tile)?;
        Ok(self
            .collision
            .iter()
            .filter(|(first, last, _)| (*first..=*last).contains(&tile))
            .map(|(_, _, rect)| *rect)
            .collect())
    }
}
