//! Texture storage and sampling
//!
//! The tank uses three 256x256 RGBA textures decoded from SGI files at
//! startup. Sampling follows the fixed-function defaults the scene was
//! modelled with: repeat wrapping and nearest-neighbour filtering.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::sgi::{self, DecodeError};

/// A texture stored as RGBA pixels, row 0 at texture coordinate v = 0
#[derive(Debug, Clone)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<u8>, // RGBA format, 4 bytes per pixel
}

impl Texture {
    /// Create a new transparent black texture
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Set a pixel in the texture
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8, a: u8) {
        if x < self.width && y < self.height {
            let idx = ((y * self.width + x) * 4) as usize;
            self.pixels[idx] = r;
            self.pixels[idx + 1] = g;
            self.pixels[idx + 2] = b;
            self.pixels[idx + 3] = a;
        }
    }

    /// Write a single channel (0 = R .. 3 = A) of one pixel
    #[inline]
    pub fn set_channel(&mut self, x: u32, y: u32, channel: usize, value: u8) {
        if x < self.width && y < self.height && channel < 4 {
            let idx = ((y * self.width + x) * 4) as usize + channel;
            self.pixels[idx] = value;
        }
    }

    /// Read one pixel as (r, g, b, a), or None outside the texture
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<(u8, u8, u8, u8)> {
        if x < self.width && y < self.height {
            let idx = ((y * self.width + x) * 4) as usize;
            Some((
                self.pixels[idx],
                self.pixels[idx + 1],
                self.pixels[idx + 2],
                self.pixels[idx + 3],
            ))
        } else {
            None
        }
    }

    /// Sample with UV coordinates, repeat wrapping, nearest filtering.
    /// Returns RGBA including the alpha channel.
    #[inline]
    pub fn sample_rgba(&self, u: f32, v: f32) -> (u8, u8, u8, u8) {
        // Wrap UV coordinates using rem_euclid for correct negative handling
        let u = u.rem_euclid(1.0);
        let v = v.rem_euclid(1.0);

        let x = (u * self.width as f32) as u32 % self.width;
        let y = (v * self.height as f32) as u32 % self.height;

        let idx = ((y * self.width + x) * 4) as usize;
        (
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        )
    }

    /// Generate a checkerboard pattern (stand-in texture for tests and previews)
    pub fn checkerboard(size: u32, tile_size: u32, c1: (u8, u8, u8), c2: (u8, u8, u8)) -> Self {
        let mut tex = Self::new(size, size);
        for y in 0..size {
            for x in 0..size {
                let checker = ((x / tile_size) + (y / tile_size)) % 2 == 0;
                let (r, g, b) = if checker { c1 } else { c2 };
                tex.set_pixel(x, y, r, g, b, 255);
            }
        }
        tex
    }
}

// ============================================================================
// Texture set
// ============================================================================

/// The three textures bound by the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureId {
    Sand,
    Ground,
    Wood,
}

impl TextureId {
    pub const ALL: [Self; 3] = [Self::Sand, Self::Ground, Self::Wood];

    #[inline]
    const fn index(self) -> usize {
        match self {
            Self::Sand => 0,
            Self::Ground => 1,
            Self::Wood => 2,
        }
    }
}

/// Failure to load one of the startup textures
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("can not open texture file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("texture file {} is not a 256x256 RLE SGI image", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
}

/// Where the three textures are read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TexturePaths {
    pub sand: PathBuf,
    pub ground: PathBuf,
    pub wood: PathBuf,
}

impl Default for TexturePaths {
    fn default() -> Self {
        Self {
            sand: PathBuf::from("sand.rgb"),
            ground: PathBuf::from("surface.rgb"),
            wood: PathBuf::from("tex0-28420"),
        }
    }
}

impl TexturePaths {
    pub fn get(&self, id: TextureId) -> &Path {
        match id {
            TextureId::Sand => &self.sand,
            TextureId::Ground => &self.ground,
            TextureId::Wood => &self.wood,
        }
    }
}

/// Decoded textures indexed by [`TextureId`]
#[derive(Debug, Clone)]
pub struct TextureSet {
    textures: [Texture; 3],
}

impl TextureSet {
    /// Build a set from already decoded textures, in `TextureId::ALL` order
    pub fn from_textures(textures: [Texture; 3]) -> Self {
        Self { textures }
    }

    /// Decode every texture; the first failure aborts the load
    pub fn load(paths: &TexturePaths) -> Result<Self, TextureError> {
        let [sand, ground, wood] = TextureId::ALL.map(|id| paths.get(id).to_path_buf());
        let textures = [sgi::load(sand)?, sgi::load(ground)?, sgi::load(wood)?];
        tracing::info!("loaded {} textures", textures.len());
        Ok(Self { textures })
    }

    #[inline]
    pub fn get(&self, id: TextureId) -> &Texture {
        &self.textures[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_wraps_and_picks_nearest() {
        let mut tex = Texture::new(4, 4);
        tex.set_pixel(0, 0, 10, 20, 30, 255);
        tex.set_pixel(3, 3, 1, 2, 3, 4);
        assert_eq!(tex.sample_rgba(0.1, 0.1), (10, 20, 30, 255));
        assert_eq!(tex.sample_rgba(1.1, -0.9), (10, 20, 30, 255));
        assert_eq!(tex.sample_rgba(0.9, 0.9), (1, 2, 3, 4));
        assert_eq!(tex.sample_rgba(-0.1, -0.1), (1, 2, 3, 4));
    }

    #[test]
    fn test_set_channel_only_touches_one_byte() {
        let mut tex = Texture::new(2, 2);
        tex.set_channel(1, 0, 2, 99);
        assert_eq!(tex.pixel(1, 0), Some((0, 0, 99, 0)));
        tex.set_channel(5, 0, 0, 1);
        assert_eq!(tex.pixel(5, 0), None);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let paths = TexturePaths {
            sand: PathBuf::from("/nonexistent/sand.rgb"),
            ..TexturePaths::default()
        };
        match TextureSet::load(&paths) {
            Err(TextureError::Io { path, .. }) => assert_eq!(path, paths.sand),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn test_set_indexes_by_id() {
        let set = TextureSet::from_textures([
            Texture::checkerboard(8, 4, (1, 1, 1), (0, 0, 0)),
            Texture::checkerboard(8, 4, (2, 2, 2), (0, 0, 0)),
            Texture::checkerboard(8, 4, (3, 3, 3), (0, 0, 0)),
        ]);
        assert_eq!(set.get(TextureId::Ground).pixel(0, 0), Some((2, 2, 2, 255)));
        assert_eq!(set.get(TextureId::Wood).pixel(0, 0), Some((3, 3, 3, 255)));
    }
}
