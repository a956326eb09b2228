//! Sampled color buffers: textures feed [`crate::Material::fragment`] via UV lookups.

use nalgebra::{Vector2, Vector4};

use crate::color::Color;
use crate::error::{RasterError, RasterResult};

/// A width·height RGBA8 buffer, sampled either by integer coordinate (wrap-around)
/// or by normalized UV.
///
/// A texture with `width = height = 0` and empty data is "invalid" and samples as
/// opaque white everywhere -- this is the default, so a material can unconditionally
/// hold a texture field without an `Option`.
#[derive(Debug, Clone)]
pub struct Texture {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Texture {
    /// `data` must be exactly `width * height * 4` bytes, unless `width` and
    /// `height` are both zero and `data` is empty (the "invalid" texture).
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> RasterResult<Texture> {
        let expected = width as usize * height as usize * 4;
        let is_invalid = width == 0 && height == 0 && data.is_empty();

        if data.len() != expected && !is_invalid {
            return Err(RasterError::TextureSizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Texture { width, height, data })
    }

    /// The canonical invalid texture: zero-sized, samples as opaque white.
    pub fn invalid() -> Texture {
        Texture {
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Integer pixel fetch with wrap-around addressing on both axes. An invalid
    /// texture always returns opaque white.
    pub fn get_color(&self, x: i64, y: i64) -> Color {
        if !self.is_valid() {
            return Color::WHITE;
        }

        let px = x.rem_euclid(self.width as i64) as usize;
        let py = y.rem_euclid(self.height as i64) as usize;
        let i = (py * self.width as usize + px) * 4;

        Color::new(self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3])
    }

    /// Writes four bytes at `(x, y)`. The caller guarantees `x < width`, `y < height`.
    pub fn set_color(&mut self, x: u32, y: u32, color: Color) {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data[i] = color.r;
        self.data[i + 1] = color.g;
        self.data[i + 2] = color.b;
        self.data[i + 3] = color.a;
    }

    /// Normalized sample: `uv` in `[0,1]`, with `v` flipped so `v=0` addresses the
    /// texture's top row. Returns a float RGBA in `[0,1]`.
    pub fn sample(&self, uv: Vector2<f32>) -> Vector4<f32> {
        let u = uv.x * self.width as f32;
        let v = self.height as f32 - uv.y * self.height as f32;

        self.get_color(u.floor() as i64, v.floor() as i64).to_normalized()
    }
}
