//! The color target a [`crate::Renderer`] draws into.

use crate::color::Color;
use crate::error::{RasterError, RasterResult};

/// A `width x height` buffer of [`Color`] pixels, row-major, origin at the top left.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl FrameBuffer {
    /// Fails if `width` or `height` is zero, matching [`crate::Renderer::new`]'s guard
    /// -- a zero-dimensioned buffer can't be indexed by [`FrameBuffer::get_pixel`]/
    /// [`FrameBuffer::set_pixel`] without panicking.
    pub fn new(width: u32, height: u32) -> RasterResult<FrameBuffer> {
        FrameBuffer::new_with(width, height, Color::TRANSPARENT)
    }

    pub fn new_with(width: u32, height: u32, fill: Color) -> RasterResult<FrameBuffer> {
        if width == 0 || height == 0 {
            return Err(RasterError::ZeroDimensions { width, height });
        }

        Ok(FrameBuffer {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self, color: Color) {
        for p in self.pixels.iter_mut() {
            *p = color;
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        let i = self.index(x, y);
        self.pixels[i] = color;
    }

    /// The raw row-major pixel buffer, for callers that need to hand it to a display
    /// surface without copying pixel by pixel.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_buffer_is_transparent() {
        let fb = FrameBuffer::new(4, 4).unwrap();
        assert_eq!(fb.get_pixel(0, 0), Color::TRANSPARENT);
    }

    #[test]
    fn clear_overwrites_every_pixel() {
        let mut fb = FrameBuffer::new(2, 2).unwrap();
        fb.set_pixel(0, 0, Color::WHITE);
        fb.clear(Color::BLACK);
        assert_eq!(fb.get_pixel(0, 0), Color::BLACK);
        assert_eq!(fb.get_pixel(1, 1), Color::BLACK);
    }

    #[test]
    fn bounds_check_rejects_negative_and_oversized_coordinates() {
        let fb = FrameBuffer::new(10, 10).unwrap();
        assert!(fb.in_bounds(0, 0));
        assert!(fb.in_bounds(9, 9));
        assert!(!fb.in_bounds(-1, 0));
        assert!(!fb.in_bounds(10, 0));
    }

    #[test]
    fn zero_dimensions_is_an_error() {
        assert!(FrameBuffer::new(0, 4).is_err());
        assert!(FrameBuffer::new(4, 0).is_err());
    }
}
