//! Depth testing and the depth buffer.

use crate::error::{RasterError, RasterResult};

/// How a fragment's depth compares against the buffer before it's accepted.
///
/// Depth is stored so that *larger values are closer* to the camera (see
/// [`crate::geometry::project_to_screen`]), which inverts the usual sense of
/// `Less`/`Greater`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthTest {
    /// Every fragment passes; the buffer is never read or written.
    None,
    /// Passes when `stored < candidate`, i.e. the fragment is closer (larger depth
    /// value) than what's stored. The normal mode under the larger-is-closer
    /// convention.
    Less,
    /// Passes when `stored > candidate`, i.e. the fragment is farther than what's
    /// stored.
    Greater,
}

impl Default for DepthTest {
    fn default() -> DepthTest {
        DepthTest::Less
    }
}

/// A `width x height` buffer of `f32` depth values, cleared to `0.0` -- the farthest
/// possible value under the larger-is-closer convention.
#[derive(Debug, Clone)]
pub struct DepthBuffer {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl DepthBuffer {
    /// Fails if `width` or `height` is zero, matching [`crate::Renderer::new`]'s guard
    /// -- a zero-dimensioned buffer can't be indexed by [`DepthBuffer::get`]/
    /// [`DepthBuffer::set`] without panicking.
    pub fn new(width: u32, height: u32) -> RasterResult<DepthBuffer> {
        if width == 0 || height == 0 {
            return Err(RasterError::ZeroDimensions { width, height });
        }

        Ok(DepthBuffer {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn clear(&mut self) {
        for d in self.data.iter_mut() {
            *d = 0.0;
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, depth: f32) {
        let i = self.index(x, y);
        self.data[i] = depth;
    }

    /// Tests `depth` at `(x, y)` against `test`, without writing the buffer.
    pub fn test(&self, test: DepthTest, x: u32, y: u32, depth: f32) -> bool {
        match test {
            DepthTest::None => true,
            DepthTest::Less => self.get(x, y) < depth,
            DepthTest::Greater => self.get(x, y) > depth,
        }
    }
}
