//! Crate-wide error type.
//!
//! The rasterizer is designed around total functions -- see the crate's design
//! notes -- so the only fallible operations are construction: a zero-dimensioned
//! [`crate::FrameBuffer`]/[`crate::DepthBuffer`]/[`crate::Renderer`]/
//! [`crate::OcclusionDetector`], or a size-mismatched [`crate::Texture`].
//! Everything downstream of a successfully-constructed value is infallible by
//! design.

use thiserror::Error;

/// The only two ways a caller can misuse this crate's constructors.
#[derive(Debug, Error)]
pub enum RasterError {
    /// A framebuffer, depth buffer, renderer or occlusion detector was constructed
    /// with a zero width or height.
    #[error("width and height must both be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    /// A texture's byte span didn't match `width * height * 4` (and wasn't the
    /// empty span of an "invalid" zero-sized texture).
    #[error("texture data length {actual} does not match width*height*4 ({expected})")]
    TextureSizeMismatch { expected: usize, actual: usize },
}

/// Shorthand for `Result<T, RasterError>`.
pub type RasterResult<T> = Result<T, RasterError>;
