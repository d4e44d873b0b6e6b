//! Pixel I/O backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the pipeline's only contact with the
//! outside world: it supplies decoded sources and persists encoded results.
//! The crop core itself (geometry, session, raster, encode) never touches a
//! path or a socket.
//!
//! The production implementation is
//! [`RustBackend`](crate::rust_backend::RustBackend) — pure Rust decoders
//! from the `image` crate, statically linked.

use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for pixel I/O backends.
///
/// `Sync` so a shared backend reference can be used from rayon workers in
/// the batch pipeline.
pub trait ImageBackend: Sync {
    /// Get image dimensions without a full decode.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode a source image.
    fn load(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Persist an encoded result.
    fn save(&self, path: &Path, bytes: &[u8]) -> Result<(), BackendError>;
}
