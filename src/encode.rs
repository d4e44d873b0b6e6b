//! Size-constrained JPEG encoding.
//!
//! [`encode_with_budget`] walks a fixed quality ladder downwards until the
//! encoded image fits the byte budget. An unreachable budget is not an
//! error: the smallest attempt is returned instead, because a slightly
//! oversized cover beats no cover at all.
//!
//! The ladder is finite by construction (step count is computed as an
//! integer, see [`QualityLadder::levels`]) so the loop is bounded and
//! quality can never drift to zero or below.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use std::io::Cursor;
use thiserror::Error;

/// MIME type of everything this module produces. The encoder and the
/// declared type must never diverge.
pub const JPEG_MIME: &str = "image/jpeg";

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("JPEG encode failed: {0}")]
    Jpeg(#[from] image::ImageError),
}

/// Descending quality schedule for the budget loop.
///
/// Values are fractions in `(0, 1]`. The default ladder is
/// `0.9, 0.8, ..., 0.1` — nine attempts at most.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityLadder {
    pub start: f32,
    pub floor: f32,
    pub step: f32,
}

impl Default for QualityLadder {
    fn default() -> Self {
        Self {
            start: 0.9,
            floor: 0.1,
            step: 0.1,
        }
    }
}

impl QualityLadder {
    /// Hard cap on ladder length. Config validation rejects ladders this
    /// long ([`CropConfig::validate`](crate::config::CropConfig::validate));
    /// the cap here keeps the encode loop bounded for direct callers that
    /// hand in a degenerate step.
    pub const MAX_LEVELS: usize = 100;

    /// Quality levels from `start` down to the hard `floor`, inclusive.
    ///
    /// The step count is rounded to an integer up front, so repeated float
    /// subtraction cannot accumulate past the floor, and is capped at
    /// [`MAX_LEVELS`](Self::MAX_LEVELS) entries.
    pub fn levels(&self) -> Vec<f32> {
        let steps = ((self.start - self.floor) / self.step).round().max(0.0) as usize;
        let steps = steps.min(Self::MAX_LEVELS - 1);
        (0..=steps)
            .map(|i| (self.start - i as f32 * self.step).max(self.floor))
            .collect()
    }
}

/// An encoded crop, ready to hand to storage.
#[derive(Debug, Clone)]
pub struct EncodedResult {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
    /// Quality the returned bytes were encoded at.
    pub quality: f32,
}

impl EncodedResult {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encode `raster` as JPEG within `max_bytes` if possible.
///
/// Tries each ladder level in order and returns the first encoding that
/// fits. If none fits, returns the smallest attempt (best effort at the
/// quality floor). Deterministic: identical input tries the same levels and
/// stops at the same one.
pub fn encode_with_budget(
    raster: &RgbImage,
    max_bytes: usize,
    ladder: QualityLadder,
) -> Result<EncodedResult, EncodeError> {
    let mut smallest: Option<EncodedResult> = None;

    for quality in ladder.levels() {
        let bytes = encode_jpeg(raster, quality)?;
        if bytes.len() <= max_bytes {
            return Ok(EncodedResult {
                bytes,
                mime_type: JPEG_MIME,
                quality,
            });
        }
        let attempt = EncodedResult {
            bytes,
            mime_type: JPEG_MIME,
            quality,
        };
        if smallest
            .as_ref()
            .is_none_or(|best| attempt.len() < best.len())
        {
            smallest = Some(attempt);
        }
    }

    match smallest {
        Some(best) => Ok(best),
        // Unreachable with a sane ladder (levels() is never empty), kept as
        // a plain fallback rather than a panic path.
        None => {
            let bytes = encode_jpeg(raster, ladder.floor)?;
            Ok(EncodedResult {
                bytes,
                mime_type: JPEG_MIME,
                quality: ladder.floor,
            })
        }
    }
}

/// One JPEG encode at the given fractional quality.
fn encode_jpeg(raster: &RgbImage, quality: f32) -> Result<Vec<u8>, EncodeError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(
        Cursor::new(&mut buf),
        (quality * 100.0).round().clamp(1.0, 100.0) as u8,
    );
    encoder.write_image(
        raster.as_raw(),
        raster.width(),
        raster.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(buf)
}
