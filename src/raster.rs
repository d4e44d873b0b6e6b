//! Rasterization of a committed crop session.
//!
//! [`render`] turns the exact state the session last produced into a fixed
//! `V × V` pixel canvas. It deliberately performs no geometry of its own —
//! scale and offset come straight from [`CropState`], so the output matches
//! the interactive preview pixel for pixel (what-you-see-is-what-you-get).
//!
//! This is the expensive step of the pipeline (proportional to `V²` plus a
//! Lanczos3 resample of the source) and runs once per session at commit,
//! never per frame.

use crate::session::CropState;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

/// Draw the crop described by `state` onto a fresh `viewport × viewport`
/// canvas filled with `background`.
///
/// The background shows through only where float rounding leaves a sliver at
/// an edge, or where the source carries alpha — coverage math guarantees the
/// scaled image spans the whole viewport.
pub fn render(
    source: &DynamicImage,
    state: &CropState,
    viewport: u32,
    background: Rgb<u8>,
) -> RgbImage {
    let scale = state.effective_scale();
    let scaled_w = ((source.width() as f64 * scale).round() as u32).max(1);
    let scaled_h = ((source.height() as f64 * scale).round() as u32).max(1);

    let scaled = source.resize_exact(scaled_w, scaled_h, FilterType::Lanczos3);

    // The offset is the image's translation; the crop origin in scaled-image
    // space is its negation. Clamping keeps it in [0, scaled_dim - V], so
    // rounding is the only way the window can poke past the edge —
    // crop_imm truncates there and the background fills the rest.
    let src_x = (-state.offset.x).round().max(0.0) as u32;
    let src_y = (-state.offset.y).round().max(0.0) as u32;
    let window = scaled.crop_imm(src_x, src_y, viewport, viewport);

    let Rgb([r, g, b]) = background;
    let mut canvas = RgbaImage::from_pixel(viewport, viewport, Rgba([r, g, b, 255]));
    image::imageops::overlay(&mut canvas, &window.to_rgba8(), 0, 0);

    DynamicImage::ImageRgba8(canvas).to_rgb8()
}
