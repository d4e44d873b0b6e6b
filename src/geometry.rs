//! Pure geometry for the crop viewport.
//!
//! All functions here are pure and testable without any I/O or pixels. This
//! module is the single authority for the two crop invariants:
//!
//! - **Coverage**: the scaled image always fully covers the square viewport
//!   (cover semantics, never contain — no letterboxing).
//! - **Bounds**: the stored offset never exposes area outside the scaled
//!   image; every offset mutation must pass through [`clamp_offset`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("source dimensions must be positive, got {width}x{height}")]
    EmptySource { width: u32, height: u32 },
}

/// Natural (decoded) pixel dimensions of a source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Natural {
    pub width: u32,
    pub height: u32,
}

/// Top-left translation of the scaled image relative to the viewport's
/// top-left corner. Both components are always `<= 0` after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

/// A pointer position in viewport space (mouse or touch).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// User zoom range. The base scale already covers the viewport, so zoom
/// only ever magnifies.
pub const ZOOM_MIN: f64 = 1.0;
pub const ZOOM_MAX: f64 = 3.0;

/// Calculate the minimum scale at which the image fully covers the viewport.
///
/// Returns `max(V/w, V/h)`: the shorter dimension lands exactly on `V`, the
/// longer one overshoots and becomes pannable.
///
/// # Examples
/// ```
/// # use covercrop::geometry::{cover_scale, Natural};
/// // 800x600 into a 400px viewport → 400/600 on the short edge
/// let s = cover_scale(Natural { width: 800, height: 600 }, 400).unwrap();
/// assert!((s - 400.0 / 600.0).abs() < 1e-12);
/// ```
pub fn cover_scale(natural: Natural, viewport: u32) -> Result<f64, GeometryError> {
    if natural.width == 0 || natural.height == 0 {
        return Err(GeometryError::EmptySource {
            width: natural.width,
            height: natural.height,
        });
    }
    let v = viewport as f64;
    Ok((v / natural.width as f64).max(v / natural.height as f64))
}

/// Offset that centers the scaled image in the viewport.
///
/// Used once at session start so the initial crop shows the middle of the
/// image. The result is already within clamp bounds.
pub fn centered_offset(natural: Natural, scale: f64, viewport: u32) -> Offset {
    let v = viewport as f64;
    Offset {
        x: (v - natural.width as f64 * scale) / 2.0,
        y: (v - natural.height as f64 * scale) / 2.0,
    }
}

/// Clamp a proposed offset so the viewport never shows past the image edge.
///
/// Per axis: `min(max(proposed, V - scaled_dim), 0)`. When the scaled
/// dimension equals `V` exactly there is no pan room and the axis clamps
/// to `0` (the lower bound collapses onto the upper one).
pub fn clamp_offset(
    natural: Natural,
    effective_scale: f64,
    viewport: u32,
    proposed: Offset,
) -> Offset {
    let v = viewport as f64;
    // Coverage guarantees scaled_dim >= V; .min(0.0) absorbs the float
    // slack when they are equal.
    let lo_x = (v - natural.width as f64 * effective_scale).min(0.0);
    let lo_y = (v - natural.height as f64 * effective_scale).min(0.0);
    Offset {
        x: proposed.x.clamp(lo_x, 0.0),
        y: proposed.y.clamp(lo_y, 0.0),
    }
}

/// Clamp a requested zoom factor to the supported range.
pub fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(ZOOM_MIN, ZOOM_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn nat(w: u32, h: u32) -> Natural {
        Natural {
            width: w,
            height: h,
        }
    }

    // =========================================================================
    // cover_scale tests
    // =========================================================================

    #[test]
    fn cover_scale_landscape_uses_height() {
        // 800x600 into 400: max(0.5, 0.6667) = 400/600
        let s = cover_scale(nat(800, 600), 400).unwrap();
        assert!((s - 400.0 / 600.0).abs() < EPS);
    }

    #[test]
    fn cover_scale_portrait_uses_width() {
        let s = cover_scale(nat(600, 800), 400).unwrap();
        assert!((s - 400.0 / 600.0).abs() < EPS);
    }

    #[test]
    fn cover_scale_square_is_exact() {
        let s = cover_scale(nat(200, 200), 400).unwrap();
        assert!((s - 2.0).abs() < EPS);
    }

    #[test]
    fn cover_scale_upscales_small_sources() {
        // Smaller than the viewport on both axes still covers
        let s = cover_scale(nat(100, 50), 400).unwrap();
        assert!((s - 8.0).abs() < EPS);
    }

    #[test]
    fn cover_scale_rejects_zero_width() {
        assert!(cover_scale(nat(0, 600), 400).is_err());
    }

    #[test]
    fn cover_scale_rejects_zero_height() {
        assert!(cover_scale(nat(800, 0), 400).is_err());
    }

    #[test]
    fn cover_scale_always_covers_viewport() {
        // Property 1: scaled dims >= V across a spread of shapes and zooms
        let shapes = [(800, 600), (600, 800), (400, 400), (3000, 500), (37, 4111)];
        for (w, h) in shapes {
            let base = cover_scale(nat(w, h), 400).unwrap();
            for zoom in [1.0, 1.5, 2.0, 3.0] {
                let s = base * clamp_zoom(zoom);
                assert!(s * w as f64 >= 400.0 - EPS, "{w}x{h} at zoom {zoom}");
                assert!(s * h as f64 >= 400.0 - EPS, "{w}x{h} at zoom {zoom}");
            }
        }
    }

    // =========================================================================
    // centered_offset tests
    // =========================================================================

    #[test]
    fn centered_offset_landscape() {
        // 800x600 at base scale 2/3: x = (400 - 533.33)/2, y = 0
        let s = cover_scale(nat(800, 600), 400).unwrap();
        let o = centered_offset(nat(800, 600), s, 400);
        assert!((o.x - (400.0 - 800.0 * s) / 2.0).abs() < EPS);
        assert!(o.y.abs() < EPS);
    }

    #[test]
    fn centered_offset_square_is_origin() {
        let o = centered_offset(nat(500, 500), 0.8, 400);
        assert!(o.x.abs() < EPS);
        assert!(o.y.abs() < EPS);
    }

    #[test]
    fn centered_offset_is_within_clamp_bounds() {
        let n = nat(1234, 777);
        let s = cover_scale(n, 400).unwrap();
        let o = centered_offset(n, s, 400);
        let clamped = clamp_offset(n, s, 400, o);
        assert!((o.x - clamped.x).abs() < EPS);
        assert!((o.y - clamped.y).abs() < EPS);
    }

    // =========================================================================
    // clamp_offset tests
    // =========================================================================

    #[test]
    fn clamp_rejects_positive_offsets() {
        // Positive offsets would show space above/left of the image
        let n = nat(800, 600);
        let s = cover_scale(n, 400).unwrap() * 2.0;
        let o = clamp_offset(n, s, 400, Offset { x: 50.0, y: 50.0 });
        assert_eq!(o, Offset { x: 0.0, y: 0.0 });
    }

    #[test]
    fn clamp_stops_at_far_edge() {
        // Dragged way past bottom-right: lands exactly on the bound
        let n = nat(800, 600);
        let s = cover_scale(n, 400).unwrap() * 2.0;
        let o = clamp_offset(
            n,
            s,
            400,
            Offset {
                x: -2000.0,
                y: -2000.0,
            },
        );
        assert!((o.x - (400.0 - 800.0 * s)).abs() < EPS);
        assert!((o.y - (400.0 - 600.0 * s)).abs() < EPS);
    }

    #[test]
    fn clamp_passes_through_valid_offsets() {
        let n = nat(800, 600);
        let s = 1.0;
        let proposed = Offset { x: -100.0, y: -50.0 };
        assert_eq!(clamp_offset(n, s, 400, proposed), proposed);
    }

    #[test]
    fn clamp_exact_fit_axis_pins_to_zero() {
        // 600x800 at base scale: width lands exactly on V, no pan room on x
        let n = nat(600, 800);
        let s = cover_scale(n, 400).unwrap();
        let o = clamp_offset(
            n,
            s,
            400,
            Offset {
                x: -30.0,
                y: -30.0,
            },
        );
        assert!(o.x.abs() < EPS);
        assert!((o.y - (-30.0)).abs() < EPS);
    }

    #[test]
    fn clamp_result_always_in_bounds() {
        // Property 2: clamped offsets stay in [V - dim*s, 0] for wild inputs
        let n = nat(1000, 250);
        let s = cover_scale(n, 400).unwrap() * 1.7;
        for (px, py) in [(1e6, -1e6), (-1e6, 1e6), (0.0, 0.0), (-3.5, -900.0)] {
            let o = clamp_offset(n, s, 400, Offset { x: px, y: py });
            assert!(o.x <= EPS && o.x >= 400.0 - 1000.0 * s - EPS);
            assert!(o.y <= EPS && o.y >= 400.0 - 250.0 * s - EPS);
        }
    }

    // =========================================================================
    // clamp_zoom tests
    // =========================================================================

    #[test]
    fn zoom_clamps_to_range() {
        assert_eq!(clamp_zoom(0.2), 1.0);
        assert_eq!(clamp_zoom(2.0), 2.0);
        assert_eq!(clamp_zoom(7.5), 3.0);
    }
}
