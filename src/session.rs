//! Crop session state: pan, zoom, and the drag controller.
//!
//! A [`CropSession`] owns all mutable state for one source image and is the
//! only writer of that state. The lifecycle is:
//!
//! ```text
//! new()  →  interact (drag/zoom, any number of cycles)  →  commit() | drop
//! ```
//!
//! Starting over with a different source means building a new session —
//! never mutating an old one in place — so a stale base scale can never be
//! applied to the wrong dimensions.
//!
//! The interaction API never fails and never panics: dragging without a
//! prior [`begin_drag`](CropSession::begin_drag) is a no-op, and
//! [`end_drag`](CropSession::end_drag) is idempotent, because UI event
//! ordering cannot be guaranteed by this layer.

use crate::geometry::{self, GeometryError, Natural, Offset, Point};

/// Immutable snapshot of the pan/zoom state, as consumed by the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropState {
    /// Minimum scale at which the image covers the viewport.
    pub base_scale: f64,
    /// User zoom multiplier, always within `[ZOOM_MIN, ZOOM_MAX]`.
    pub zoom: f64,
    /// Clamped top-left translation of the scaled image.
    pub offset: Offset,
}

impl CropState {
    /// The scale actually applied to the source: `base_scale * zoom`.
    pub fn effective_scale(&self) -> f64 {
        self.base_scale * self.zoom
    }
}

/// One interactive crop session over a single source image.
#[derive(Debug, Clone)]
pub struct CropSession {
    natural: Natural,
    viewport: u32,
    state: CropState,
    /// Pointer-space anchor, present only while a drag is active.
    drag_anchor: Option<Point>,
}

impl CropSession {
    /// Start a session: compute the cover scale and center the crop.
    ///
    /// Fails only on non-positive source dimensions, the single hard
    /// precondition of the pipeline.
    pub fn new(natural: Natural, viewport: u32) -> Result<Self, GeometryError> {
        let base_scale = geometry::cover_scale(natural, viewport)?;
        let offset = geometry::centered_offset(natural, base_scale, viewport);
        Ok(Self {
            natural,
            viewport,
            state: CropState {
                base_scale,
                zoom: 1.0,
                offset,
            },
            drag_anchor: None,
        })
    }

    pub fn state(&self) -> CropState {
        self.state
    }

    pub fn natural(&self) -> Natural {
        self.natural
    }

    pub fn viewport(&self) -> u32 {
        self.viewport
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// Record the drag anchor for the current pointer position.
    ///
    /// The anchor is `pointer - offset`, so every later
    /// [`update_drag`](Self::update_drag) can recompute the offset from
    /// scratch instead of summing deltas.
    pub fn begin_drag(&mut self, pointer: Point) {
        self.drag_anchor = Some(Point {
            x: pointer.x - self.state.offset.x,
            y: pointer.y - self.state.offset.y,
        });
    }

    /// Move the crop window to follow the pointer.
    ///
    /// No-op when not dragging (returns the unchanged offset). The offset is
    /// recomputed from the anchor on every call — never accumulated — so
    /// replaying any pointer path and jumping straight to its last position
    /// produce identical results.
    pub fn update_drag(&mut self, pointer: Point) -> Offset {
        let Some(anchor) = self.drag_anchor else {
            return self.state.offset;
        };
        let proposed = Offset {
            x: pointer.x - anchor.x,
            y: pointer.y - anchor.y,
        };
        self.state.offset = geometry::clamp_offset(
            self.natural,
            self.state.effective_scale(),
            self.viewport,
            proposed,
        );
        self.state.offset
    }

    /// Finish the drag. Idempotent.
    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    /// Apply a new zoom factor, clamped to the supported range.
    ///
    /// The existing offset is re-clamped against the new scale: zooming out
    /// shrinks the pannable range and must not leave the crop window past
    /// the image edge. This is the one offset mutation without a drag.
    pub fn set_zoom(&mut self, zoom: f64) -> CropState {
        self.state.zoom = geometry::clamp_zoom(zoom);
        self.state.offset = geometry::clamp_offset(
            self.natural,
            self.state.effective_scale(),
            self.viewport,
            self.state.offset,
        );
        self.state
    }

    /// Pan to a focus point expressed as fractions of the pannable range.
    ///
    /// `(0, 0)` shows the top-left of the image, `(1, 1)` the bottom-right,
    /// `(0.5, 0.5)` the center. Inputs are clamped to `[0, 1]` and the
    /// result goes through the same clamp as a drag would. This is how a
    /// non-interactive caller (the CLI) frames a crop.
    pub fn set_focus(&mut self, fx: f64, fy: f64) -> Offset {
        let s = self.state.effective_scale();
        let v = self.viewport as f64;
        let lo_x = (v - self.natural.width as f64 * s).min(0.0);
        let lo_y = (v - self.natural.height as f64 * s).min(0.0);
        let proposed = Offset {
            x: lo_x * fx.clamp(0.0, 1.0),
            y: lo_y * fy.clamp(0.0, 1.0),
        };
        self.state.offset =
            geometry::clamp_offset(self.natural, s, self.viewport, proposed);
        self.state.offset
    }

    /// Commit the session, consuming it and yielding the final state for
    /// rasterization. Cancelling is simply dropping the session.
    pub fn commit(self) -> CropState {
        self.state
    }
}
