//! # Covercrop
//!
//! Fixed-frame cover image cropper with a size-capped JPEG output, built for
//! digital-goods storefronts (sample pack covers, preset art, plugin tiles)
//! where every cover is a square of a known side length and a known maximum
//! byte size.
//!
//! # Architecture: Session → Raster → Encode
//!
//! A crop runs through three stages over one source image:
//!
//! ```text
//! 1. Session   natural dims  →  CropState     (pan/zoom, clamped geometry)
//! 2. Raster    CropState     →  V×V canvas    (exact state, WYSIWYG)
//! 3. Encode    canvas        →  capped JPEG   (quality ladder, hard floor)
//! ```
//!
//! The geometry is the contract: after every state transition the scaled
//! image fully covers the viewport and the offset stays within the pannable
//! range. [`geometry::clamp_offset`] is the single authority for this —
//! drags, zoom changes, and focus framing all route through it.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`geometry`] | Pure cover-scale / clamp math — the invariant authority |
//! | [`session`] | Per-image crop session: drag controller, zoom, commit |
//! | [`raster`] | Rasterizes a committed session onto the output canvas |
//! | [`encode`] | Budget-capped iterative JPEG encoding |
//! | [`backend`] | [`backend::ImageBackend`] trait — the pixel I/O seam |
//! | [`rust_backend`] | Production backend on the `image` crate |
//! | [`pipeline`] | Single-file crop and rayon-parallel batch mode |
//! | [`config`] | `crop.toml` loading, validation, stock config |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Recompute, Never Accumulate
//!
//! Drag offsets are always recomputed from the drag anchor, not summed from
//! per-event deltas. Pointer events arrive at arbitrary frequency; summing
//! floats across hundreds of move events drifts, recomputing does not.
//!
//! ## Graceful Degradation Over Hard Failure
//!
//! An encoder budget that cannot be met is not an error. The smallest
//! attempt at the quality floor is returned and flagged in the report —
//! a slightly oversized cover beats a failed upload.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding and encoding use the `image` crate's pure-Rust codecs. No
//! system libraries, no version conflicts; the binary is self-contained.

pub mod backend;
pub mod config;
pub mod encode;
pub mod geometry;
pub mod output;
pub mod pipeline;
pub mod raster;
pub mod rust_backend;
pub mod session;
