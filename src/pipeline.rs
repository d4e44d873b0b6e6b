//! Crop pipeline: session → raster → encode → persist.
//!
//! [`crop_file`] runs the whole chain for one source image. [`batch`] walks
//! a directory, crops every decodable image in parallel with rayon, streams
//! progress events over an mpsc channel, and writes a `report.json`
//! manifest next to the outputs.
//!
//! The backend is injected so tests can run the pipeline against a mock
//! without touching pixels on disk.

use crate::backend::{BackendError, ImageBackend};
use crate::config::{ConfigError, CropConfig};
use crate::encode::{self, EncodeError};
use crate::geometry::{GeometryError, Natural};
use crate::raster;
use crate::rust_backend;
use crate::session::CropSession;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Source image not found: {0}")]
    SourceNotFound(PathBuf),
}

/// How a crop should be framed when there is no interactive drag:
/// a zoom factor plus a focus point in fractions of the pannable range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Framing {
    pub zoom: f64,
    pub focus: (f64, f64),
}

impl Default for Framing {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            focus: (0.5, 0.5),
        }
    }
}

/// Result of one completed crop, serialized into the batch report.
#[derive(Debug, Clone, Serialize)]
pub struct CropReport {
    pub source: String,
    pub output: String,
    /// Natural source dimensions (width, height).
    pub natural: (u32, u32),
    pub viewport: u32,
    pub mime_type: String,
    /// Quality the persisted bytes were encoded at.
    pub quality: f32,
    pub bytes: usize,
    /// False when even the quality floor overshot the budget.
    pub within_budget: bool,
}

/// Crop a single source image and persist the encoded result.
pub fn crop_file(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    framing: Framing,
    config: &CropConfig,
) -> Result<CropReport, PipelineError> {
    let background = config.background_rgb()?;

    let dims = backend.identify(source)?;
    let natural = Natural {
        width: dims.width,
        height: dims.height,
    };

    let mut session = CropSession::new(natural, config.viewport)?;
    session.set_zoom(framing.zoom);
    session.set_focus(framing.focus.0, framing.focus.1);
    let state = session.commit();

    let image = backend.load(source)?;
    let canvas = raster::render(&image, &state, config.viewport, background);
    let encoded =
        encode::encode_with_budget(&canvas, config.encoder.max_bytes, config.encoder.ladder())?;

    backend.save(output, &encoded.bytes)?;

    Ok(CropReport {
        source: source.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        natural: (natural.width, natural.height),
        viewport: config.viewport,
        mime_type: encoded.mime_type.to_string(),
        quality: encoded.quality,
        bytes: encoded.bytes.len(),
        within_budget: encoded.bytes.len() <= config.encoder.max_bytes,
    })
}

/// Progress events streamed by [`batch`].
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started { source: PathBuf },
    Finished(CropReport),
    Failed { source: PathBuf, message: String },
}

/// One source that could not be cropped. Batch keeps going past these.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub source: String,
    pub message: String,
}

/// Serialized to `report.json` in the output directory.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub crops: Vec<CropReport>,
    pub failures: Vec<BatchFailure>,
}

/// Crop every decodable image under `input_dir` into `output_dir`.
///
/// Outputs are named `{stem}-cover.jpg` and mirror the input directory
/// structure, so same-stem sources in different subdirectories never fight
/// over one file. Sources are discovered with a sorted walk so the report
/// order is stable, then processed in parallel. Individual failures are
/// collected, not fatal.
pub fn batch(
    backend: &impl ImageBackend,
    input_dir: &Path,
    output_dir: &Path,
    framing: Framing,
    config: &CropConfig,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchReport, PipelineError> {
    if !input_dir.is_dir() {
        return Err(PipelineError::SourceNotFound(input_dir.to_path_buf()));
    }
    std::fs::create_dir_all(output_dir)?;

    let sources = collect_sources(input_dir);
    let outputs = plan_outputs(input_dir, output_dir, &sources);

    let results: Vec<Result<CropReport, BatchFailure>> = sources
        .par_iter()
        .zip(outputs.par_iter())
        .map_with(events, |tx, (source, output)| {
            if let Some(tx) = tx {
                tx.send(BatchEvent::Started {
                    source: source.clone(),
                })
                .ok();
            }
            let result = crop_file(backend, source, output, framing, config);
            match result {
                Ok(report) => {
                    if let Some(tx) = tx {
                        tx.send(BatchEvent::Finished(report.clone())).ok();
                    }
                    Ok(report)
                }
                Err(e) => {
                    let failure = BatchFailure {
                        source: source.to_string_lossy().to_string(),
                        message: e.to_string(),
                    };
                    if let Some(tx) = tx {
                        tx.send(BatchEvent::Failed {
                            source: source.clone(),
                            message: failure.message.clone(),
                        })
                        .ok();
                    }
                    Err(failure)
                }
            }
        })
        .collect();

    let mut report = BatchReport {
        crops: Vec::new(),
        failures: Vec::new(),
    };
    for result in results {
        match result {
            Ok(crop) => report.crops.push(crop),
            Err(failure) => report.failures.push(failure),
        }
    }

    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(output_dir.join("report.json"), json)?;

    Ok(report)
}

/// Walk the input directory for decodable sources, in path order.
fn collect_sources(input_dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(input_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| rust_backend::is_supported_source(path))
        .collect()
}

/// Map each source to its output path: `photo.png` → `photo-cover.jpg`,
/// with the path relative to `input_dir` mirrored under `output_dir`.
///
/// Sources that still land on the same path (same stem in the same
/// directory, different extension) get a numeric suffix in walk order, so
/// no two report entries can point at one file.
fn plan_outputs(input_dir: &Path, output_dir: &Path, sources: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen: HashMap<PathBuf, usize> = HashMap::new();
    sources
        .iter()
        .map(|source| {
            let rel = source.strip_prefix(input_dir).unwrap_or(source);
            let dir = match rel.parent() {
                Some(parent) => output_dir.join(parent),
                None => output_dir.to_path_buf(),
            };
            let stem = rel
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "cover".to_string());
            let first = dir.join(format!("{stem}-cover.jpg"));
            let n = seen.entry(first.clone()).or_insert(0);
            *n += 1;
            if *n == 1 {
                first
            } else {
                dir.join(format!("{stem}-cover-{n}.jpg"))
            }
        })
        .collect()
}
