//! Error type shared by every stage of the slip pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort a render.
///
/// A render either returns the complete byte stream or one of these; no
/// partially exported output ever reaches the caller.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template asset not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("batch contains no slips")]
    EmptyBatch,

    #[error("unsupported output format: {0:?}")]
    UnsupportedFormat(String),

    #[error("invalid resolution: {0} dpi")]
    InvalidResolution(u32),

    #[error("unknown text encoding: {0:?}")]
    UnknownEncoding(String),

    #[error("barcode encoding failed: {0}")]
    Barcode(String),

    #[error("image processing failed: {0}")]
    Image(String),

    #[error("style tag not registered: {0:?}")]
    UnknownStyle(String),

    #[error("{pages} pages do not fit on one raster sheet of at most {max_side} px per side")]
    SheetTooLarge { pages: u32, max_side: u32 },

    #[error("export failed: {0}")]
    Encode(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;
