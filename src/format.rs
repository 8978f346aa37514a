//! Format resolution – turns a requested output identifier into an export.
//!
//! Supported formats form a closed set. An identifier outside it is reported
//! as [`RenderError::UnsupportedFormat`] before the backend is touched.

use std::fmt;
use std::str::FromStr;

use crate::canvas::Canvas;
use crate::config::{RenderConfig, RenderOptions};
use crate::error::{RenderError, Result};
use crate::{raster, render};

/// Output formats the exporter can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Vector PDF.
    Pdf,
    Png,
    Jpeg,
    /// JSON dump of the canvas display list.
    Layout,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Pdf, Format::Png, Format::Jpeg, Format::Layout];

    /// Canonical identifier, also used as file extension.
    pub fn identifier(self) -> &'static str {
        match self {
            Format::Pdf => "pdf",
            Format::Png => "png",
            Format::Jpeg => "jpg",
            Format::Layout => "json",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Format::Pdf => "application/pdf",
            Format::Png => "image/png",
            Format::Jpeg => "image/jpeg",
            Format::Layout => "application/json",
        }
    }

    /// Leading bytes every stream of this format starts with.
    pub fn signature(self) -> &'static [u8] {
        match self {
            Format::Pdf => b"%PDF-",
            Format::Png => b"\x89PNG",
            Format::Jpeg => &[0xFF, 0xD8, 0xFF],
            Format::Layout => b"{",
        }
    }

    /// Whether the resolution affects the output.
    pub fn is_raster(self) -> bool {
        matches!(self, Format::Png | Format::Jpeg)
    }
}

impl FromStr for Format {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        let id = s.trim().trim_start_matches('.').to_ascii_lowercase();
        match id.as_str() {
            "pdf" => Ok(Format::Pdf),
            "png" => Ok(Format::Png),
            "jpg" | "jpeg" => Ok(Format::Jpeg),
            "json" | "layout" => Ok(Format::Layout),
            _ => Err(RenderError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// A fully resolved export call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportRequest {
    pub format: Format,
    /// Dots per inch; only raster formats use it.
    pub resolution: u32,
}

/// Substitute configured defaults for whatever `options` leaves unset, and
/// validate the result.
pub fn resolve(options: &RenderOptions, config: &RenderConfig) -> Result<ExportRequest> {
    let format = match options.format.as_deref() {
        Some(id) => id.parse()?,
        None => config.format,
    };
    let resolution = options.resolution.unwrap_or(config.resolution);
    if resolution == 0 {
        return Err(RenderError::InvalidResolution(resolution));
    }
    Ok(ExportRequest { format, resolution })
}

/// Materialise a finished canvas into a single byte stream.
pub fn export(canvas: &Canvas, request: ExportRequest, config: &RenderConfig) -> Result<Vec<u8>> {
    let bytes = match request.format {
        Format::Pdf => render::render_pdf(canvas, &config.title, config.encoding)?,
        Format::Png | Format::Jpeg => {
            raster::render_raster(canvas, request.format, request.resolution)?
        }
        Format::Layout => canvas.to_json()?.into_bytes(),
    };

    log::info!(
        "exported {} page(s) as {} at {} dpi ({} bytes)",
        canvas.page_count(),
        request.format,
        request.resolution,
        bytes.len()
    );
    Ok(bytes)
}
