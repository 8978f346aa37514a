//! Render configuration – the defaults a render call falls back to when the
//! caller leaves the format or resolution unspecified.
//!
//! There is no process-wide state: a [`RenderConfig`] value is built once
//! (usually with [`RenderConfig::from_env`] at startup) and handed to the
//! composer, which substitutes its defaults into each [`RenderOptions`].

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::assets::Artwork;
use crate::error::{RenderError, Result};
use crate::format::Format;

/// Default raster resolution in dpi.
pub const DEFAULT_RESOLUTION: u32 = 150;

/// How text is written with the builtin (non-embedded) PDF fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    /// Windows-1252, the builtin fonts' native encoding. Accents survive.
    #[default]
    WinAnsi,
    /// 7-bit ASCII; accented Latin letters are folded to their base letter.
    Ascii,
}

impl FromStr for TextEncoding {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "winansi" | "windows-1252" | "cp1252" | "latin1" => Ok(TextEncoding::WinAnsi),
            "ascii" | "ascii-8bit" | "us-ascii" => Ok(TextEncoding::Ascii),
            other => Err(RenderError::UnknownEncoding(other.to_string())),
        }
    }
}

/// Defaults for every render call made through a composer.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Document title embedded in PDF metadata.
    pub title: String,
    /// Format used when a call does not request one.
    pub format: Format,
    /// Resolution (dpi) used when a call does not request one.
    pub resolution: u32,
    pub encoding: TextEncoding,
    /// Background artwork bound under every slip.
    pub template: Artwork,
    /// Replacement for the template's three header notice lines.
    pub notices: Option<[String; 3]>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: "boleto".to_string(),
            format: Format::Pdf,
            resolution: DEFAULT_RESOLUTION,
            encoding: TextEncoding::WinAnsi,
            template: Artwork::Bundled,
            notices: None,
        }
    }
}

impl RenderConfig {
    /// Build a config from `BOLETO_FORMAT`, `BOLETO_RESOLUTION`,
    /// `BOLETO_ENCODING` and `BOLETO_TEMPLATE`, falling back to the defaults
    /// for unset variables. Set-but-invalid values are errors.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(format) = env::var("BOLETO_FORMAT") {
            config.format = format.parse()?;
        }
        if let Ok(resolution) = env::var("BOLETO_RESOLUTION") {
            config.resolution = parse_resolution(&resolution)?;
        }
        if let Ok(encoding) = env::var("BOLETO_ENCODING") {
            config.encoding = encoding.parse()?;
        }
        if let Ok(template) = env::var("BOLETO_TEMPLATE") {
            config.template = Artwork::File(PathBuf::from(template));
        }

        log::debug!(
            "render config: format={:?} resolution={} encoding={:?} template={}",
            config.format,
            config.resolution,
            config.encoding,
            config.template
        );
        Ok(config)
    }

    /// Use the artwork file at `path` instead of the bundled one.
    pub fn with_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.template = Artwork::File(path.into());
        self
    }
}

/// Per-call overrides. `None` means "use the configured default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub format: Option<String>,
    pub resolution: Option<u32>,
}

impl RenderOptions {
    /// Request a specific output format by identifier.
    pub fn format(identifier: impl Into<String>) -> Self {
        Self {
            format: Some(identifier.into()),
            resolution: None,
        }
    }

    pub fn with_resolution(mut self, dpi: u32) -> Self {
        self.resolution = Some(dpi);
        self
    }
}

fn parse_resolution(raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(dpi) if dpi > 0 => Ok(dpi),
        Ok(dpi) => Err(RenderError::InvalidResolution(dpi)),
        Err(_) => Err(RenderError::InvalidResolution(0)),
    }
}
