//! Image sources – file paths, base64 `data:` URIs, and the template
//! artwork compiled into the library.

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};
use image::DynamicImage;
use serde::Serialize;

use crate::error::{RenderError, Result};

/// Generic slip artwork shipped inside the library.
pub const BUNDLED_TEMPLATE: &[u8] = include_bytes!("../assets/templates/modelo_generico.png");

/// Where template artwork is read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Artwork {
    /// [`BUNDLED_TEMPLATE`].
    #[default]
    Bundled,
    File(PathBuf),
}

impl Artwork {
    /// Fails with [`RenderError::TemplateNotFound`] when a file source is missing.
    pub fn ensure_available(&self) -> Result<()> {
        match self {
            Artwork::Bundled => Ok(()),
            Artwork::File(path) if path.is_file() => Ok(()),
            Artwork::File(path) => Err(RenderError::TemplateNotFound(path.clone())),
        }
    }

    /// Raw encoded artwork.
    pub fn bytes(&self) -> Result<Cow<'static, [u8]>> {
        self.ensure_available()?;
        match self {
            Artwork::Bundled => Ok(Cow::Borrowed(BUNDLED_TEMPLATE)),
            Artwork::File(path) => Ok(Cow::Owned(fs::read(path)?)),
        }
    }

    pub fn decode(&self) -> Result<DynamicImage> {
        let bytes = self.bytes()?;
        decode_bytes(&self.to_string(), &bytes)
    }
}

impl fmt::Display for Artwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Artwork::Bundled => f.write_str("bundled"),
            Artwork::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl From<PathBuf> for Artwork {
    fn from(path: PathBuf) -> Self {
        Artwork::File(path)
    }
}

impl From<&Path> for Artwork {
    fn from(path: &Path) -> Self {
        Artwork::File(path.to_path_buf())
    }
}

impl From<&str> for Artwork {
    fn from(path: &str) -> Self {
        Artwork::File(PathBuf::from(path))
    }
}

/// Shorten a source for log and error messages; data URIs can be huge.
pub fn preview(src: &str) -> &str {
    match src.char_indices().nth(80) {
        Some((idx, _)) => &src[..idx],
        None => src,
    }
}

/// Read the raw encoded bytes behind an image source.
pub fn load_bytes(src: &str) -> Result<Vec<u8>> {
    if src.starts_with("data:") {
        return parse_data_uri(src);
    }
    fs::read(Path::new(src))
        .map_err(|e| RenderError::Image(format!("cannot read {:?}: {e}", preview(src))))
}

/// Decode an image source into pixels.
pub fn decode(src: &str) -> Result<DynamicImage> {
    let bytes = load_bytes(src)?;
    decode_bytes(src, &bytes)
}

pub fn decode_bytes(src: &str, bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes)
        .map_err(|e| RenderError::Image(format!("cannot decode {:?}: {e}", preview(src))))
}

/// Parse a `data:<mime>;base64,<data>` URI and return the raw decoded bytes.
fn parse_data_uri(src: &str) -> Result<Vec<u8>> {
    let rest = &src["data:".len()..];
    let comma_pos = rest.find(',').ok_or_else(|| {
        RenderError::Image("invalid data URI: missing `,` separator".to_string())
    })?;
    let header = &rest[..comma_pos];
    if !header.contains(";base64") {
        return Err(RenderError::Image(
            "only base64-encoded data URIs are supported".to_string(),
        ));
    }
    let b64_data = rest[comma_pos + 1..].trim();
    BASE64_STD
        .decode(b64_data)
        .map_err(|e| RenderError::Image(format!("base64 decode error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::PIXEL_PNG_DATA_URI;

    #[test]
    fn decodes_data_uri() {
        let img = decode(PIXEL_PNG_DATA_URI).unwrap();
        assert_eq!((img.width(), img.height()), (1, 1));
    }

    #[test]
    fn rejects_non_base64_uri() {
        assert!(load_bytes("data:image/png,abcd").is_err());
        assert!(load_bytes("data:image/png;base64").is_err());
    }

    #[test]
    fn bundled_artwork_decodes() {
        let img = Artwork::Bundled.decode().unwrap();
        assert!(img.height() > img.width());
        assert_eq!(Artwork::Bundled.to_string(), "bundled");
    }

    #[test]
    fn missing_artwork_file_is_template_error() {
        let artwork = Artwork::from("/nonexistent/modelo.png");
        assert!(matches!(
            artwork.bytes(),
            Err(RenderError::TemplateNotFound(p)) if p.ends_with("modelo.png")
        ));
    }

    #[test]
    fn missing_file_is_image_error() {
        assert!(matches!(
            load_bytes("/nonexistent/logo.png"),
            Err(RenderError::Image(_))
        ));
    }

    #[test]
    fn preview_truncates() {
        let long = "x".repeat(200);
        assert_eq!(preview(&long).len(), 80);
        assert_eq!(preview("short"), "short");
    }
}
