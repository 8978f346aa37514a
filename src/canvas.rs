//! Canvas – the in-memory page builder every slip is drawn onto.
//!
//! Drawing calls append [`DrawOp`]s to the current page; nothing is
//! materialised until the finished canvas is handed to an exporter in
//! [`crate::format`]. Coordinates are centimetres from the bottom-left corner
//! of the page with y growing upward, so a slip layout reads exactly like the
//! physical form measured with a ruler.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use serde::Serialize;

use crate::assets::Artwork;
use crate::error::{RenderError, Result};
use crate::fonts::TextStyle;

/// Style used by `show` when no tag is given.
pub const TAG_DEFAULT: &str = "default";
/// Bold variant of the default style, always registered.
pub const TAG_BOLD: &str = "bold";

/// Physical page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PaperSize {
    /// 210 × 297 mm.
    #[default]
    A4,
}

impl PaperSize {
    /// (width, height) in centimetres.
    pub fn dimensions_cm(self) -> (f64, f64) {
        match self {
            PaperSize::A4 => (21.0, 29.7),
        }
    }
}

/// One drawing instruction, positioned in centimetres.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    /// Background artwork covering the page, shifted by (x, y).
    Template {
        name: String,
        artwork: Artwork,
        x: f64,
        y: f64,
    },
    /// A single line of text with its baseline at (x, y).
    Text {
        x: f64,
        y: f64,
        text: String,
        tag: Option<String>,
    },
    /// Word-wrapped block; the first baseline is at (x, y).
    TextArea {
        x: f64,
        y: f64,
        width: f64,
        text: String,
        tag: Option<String>,
    },
    /// Image with its bottom-left corner at (x, y), scaled by `zoom` percent
    /// of its natural size at 72 dpi.
    Image {
        source: String,
        x: f64,
        y: f64,
        zoom: f64,
    },
    /// Linear barcode occupying the rectangle with bottom-left (x, y).
    Barcode {
        payload: String,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        /// Module pattern, `true` = bar.
        #[serde(skip)]
        modules: Vec<bool>,
    },
}

/// Ordered drawing instructions of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

#[derive(Debug, Clone)]
struct TemplateDef {
    artwork: Artwork,
    x: f64,
    y: f64,
}

/// A paged document under construction.
#[derive(Debug, Clone, Serialize)]
pub struct Canvas {
    pub paper: PaperSize,
    pub width_cm: f64,
    pub height_cm: f64,
    tags: BTreeMap<String, TextStyle>,
    pages: Vec<Page>,
    #[serde(skip)]
    templates: HashMap<String, TemplateDef>,
    #[serde(skip)]
    cursor: (f64, f64),
}

impl Canvas {
    /// Create a canvas with one empty page and the builtin style tags.
    pub fn new(paper: PaperSize) -> Self {
        let (width_cm, height_cm) = paper.dimensions_cm();
        let mut tags = BTreeMap::new();
        tags.insert(TAG_DEFAULT.to_string(), TextStyle::regular(8.0));
        tags.insert(TAG_BOLD.to_string(), TextStyle::bold(8.0));

        Self {
            paper,
            width_cm,
            height_cm,
            tags,
            pages: vec![Page::default()],
            templates: HashMap::new(),
            cursor: (0.0, 0.0),
        }
    }

    pub fn a4() -> Self {
        Self::new(PaperSize::A4)
    }

    /// Register background artwork under `name`, to be drawn at offset (x, y).
    pub fn define_template(&mut self, name: &str, artwork: Artwork, x: f64, y: f64) {
        self.templates.insert(name.to_string(), TemplateDef { artwork, x, y });
    }

    /// Bind a defined template as the current page's base layer.
    pub fn use_template(&mut self, name: &str) -> Result<()> {
        let def = self
            .templates
            .get(name)
            .ok_or_else(|| RenderError::TemplateNotFound(PathBuf::from(name)))?;
        let op = DrawOp::Template {
            name: name.to_string(),
            artwork: def.artwork.clone(),
            x: def.x,
            y: def.y,
        };
        self.push(op);
        Ok(())
    }

    /// Register (or replace) a named text style.
    pub fn define_tag(&mut self, name: &str, style: TextStyle) {
        self.tags.insert(name.to_string(), style);
    }

    /// Resolve a tag to its style; `None` is the default style.
    pub fn style(&self, tag: Option<&str>) -> Result<TextStyle> {
        let name = tag.unwrap_or(TAG_DEFAULT);
        self.tags
            .get(name)
            .copied()
            .ok_or_else(|| RenderError::UnknownStyle(name.to_string()))
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.cursor = (x, y);
    }

    /// Draw one line of text at the cursor.
    pub fn show(&mut self, text: impl Into<String>, tag: Option<&str>) {
        let (x, y) = self.cursor;
        self.push(DrawOp::Text {
            x,
            y,
            text: text.into(),
            tag: tag.map(str::to_string),
        });
    }

    /// Draw a word-wrapped block `width` centimetres wide.
    pub fn text_area(&mut self, text: impl Into<String>, width: f64, x: f64, y: f64) {
        self.push(DrawOp::TextArea {
            x,
            y,
            width,
            text: text.into(),
            tag: None,
        });
    }

    pub fn image(&mut self, source: impl Into<String>, x: f64, y: f64, zoom: f64) {
        self.push(DrawOp::Image {
            source: source.into(),
            x,
            y,
            zoom,
        });
    }

    /// Draw an already encoded linear symbol.
    pub fn barcode(
        &mut self,
        payload: impl Into<String>,
        modules: Vec<bool>,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) {
        self.push(DrawOp::Barcode {
            payload: payload.into(),
            x,
            y,
            width,
            height,
            modules,
        });
    }

    /// Start a new page; subsequent drawing lands on it.
    pub fn next_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor = (0.0, 0.0);
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of explicit page breaks inserted so far.
    pub fn page_breaks(&self) -> usize {
        self.pages.len() - 1
    }

    /// Serialise the display list (pages, ops, tags) as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn push(&mut self, op: DrawOp) {
        // `pages` is never empty: `new` seeds one page and nothing removes them.
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }
}
