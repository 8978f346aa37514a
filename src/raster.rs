//! Raster renderer – paints a [`Canvas`] into a bitmap and encodes it as PNG
//! or JPEG.
//!
//! Every page is painted at the requested resolution; a multi-page canvas is
//! stacked top to bottom into one tall image, wrapping into further columns
//! when the encoder caps the image size (JPEG: 65535 px per side). Text uses
//! the Spleen bitmap fonts scaled nearest-neighbour to the style's point size.

use std::collections::HashMap;
use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, RgbaImage};
use spleen_font::{PSF2Font, FONT_12X24, FONT_8X16};

use crate::assets::{self, Artwork};
use crate::canvas::{Canvas, DrawOp};
use crate::error::{RenderError, Result};
use crate::fonts::{wrap_text, TextStyle, PT_PER_CM};
use crate::format::Format;

/// Largest width or height the JPEG encoder accepts.
pub const JPEG_MAX_SIDE: u32 = 65_535;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);

/// Spleen face used for a glyph size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Face {
    /// 8×16 cells.
    Small,
    /// 12×24 cells.
    Large,
}

impl Face {
    fn cell(self) -> (usize, usize) {
        match self {
            Face::Small => (8, 16),
            Face::Large => (12, 24),
        }
    }

    /// Row-major on/off bitmap of `ch`, or `None` when the font lacks it.
    fn glyph(self, ch: char) -> Option<Vec<bool>> {
        let mut font = match self {
            Face::Small => PSF2Font::new(FONT_8X16).ok()?,
            Face::Large => PSF2Font::new(FONT_12X24).ok()?,
        };
        let (width, height) = self.cell();
        let mut utf8 = [0u8; 4];
        let glyph = font.glyph_for_utf8(ch.encode_utf8(&mut utf8).as_bytes())?;
        let mut bitmap = vec![false; width * height];
        for (row_y, row) in glyph.enumerate() {
            for (col_x, on) in row.enumerate() {
                if row_y < height && col_x < width {
                    bitmap[row_y * width + col_x] = on;
                }
            }
        }
        Some(bitmap)
    }
}

/// Per-export painting state shared across pages.
struct Painter<'a> {
    canvas: &'a Canvas,
    px_per_cm: f64,
    page_w: u32,
    page_h: u32,
    glyphs: HashMap<(Face, char), Option<Vec<bool>>>,
    templates: HashMap<Artwork, RgbaImage>,
    logos: HashMap<String, Option<RgbaImage>>,
}

impl<'a> Painter<'a> {
    fn new(canvas: &'a Canvas, dpi: u32) -> Self {
        let px_per_cm = dpi as f64 / 2.54;
        Self {
            canvas,
            px_per_cm,
            page_w: (canvas.width_cm * px_per_cm).round() as u32,
            page_h: (canvas.height_cm * px_per_cm).round() as u32,
            glyphs: HashMap::new(),
            templates: HashMap::new(),
            logos: HashMap::new(),
        }
    }

    fn px(&self, cm: f64) -> i64 {
        (cm * self.px_per_cm).round() as i64
    }

    /// Points to pixels.
    fn px_pt(&self, points: f32) -> f64 {
        points as f64 / PT_PER_CM as f64 * self.px_per_cm
    }

    /// Page-space y (cm, upward) to image row (downward).
    fn row(&self, y_cm: f64) -> i64 {
        self.page_h as i64 - self.px(y_cm)
    }

    fn paint_page(&mut self, ops: &[DrawOp]) -> Result<RgbImage> {
        let mut img = RgbImage::from_pixel(self.page_w, self.page_h, WHITE);
        for op in ops {
            self.paint_op(&mut img, op)?;
        }
        Ok(img)
    }

    fn paint_op(&mut self, img: &mut RgbImage, op: &DrawOp) -> Result<()> {
        match op {
            DrawOp::Template { artwork, x, y, .. } => {
                if !self.templates.contains_key(artwork) {
                    let pixels = artwork.decode()?.to_rgba8();
                    let fitted =
                        imageops::resize(&pixels, self.page_w, self.page_h, FilterType::Triangle);
                    self.templates.insert(artwork.clone(), fitted);
                }
                if let Some(fitted) = self.templates.get(artwork) {
                    let top = self.row(*y) - fitted.height() as i64;
                    overlay_rgba(img, fitted, self.px(*x), top);
                }
            }
            DrawOp::Text { x, y, text, tag } => {
                let style = self.canvas.style(tag.as_deref())?;
                let (px, row) = (self.px(*x), self.row(*y));
                self.draw_text(img, px, row, text, &style);
            }
            DrawOp::TextArea {
                x,
                y,
                width,
                text,
                tag,
            } => {
                let style = self.canvas.style(tag.as_deref())?;
                let max_width = *width as f32 * PT_PER_CM;
                let line_h = self.px_pt(style.line_height());
                let (px, row) = (self.px(*x), self.row(*y));
                for (i, line) in wrap_text(text, &style, max_width).iter().enumerate() {
                    let line_row = row + (i as f64 * line_h).round() as i64;
                    self.draw_text(img, px, line_row, line, &style);
                }
            }
            DrawOp::Image { source, x, y, zoom } => {
                if !self.logos.contains_key(source) {
                    let loaded = match assets::decode(source) {
                        Ok(logo) => Some(self.scale_logo(&logo, *zoom)),
                        Err(e) => {
                            log::warn!("Skipping image: {e}");
                            None
                        }
                    };
                    self.logos.insert(source.clone(), loaded);
                }
                if let Some(Some(logo)) = self.logos.get(source) {
                    let top = self.row(*y) - logo.height() as i64;
                    overlay_rgba(img, logo, self.px(*x), top);
                }
            }
            DrawOp::Barcode {
                x,
                y,
                width,
                height,
                modules,
                ..
            } => {
                if modules.is_empty() {
                    return Ok(());
                }
                let left = *x * self.px_per_cm;
                let module_w = *width * self.px_per_cm / modules.len() as f64;
                let bottom = self.row(*y);
                let top = self.row(*y + *height);
                for (i, bar) in modules.iter().enumerate() {
                    if !bar {
                        continue;
                    }
                    let x1 = (left + i as f64 * module_w).round() as i64;
                    let x2 = (left + (i + 1) as f64 * module_w).round() as i64;
                    fill_rect(img, x1, top, x2.max(x1 + 1), bottom);
                }
            }
        }
        Ok(())
    }

    /// Logo at its natural 72 dpi size times `zoom` percent.
    fn scale_logo(&self, logo: &DynamicImage, zoom: f64) -> RgbaImage {
        let factor = zoom / 100.0 * self.px_pt(1.0);
        let w = ((logo.width() as f64 * factor).round() as u32).max(1);
        let h = ((logo.height() as f64 * factor).round() as u32).max(1);
        imageops::resize(&logo.to_rgba8(), w, h, FilterType::Triangle)
    }

    /// Draw `text` with its baseline on `baseline_row`.
    fn draw_text(
        &mut self,
        img: &mut RgbImage,
        x: i64,
        baseline_row: i64,
        text: &str,
        style: &TextStyle,
    ) {
        let cell_h = self.px_pt(style.size).round().max(1.0) as i64;
        let cell_w = (cell_h / 2).max(1);
        let top = baseline_row - self.px_pt(style.ascender()).round() as i64;
        let face = if cell_h > 16 { Face::Large } else { Face::Small };
        let (font_w, font_h) = face.cell();

        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let bitmap = self
                .glyphs
                .entry((face, ch))
                .or_insert_with(|| face.glyph(ch));
            let Some(bitmap) = bitmap else {
                continue;
            };
            let origin_x = x + i as i64 * cell_w;
            for dy in 0..cell_h {
                let sy = (dy as usize * font_h) / cell_h as usize;
                for dx in 0..cell_w {
                    let sx = (dx as usize * font_w) / cell_w as usize;
                    if bitmap[sy * font_w + sx] {
                        put_ink(img, origin_x + dx, top + dy);
                        if style.bold {
                            put_ink(img, origin_x + dx + 1, top + dy);
                        }
                    }
                }
            }
        }
    }
}

fn put_ink(img: &mut RgbImage, x: i64, y: i64) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, INK);
    }
}

fn fill_rect(img: &mut RgbImage, x1: i64, y1: i64, x2: i64, y2: i64) {
    for y in y1..y2 {
        for x in x1..x2 {
            put_ink(img, x, y);
        }
    }
}

/// Alpha-blend `top` onto an opaque RGB page.
fn overlay_rgba(img: &mut RgbImage, top: &RgbaImage, x: i64, y: i64) {
    for (tx, ty, px) in top.enumerate_pixels() {
        let (dx, dy) = (x + tx as i64, y + ty as i64);
        if dx < 0 || dy < 0 || dx as u32 >= img.width() || dy as u32 >= img.height() {
            continue;
        }
        let alpha = px[3] as u32;
        if alpha == 0 {
            continue;
        }
        let dst = img.get_pixel_mut(dx as u32, dy as u32);
        for c in 0..3 {
            dst[c] = ((px[c] as u32 * alpha + dst[c] as u32 * (255 - alpha)) / 255) as u8;
        }
    }
}

/// Placement of pages on the output sheet: column-major, `rows` pages per
/// column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SheetLayout {
    rows: u32,
    columns: u32,
}

impl SheetLayout {
    fn plan(pages: u32, page_w: u32, page_h: u32, max_side: u32) -> Result<Self> {
        let rows_fit = max_side / page_h.max(1);
        let columns_fit = max_side / page_w.max(1);
        if pages == 0 || rows_fit == 0 || pages > rows_fit.saturating_mul(columns_fit) {
            return Err(RenderError::SheetTooLarge { pages, max_side });
        }
        let rows = pages.min(rows_fit);
        Ok(Self {
            rows,
            columns: pages.div_ceil(rows),
        })
    }

    /// Top-left pixel of page `index`.
    fn origin(self, index: u32, page_w: u32, page_h: u32) -> (i64, i64) {
        let column = index / self.rows;
        let row = index % self.rows;
        (column as i64 * page_w as i64, row as i64 * page_h as i64)
    }
}

/// Paint every page of `canvas` at `dpi` and encode as `format`.
pub fn render_raster(canvas: &Canvas, format: Format, dpi: u32) -> Result<Vec<u8>> {
    let (image_format, max_side) = match format {
        Format::Png => (ImageFormat::Png, u32::MAX),
        Format::Jpeg => (ImageFormat::Jpeg, JPEG_MAX_SIDE),
        other => {
            return Err(RenderError::Encode(format!("{other} is not a raster format")));
        }
    };
    if dpi == 0 {
        return Err(RenderError::InvalidResolution(dpi));
    }

    let mut painter = Painter::new(canvas, dpi);
    let (page_w, page_h) = (painter.page_w, painter.page_h);
    let page_count = u32::try_from(canvas.page_count()).unwrap_or(u32::MAX);
    let layout = SheetLayout::plan(page_count, page_w, page_h, max_side)?;
    if layout.columns > 1 {
        log::debug!(
            "{page_count} pages exceed {max_side} px; wrapping into {} columns of {}",
            layout.columns,
            layout.rows
        );
    }

    let mut sheet = RgbImage::from_pixel(page_w * layout.columns, page_h * layout.rows, WHITE);
    for (index, page) in canvas.pages().iter().enumerate() {
        let painted = painter.paint_page(&page.ops)?;
        let (x, y) = layout.origin(index as u32, page_w, page_h);
        imageops::replace(&mut sheet, &painted, x, y);
    }

    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(sheet)
        .write_to(&mut Cursor::new(&mut bytes), image_format)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::PIXEL_PNG_DATA_URI;

    fn decode(bytes: &[u8]) -> DynamicImage {
        image::load_from_memory(bytes).unwrap()
    }

    #[test]
    fn blank_page_dimensions_follow_dpi() {
        let bytes = render_raster(&Canvas::a4(), Format::Png, 72).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
        let img = decode(&bytes);
        // 21 cm and 29.7 cm at 72 dpi.
        assert_eq!((img.width(), img.height()), (595, 842));
    }

    #[test]
    fn pages_stack_vertically() {
        let mut canvas = Canvas::a4();
        canvas.next_page();
        canvas.next_page();
        let img = decode(&render_raster(&canvas, Format::Png, 36).unwrap());
        assert_eq!(img.height(), 3 * 421);
    }

    #[test]
    fn barcode_paints_ink() {
        let mut canvas = Canvas::a4();
        canvas.barcode("00", vec![true; 10], 0.7, 4.4, 10.3, 1.3);
        let img = decode(&render_raster(&canvas, Format::Png, 72).unwrap()).to_rgb8();
        // Middle of the symbol: x = 5 cm, y = 5 cm from the bottom.
        let x = (5.0 * 72.0 / 2.54) as u32;
        let y = img.height() - (5.0 * 72.0 / 2.54) as u32;
        assert_eq!(img.get_pixel(x, y), &INK);
    }

    #[test]
    fn text_paints_ink() {
        let mut canvas = Canvas::a4();
        canvas.move_to(1.0, 20.0);
        canvas.show("HHHH", Some("bold"));
        let img = decode(&render_raster(&canvas, Format::Png, 150).unwrap()).to_rgb8();
        assert!(img.pixels().any(|p| *p == INK));
    }

    #[test]
    fn jpeg_signature_and_logo() {
        let mut canvas = Canvas::a4();
        canvas.image(PIXEL_PNG_DATA_URI, 0.7, 26.1, 80.0);
        let bytes = render_raster(&canvas, Format::Jpeg, 72).unwrap();
        assert!(bytes.starts_with(&[0xFF, 0xD8, 0xFF]));
    }

    #[test]
    fn missing_template_aborts() {
        let mut canvas = Canvas::a4();
        canvas.define_template("t", Artwork::from("/nonexistent/t.png"), 0.3, 0.0);
        canvas.use_template("t").unwrap();
        assert!(matches!(
            render_raster(&canvas, Format::Png, 72),
            Err(RenderError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn sheet_stacks_until_encoder_limit() {
        // 40 A4 pages at 150 dpi: 37 fit under the JPEG limit, the rest wrap.
        let layout = SheetLayout::plan(40, 1240, 1754, JPEG_MAX_SIDE).unwrap();
        assert_eq!(layout, SheetLayout { rows: 37, columns: 2 });
        assert_eq!(layout.origin(36, 1240, 1754), (0, 36 * 1754));
        assert_eq!(layout.origin(37, 1240, 1754), (1240, 0));

        let png = SheetLayout::plan(40, 1240, 1754, u32::MAX).unwrap();
        assert_eq!(png, SheetLayout { rows: 40, columns: 1 });
    }

    #[test]
    fn sheet_too_large_names_limit() {
        let err = SheetLayout::plan(5000, 1240, 1754, JPEG_MAX_SIDE).unwrap_err();
        assert!(matches!(
            err,
            RenderError::SheetTooLarge { pages: 5000, max_side: JPEG_MAX_SIDE }
        ));
        assert!(err.to_string().contains("65535"));
    }

    #[test]
    fn rejects_vector_formats() {
        assert!(render_raster(&Canvas::a4(), Format::Pdf, 72).is_err());
    }
}
