//! PDF renderer – takes a finished [`Canvas`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API).

use std::collections::{BTreeSet, HashMap};

use printpdf::*;

use crate::assets::{self, Artwork};
use crate::canvas::{Canvas, DrawOp};
use crate::config::TextEncoding;
use crate::error::{RenderError, Result};
use crate::fonts::{wrap_text, PT_PER_CM};

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

fn pt(cm: f64) -> Pt {
    Pt(cm as f32 * PT_PER_CM)
}

/// Render a canvas into PDF bytes.
///
/// A template that cannot be loaded aborts the render. Logos that cannot be
/// loaded are skipped with a `log::warn`.
pub fn render_pdf(canvas: &Canvas, title: &str, encoding: TextEncoding) -> Result<Vec<u8>> {
    let page_w = Mm(canvas.width_cm as f32 * 10.0);
    let page_h = Mm(canvas.height_cm as f32 * 10.0);
    let page_w_pt = pt(canvas.width_cm).0;
    let page_h_pt = pt(canvas.height_cm).0;

    let mut doc = PdfDocument::new(title);

    // ── Pre-register all images ────────────────────────────────────────────
    // Templates are bound once per page but embedded once per document.
    let mut templates: BTreeSet<&Artwork> = BTreeSet::new();
    let mut logos: BTreeSet<&str> = BTreeSet::new();
    for page in canvas.pages() {
        for op in &page.ops {
            match op {
                DrawOp::Template { artwork, .. } => {
                    templates.insert(artwork);
                }
                DrawOp::Image { source, .. } => {
                    logos.insert(source.as_str());
                }
                _ => {}
            }
        }
    }

    let mut artwork_resources: HashMap<Artwork, ImageResource> = HashMap::new();
    let mut image_resources: HashMap<String, ImageResource> = HashMap::new();
    let mut img_warnings: Vec<PdfWarnMsg> = Vec::new();

    for artwork in templates {
        let bytes = artwork.bytes()?;
        let res = register_image(&mut doc, &artwork.to_string(), &bytes, &mut img_warnings)?;
        artwork_resources.insert(artwork.clone(), res);
    }
    for src in &logos {
        let registered = assets::load_bytes(src)
            .and_then(|bytes| register_image(&mut doc, src, &bytes, &mut img_warnings));
        match registered {
            Ok(res) => {
                image_resources.insert(src.to_string(), res);
            }
            Err(e) => log::warn!("Skipping image: {e}"),
        }
    }
    let resources = Resources {
        artwork: &artwork_resources,
        images: &image_resources,
    };

    // ── Render pages ──────────────────────────────────────────────────────
    let mut pages = Vec::with_capacity(canvas.page_count());

    for page in canvas.pages() {
        let mut ops = Vec::new();
        for op in &page.ops {
            render_op(&mut ops, op, canvas, encoding, &resources, (page_w_pt, page_h_pt))?;
        }
        pages.push(PdfPage::new(page_w, page_h, ops));
    }

    doc.with_pages(pages);
    let bytes = doc.save(&PdfSaveOptions::default(), &mut Vec::new());

    Ok(bytes)
}

/// Embedded images of one document, keyed by where they came from.
struct Resources<'a> {
    artwork: &'a HashMap<Artwork, ImageResource>,
    images: &'a HashMap<String, ImageResource>,
}

fn register_image(
    doc: &mut PdfDocument,
    src: &str,
    bytes: &[u8],
    warnings: &mut Vec<PdfWarnMsg>,
) -> Result<ImageResource> {
    let dyn_img = assets::decode_bytes(src, bytes)?;
    let raw = RawImage::decode_from_bytes(bytes, warnings)
        .map_err(|e| RenderError::Image(format!("PDF encode error: {e}")))?;
    Ok(ImageResource {
        xobj_id: doc.add_image(&raw),
        px_width: dyn_img.width(),
        px_height: dyn_img.height(),
    })
}

fn black() -> Color {
    Color::Rgb(Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        icc_profile: None,
    })
}

fn write_text(ops: &mut Vec<Op>, x: Pt, y: Pt, text: &str, size: f32, bold: bool) {
    let font = if bold {
        BuiltinFont::HelveticaBold
    } else {
        BuiltinFont::Helvetica
    };
    ops.push(Op::StartTextSection);
    ops.push(Op::SetTextCursor {
        pos: Point { x, y },
    });
    ops.push(Op::SetFontSizeBuiltinFont {
        size: Pt(size),
        font,
    });
    ops.push(Op::SetFillColor { col: black() });
    ops.push(Op::WriteTextBuiltinFont {
        items: vec![TextItem::Text(text.to_string())],
        font,
    });
    ops.push(Op::EndTextSection);
}

fn fill_rect(ops: &mut Vec<Op>, x1: f32, y1: f32, x2: f32, y2: f32) {
    let corner = |x: f32, y: f32| LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    };
    ops.push(Op::DrawPolygon {
        polygon: Polygon {
            rings: vec![PolygonRing {
                points: vec![corner(x1, y1), corner(x2, y1), corner(x2, y2), corner(x1, y2)],
            }],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        },
    });
}

fn place_xobject(ops: &mut Vec<Op>, res: &ImageResource, x: Pt, y: Pt, scale_x: f32, scale_y: f32) {
    // At dpi=72 printpdf renders 1 px = 1 pt.
    ops.push(Op::UseXobject {
        id: res.xobj_id.clone(),
        transform: XObjectTransform {
            translate_x: Some(x),
            translate_y: Some(y),
            dpi: Some(72.0),
            scale_x: Some(scale_x),
            scale_y: Some(scale_y),
            rotate: None,
        },
    });
}

fn render_op(
    ops: &mut Vec<Op>,
    op: &DrawOp,
    canvas: &Canvas,
    encoding: TextEncoding,
    resources: &Resources<'_>,
    (page_w_pt, page_h_pt): (f32, f32),
) -> Result<()> {
    match op {
        DrawOp::Template { artwork, x, y, .. } => {
            let res = resources.artwork.get(artwork).ok_or_else(|| {
                RenderError::Image(format!("template {artwork} was not embedded"))
            })?;
            // Stretch the artwork over the whole page.
            let scale_x = page_w_pt / res.px_width.max(1) as f32;
            let scale_y = page_h_pt / res.px_height.max(1) as f32;
            place_xobject(ops, res, pt(*x), pt(*y), scale_x, scale_y);
        }
        DrawOp::Text { x, y, text, tag } => {
            let style = canvas.style(tag.as_deref())?;
            if !text.is_empty() {
                let encoded = encode_text(text, encoding);
                write_text(ops, pt(*x), pt(*y), &encoded, style.size, style.bold);
            }
        }
        DrawOp::TextArea {
            x,
            y,
            width,
            text,
            tag,
        } => {
            let style = canvas.style(tag.as_deref())?;
            let max_width = pt(*width).0;
            let baseline = pt(*y).0;
            for (i, line) in wrap_text(text, &style, max_width).iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let line_y = baseline - i as f32 * style.line_height();
                let encoded = encode_text(line, encoding);
                write_text(ops, pt(*x), Pt(line_y), &encoded, style.size, style.bold);
            }
        }
        DrawOp::Image { source, x, y, zoom } => {
            if let Some(res) = resources.images.get(source) {
                let scale = (*zoom / 100.0) as f32;
                place_xobject(ops, res, pt(*x), pt(*y), scale, scale);
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
            let module_w = pt(*width).0 / modules.len() as f32;
            let x0 = pt(*x).0;
            let y1 = pt(*y).0;
            let y2 = y1 + pt(*height).0;
            ops.push(Op::SetFillColor { col: black() });
            for (start, len) in bar_runs(modules) {
                let x1 = x0 + start as f32 * module_w;
                fill_rect(ops, x1, y1, x1 + len as f32 * module_w, y2);
            }
        }
    }
    Ok(())
}

/// Consecutive bar modules merged into `(start, length)` runs.
pub(crate) fn bar_runs(modules: &[bool]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, &bar) in modules.iter().enumerate() {
        match (bar, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i - s));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, modules.len() - s));
    }
    runs
}

/// Prepare a UTF-8 string for a builtin (WinAnsiEncoding) font.
fn encode_text(s: &str, encoding: TextEncoding) -> String {
    match encoding {
        TextEncoding::WinAnsi => to_winlatin(s),
        TextEncoding::Ascii => s.chars().map(fold_to_ascii).collect(),
    }
}

/// Map accented Latin letters to their base letter; anything else outside
/// ASCII becomes `?`.
fn fold_to_ascii(c: char) -> char {
    match c {
        c if c.is_ascii() => c,
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        '\u{00A0}' => ' ',
        _ => '?',
    }
}

/// Convert a UTF-8 string to raw Windows-1252 bytes then wrap in a String so
/// printpdf writes the bytes unchanged into the PDF stream (builtin fonts use
/// WinAnsiEncoding, so each glyph is one byte 0x00–0xFF).
fn to_winlatin(s: &str) -> String {
    let bytes: Vec<u8> = s
        .chars()
        .map(|c| match c {
            '\u{20AC}' => 0x80, // euro
            '\u{2026}' => 0x85, // ellipsis
            '\u{2018}' => 0x91, // left single quote
            '\u{2019}' => 0x92, // right single quote
            '\u{201C}' => 0x93, // left double quote
            '\u{201D}' => 0x94, // right double quote
            '\u{2022}' => 0x95, // bullet
            '\u{2013}' => 0x96, // en-dash
            '\u{2014}' => 0x97, // em-dash
            '\u{00A0}' => 0x20, // non-breaking space -> space
            c if (c as u32) < 256 => c as u8,
            _ => b'?',
        })
        .collect();
    // SAFETY: intentionally non-UTF-8 for bytes >= 0x80; printpdf passes
    // these bytes straight to the PDF stream, decoded by WinAnsiEncoding.
    #[allow(unsafe_code)]
    unsafe {
        String::from_utf8_unchecked(bytes)
    }
}
