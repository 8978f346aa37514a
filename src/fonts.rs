//! Text styles and builtin-font metrics.
//!
//! Slips are drawn with the PDF base-14 Helvetica faces, which are never
//! embedded, so metrics come from an average-advance heuristic rather than a
//! parsed font file. The same numbers drive text-area wrapping and raster
//! glyph sizing, which keeps the vector and raster outputs in step.

use serde::{Deserialize, Serialize};

/// Points per centimetre.
pub const PT_PER_CM: f32 = 72.0 / 2.54;

/// A named text style registered on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in points.
    pub size: f32,
    pub bold: bool,
}

impl TextStyle {
    pub const fn regular(size: f32) -> Self {
        Self { size, bold: false }
    }

    pub const fn bold(size: f32) -> Self {
        Self { size, bold: true }
    }

    /// Distance between consecutive baselines in a text area.
    pub fn line_height(&self) -> f32 {
        self.size * 1.2
    }

    /// Height of the ascender above the baseline.
    pub fn ascender(&self) -> f32 {
        self.size * 0.75
    }
}

/// Estimated advance width of `text` in points.
///
/// Average Helvetica glyph ≈ 0.5 × size; bold is ~10 % wider.
pub fn measure_text_width(text: &str, style: &TextStyle) -> f32 {
    let avg = if style.bold { 0.55 } else { 0.5 };
    text.chars().count() as f32 * style.size * avg
}

/// Word-wrap text to fit within `max_width` points. Returns a vec of lines.
pub fn wrap_text(text: &str, style: &TextStyle, max_width: f32) -> Vec<String> {
    if max_width <= 0.0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        for word in &words {
            let candidate = if current_line.is_empty() {
                word.to_string()
            } else {
                format!("{current_line} {word}")
            };
            if measure_text_width(&candidate, style) > max_width && !current_line.is_empty() {
                lines.push(current_line);
                current_line = word.to_string();
            } else {
                current_line = candidate;
            }
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
