//! Field layout – places a slip's values over the template artwork.
//!
//! The coordinates below are the printed form: each block is a fixed,
//! ordered run of placements in centimetres from the bottom-left corner.
//! Changing any of them moves a value out of its box on the artwork.

use std::slice;

use crate::canvas::{Canvas, TAG_BOLD};
use crate::presentation::{currency, date};
use crate::slip::Slip;
use crate::template::{Template, TAG_LARGE};

/// Baseline of the first composition item.
pub const COMPOSITION_ORIGIN_Y: f64 = 27.7;
/// Baseline decrement between consecutive composition items.
pub const COMPOSITION_STEP: f64 = 0.3;
pub const COMPOSITION_X: f64 = 3.7;

/// Zoom (percent) applied to both logos.
pub const LOGO_ZOOM: f64 = 80.0;

/// Baselines of the six instruction slots in the footer.
const INSTRUCTION_YS: [f64; 6] = [11.4, 11.0, 10.6, 10.2, 9.8, 9.4];

/// Iterator over `(x, y, item)` placements of the composition list.
///
/// Items step down from [`COMPOSITION_ORIGIN_Y`] by [`COMPOSITION_STEP`] with
/// no lower bound: a long enough list runs into the fields below it and,
/// eventually, off the page.
pub struct CompositionPlacements<'a> {
    items: slice::Iter<'a, String>,
    y: f64,
}

impl<'a> CompositionPlacements<'a> {
    pub fn new(items: &'a [String]) -> Self {
        Self {
            items: items.iter(),
            y: COMPOSITION_ORIGIN_Y,
        }
    }
}

impl<'a> Iterator for CompositionPlacements<'a> {
    type Item = (f64, f64, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.items.next()?;
        let y = self.y;
        self.y -= COMPOSITION_STEP;
        Some((COMPOSITION_X, y, item.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.items.size_hint()
    }
}

/// Wording of the bold composition summary line.
pub fn composition_summary<S: Slip + ?Sized>(slip: &S) -> String {
    let total = currency(slip.original_amount());
    match slip.agreement() {
        None => format!(
            "COMPOSIÇÃO DA ARRECADAÇÃO - Compet.: {} - Valor Total Original: R$ {}",
            slip.reference_month(),
            total
        ),
        Some(agreement) => format!(
            "COMPOSIÇÃO DA ARRECADAÇÃO - Compet.: {} - Acordo: {} Valor Total Original: R$ {}",
            slip.reference_month(),
            agreement,
            total
        ),
    }
}

fn put(canvas: &mut Canvas, x: f64, y: f64, text: impl Into<String>) {
    canvas.move_to(x, y);
    canvas.show(text, None);
}

fn put_tagged(canvas: &mut Canvas, x: f64, y: f64, text: impl Into<String>, tag: &str) {
    canvas.move_to(x, y);
    canvas.show(text, Some(tag));
}

/// Bank logo, `bank-dv` pair and digit line, sharing one baseline.
fn bank_row<S: Slip + ?Sized>(canvas: &mut Canvas, slip: &S, y: f64) {
    canvas.image(slip.bank_logo(), 0.5, y, LOGO_ZOOM);
    put_tagged(
        canvas,
        5.2,
        y,
        format!("{}-{}", slip.bank_code(), slip.bank_check_digit()),
        TAG_LARGE,
    );
    if let Some(barcode) = slip.barcode() {
        put_tagged(canvas, 7.5, y, barcode.digit_line(), TAG_LARGE);
    }
}

/// Draw the detail header and the receipt block.
pub fn draw_header<S: Slip + ?Sized>(canvas: &mut Canvas, slip: &S, template: &Template) {
    put_tagged(
        canvas,
        0.5,
        29.0,
        format!(
            "BOLETO ORIGINAL - Detalhamento (Vencimento {} e Nosso Número {})",
            date(slip.original_due_date()),
            slip.document_number()
        ),
        TAG_BOLD,
    );
    put(
        canvas,
        3.5,
        28.6,
        format!("{} - ({})", slip.payer_name().unwrap_or_default(), slip.payee_name()),
    );
    put_tagged(canvas, 3.5, 28.1, composition_summary(slip), TAG_BOLD);

    canvas.image(slip.payee_logo(), 0.7, 26.1, LOGO_ZOOM);

    for (x, y, item) in CompositionPlacements::new(slip.composition()) {
        put(canvas, x, y, item);
    }

    put_tagged(canvas, 16.7, 27.7, "Unidades vinculadas:", TAG_BOLD);
    canvas.text_area(slip.linked_units(), 4.0, 16.7, 27.4);

    let [first, second, third] = template.notices();
    put_tagged(canvas, 0.5, 24.9, first.as_str(), TAG_BOLD);
    put(canvas, 0.5, 24.5, second.as_str());
    put(canvas, 0.5, 24.1, third.as_str());

    bank_row(canvas, slip, 22.6);

    put(canvas, 0.7, 21.85, slip.payee_name());
    put(canvas, 11.0, 21.85, slip.agency_account());
    put(canvas, 14.2, 21.85, slip.species());
    put(canvas, 15.7, 21.85, slip.quantity());
    put(canvas, 16.5, 21.85, slip.our_number());

    put(canvas, 0.7, 21.0, slip.document_number());
    put(canvas, 7.0, 21.0, slip.formatted_payee_document());
    if let Some(due) = slip.due_date() {
        put(canvas, 12.0, 21.0, date(due));
    }
    put(canvas, 16.5, 21.0, currency(slip.document_amount()));

    put(canvas, 1.4, 19.75, slip.payer_name().unwrap_or_default());
}

/// Draw the bank's payment block.
pub fn draw_footer<S: Slip + ?Sized>(canvas: &mut Canvas, slip: &S) {
    bank_row(canvas, slip, 15.6);

    put(canvas, 0.7, 14.8, slip.payment_location());
    if let Some(due) = slip.due_date() {
        put(canvas, 16.5, 14.8, date(due));
    }

    put(canvas, 0.7, 14.0, slip.payee_name());
    put(canvas, 16.5, 14.0, slip.agency_account());

    if let Some(issued) = slip.document_date() {
        put(canvas, 0.7, 13.10, date(issued));
    }
    put(canvas, 4.2, 13.10, slip.document_number());
    put(canvas, 10.0, 13.10, slip.document_species());
    put(canvas, 11.7, 13.10, if slip.acceptance() { "S" } else { "N" });
    if let Some(processed) = slip.processing_date() {
        put(canvas, 13.0, 13.10, date(processed));
    }
    put(canvas, 16.5, 13.10, slip.our_number());

    put(canvas, 4.4, 12.30, slip.wallet());
    put(canvas, 6.4, 12.30, slip.species());
    put(canvas, 8.0, 12.30, slip.quantity());
    put(canvas, 11.0, 12.30, currency(slip.value()));
    put(canvas, 16.5, 12.30, currency(slip.document_amount()));

    for (y, instruction) in INSTRUCTION_YS.iter().zip(slip.instructions()) {
        put(canvas, 0.7, *y, instruction.as_str());
    }

    if let Some(payer) = slip.payer_name() {
        put(canvas, 1.2, 7.6, payer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DrawOp;
    use crate::samples::sample_slip;

    fn texts(canvas: &Canvas) -> Vec<(f64, f64, String, Option<String>)> {
        canvas.pages()[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, y, text, tag } => Some((*x, *y, text.clone(), tag.clone())),
                _ => None,
            })
            .collect()
    }

    fn text_at(canvas: &Canvas, x: f64, y: f64) -> Option<String> {
        texts(canvas)
            .into_iter()
            .find(|(tx, ty, _, _)| (tx - x).abs() < 1e-9 && (ty - y).abs() < 1e-9)
            .map(|(_, _, t, _)| t)
    }

    fn template() -> (tempfile::NamedTempFile, Template) {
        let file = tempfile::NamedTempFile::new().unwrap();
        let template = Template::load(file.path()).unwrap();
        (file, template)
    }

    #[test]
    fn composition_empty_list() {
        assert_eq!(CompositionPlacements::new(&[]).count(), 0);
    }

    #[test]
    fn composition_single_item_at_origin() {
        let items = vec!["Taxa condominial 150,00".to_string()];
        let placed: Vec<_> = CompositionPlacements::new(&items).collect();
        assert_eq!(placed, vec![(3.7, 27.7, "Taxa condominial 150,00")]);
    }

    #[test]
    fn composition_steps_down_without_clamping() {
        let items: Vec<String> = (0..100).map(|i| format!("item {i}")).collect();
        let placed: Vec<_> = CompositionPlacements::new(&items).collect();
        assert_eq!(placed.len(), 100);
        for (k, (x, y, text)) in placed.iter().enumerate() {
            assert_eq!(*x, 3.7);
            assert!((y - (27.7 - 0.3 * k as f64)).abs() < 1e-9, "item {k} at {y}");
            assert_eq!(*text, format!("item {k}"));
        }
        // 27.7 / 0.3 ≈ 92.3, so item 93 onward sits below the page edge.
        assert!(placed[93].1 <= 0.0);
        assert!(placed[99].1 < 0.0);
    }

    #[test]
    fn summary_without_agreement() {
        let mut slip = sample_slip();
        slip.agreement = None;
        let line = composition_summary(&slip);
        assert!(line.contains("Valor Total Original: R$ 1.523,45"));
        assert!(!line.contains("Acordo:"));
    }

    #[test]
    fn summary_with_agreement() {
        let mut slip = sample_slip();
        slip.agreement = Some("123".to_string());
        let line = composition_summary(&slip);
        assert!(line.contains("Acordo: 123 Valor Total Original: R$ 1.523,45"));
    }

    #[test]
    fn header_places_fields() {
        let (_file, template) = template();
        let slip = sample_slip();
        let mut canvas = Canvas::a4();
        draw_header(&mut canvas, &slip, &template);

        let title = text_at(&canvas, 0.5, 29.0).unwrap();
        assert!(title.starts_with("BOLETO ORIGINAL - Detalhamento (Vencimento 10/03/2024"));
        assert_eq!(text_at(&canvas, 5.2, 22.6).as_deref(), Some("001-9"));
        assert_eq!(
            text_at(&canvas, 7.5, 22.6).as_deref(),
            Some(slip.barcode.as_ref().unwrap().digit_line.as_str())
        );
        assert_eq!(text_at(&canvas, 7.0, 21.0).as_deref(), Some("12.345.678/0001-95"));
        assert_eq!(text_at(&canvas, 16.5, 21.0).as_deref(), Some("1.548,90"));

        let large: Vec<_> = texts(&canvas)
            .into_iter()
            .filter(|(_, _, _, tag)| tag.as_deref() == Some(TAG_LARGE))
            .collect();
        assert_eq!(large.len(), 2);

        let images = canvas.pages()[0]
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Image { zoom, .. } if *zoom == 80.0))
            .count();
        assert_eq!(images, 2);
    }

    #[test]
    fn footer_skips_absent_optionals() {
        let mut slip = sample_slip();
        slip.due_date = None;
        slip.document_date = None;
        slip.processing_date = None;
        slip.payer_name = None;
        let mut canvas = Canvas::a4();
        draw_footer(&mut canvas, &slip);

        assert!(text_at(&canvas, 16.5, 14.8).is_none());
        assert!(text_at(&canvas, 0.7, 13.10).is_none());
        assert!(text_at(&canvas, 13.0, 13.10).is_none());
        assert!(text_at(&canvas, 1.2, 7.6).is_none());
        assert!(text_at(&canvas, 4.2, 13.10).is_some());
    }

    #[test]
    fn footer_prints_present_optionals() {
        let slip = sample_slip();
        let mut canvas = Canvas::a4();
        draw_footer(&mut canvas, &slip);
        assert_eq!(text_at(&canvas, 16.5, 14.8).as_deref(), Some("10/04/2024"));
        assert_eq!(text_at(&canvas, 0.7, 13.10).as_deref(), Some("01/03/2024"));
        assert_eq!(text_at(&canvas, 13.0, 13.10).as_deref(), Some("05/03/2024"));
        assert_eq!(text_at(&canvas, 11.7, 13.10).as_deref(), Some("N"));
    }

    #[test]
    fn footer_caps_instructions_at_six() {
        let mut slip = sample_slip();
        slip.instructions = (1..=8).map(|i| format!("instrucao {i}")).collect();
        let mut canvas = Canvas::a4();
        draw_footer(&mut canvas, &slip);
        let printed: Vec<_> = texts(&canvas)
            .into_iter()
            .filter(|(_, _, t, _)| t.starts_with("instrucao"))
            .collect();
        assert_eq!(printed.len(), 6);
        assert_eq!(printed[5].1, 9.4);
    }

    #[test]
    fn missing_barcode_omits_digit_lines() {
        let mut slip = sample_slip();
        slip.barcode = None;
        let mut canvas = Canvas::a4();
        draw_footer(&mut canvas, &slip);
        assert!(text_at(&canvas, 7.5, 15.6).is_none());
        assert_eq!(text_at(&canvas, 5.2, 15.6).as_deref(), Some("001-9"));
    }
}
