//! Pipeline – composes slips onto pages and exports the result in one call.
//!
//! Per page: bind template → header → footer → barcode. Everything is drawn
//! into an in-memory [`Canvas`] and exported only at the very end, so any
//! failure (missing template, bad barcode payload, unregistered style)
//! discards the whole document.

use crate::barcode::{self, RenderMode};
use crate::canvas::Canvas;
use crate::config::{RenderConfig, RenderOptions};
use crate::error::{RenderError, Result};
use crate::format::{self, ExportRequest};
use crate::layout::{draw_footer, draw_header};
use crate::slip::Slip;
use crate::template::Template;

/// Composes slips with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    config: RenderConfig,
}

impl Composer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Load (and existence-check) a fresh template instance.
    fn load_template(&self) -> Result<Template> {
        let template = Template::load(self.config.template.clone())?;
        Ok(match &self.config.notices {
            Some(notices) => template.with_notices(notices.clone()),
            None => template,
        })
    }

    fn draw_slip<S: Slip + ?Sized>(
        canvas: &mut Canvas,
        template: &Template,
        slip: &S,
        mode: RenderMode,
    ) -> Result<()> {
        template.bind(canvas)?;
        draw_header(canvas, slip, template);
        draw_footer(canvas, slip);
        barcode::embed(canvas, slip, mode)?;
        Ok(())
    }

    /// Draw one slip on a single page, without exporting.
    pub fn compose<S: Slip + ?Sized>(&self, slip: &S) -> Result<Canvas> {
        let template = self.load_template()?;
        let mut canvas = Canvas::a4();
        Self::draw_slip(&mut canvas, &template, slip, RenderMode::Single)?;
        log::debug!("composed slip {}", slip.document_number());
        Ok(canvas)
    }

    /// Draw each slip on its own page, in order, without exporting.
    ///
    /// The template is checked before anything is drawn and rebound for every
    /// page; pages are separated by explicit breaks.
    pub fn compose_batch<S: Slip>(&self, slips: &[S]) -> Result<Canvas> {
        if slips.is_empty() {
            return Err(RenderError::EmptyBatch);
        }
        self.load_template()?;

        let mut canvas = Canvas::a4();
        for (index, slip) in slips.iter().enumerate() {
            let template = self.load_template()?;
            Self::draw_slip(&mut canvas, &template, slip, RenderMode::Batch)?;
            log::debug!(
                "composed slip {} ({}/{})",
                slip.document_number(),
                index + 1,
                slips.len()
            );
            if index + 1 < slips.len() {
                canvas.next_page();
            }
        }
        Ok(canvas)
    }

    /// Render one slip to a byte stream in the requested (or default) format.
    pub fn render<S: Slip + ?Sized>(&self, slip: &S, options: &RenderOptions) -> Result<Vec<u8>> {
        let request = format::resolve(options, &self.config)?;
        let canvas = self.compose(slip)?;
        self.export(&canvas, request)
    }

    /// Render several slips into one multi-page byte stream.
    pub fn render_batch<S: Slip>(&self, slips: &[S], options: &RenderOptions) -> Result<Vec<u8>> {
        let request = format::resolve(options, &self.config)?;
        let canvas = self.compose_batch(slips)?;
        self.export(&canvas, request)
    }

    fn export(&self, canvas: &Canvas, request: ExportRequest) -> Result<Vec<u8>> {
        format::export(canvas, request, &self.config)
    }
}

/// Render one slip with `config`.
pub fn render_slip<S: Slip + ?Sized>(
    slip: &S,
    options: &RenderOptions,
    config: &RenderConfig,
) -> Result<Vec<u8>> {
    Composer::new(config.clone()).render(slip, options)
}

/// Render a batch of slips with `config`.
pub fn render_batch<S: Slip>(
    slips: &[S],
    options: &RenderOptions,
    config: &RenderConfig,
) -> Result<Vec<u8>> {
    Composer::new(config.clone()).render_batch(slips, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DrawOp;
    use crate::samples::{sample_batch, sample_slip};

    fn composer_with_template() -> (tempfile::NamedTempFile, Composer) {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = RenderConfig::default().with_template(file.path());
        (file, Composer::new(config))
    }

    #[test]
    fn single_page_starts_with_template() {
        let (_file, composer) = composer_with_template();
        let canvas = composer.compose(&sample_slip()).unwrap();
        assert_eq!(canvas.page_count(), 1);
        assert!(matches!(canvas.pages()[0].ops[0], DrawOp::Template { .. }));
    }

    #[test]
    fn batch_has_one_page_per_slip() {
        let (_file, composer) = composer_with_template();
        let slips = sample_batch(4);
        let canvas = composer.compose_batch(&slips).unwrap();
        assert_eq!(canvas.page_count(), 4);
        assert_eq!(canvas.page_breaks(), 3);
        for page in canvas.pages() {
            let templates = page
                .ops
                .iter()
                .filter(|op| matches!(op, DrawOp::Template { .. }))
                .count();
            assert_eq!(templates, 1);
        }
    }

    #[test]
    fn empty_batch_is_rejected() {
        let (_file, composer) = composer_with_template();
        let slips: Vec<crate::slip::SlipRecord> = Vec::new();
        assert!(matches!(composer.compose_batch(&slips), Err(RenderError::EmptyBatch)));
    }

    #[test]
    fn missing_template_fails_before_drawing() {
        let composer = Composer::new(RenderConfig::default().with_template("/nonexistent/t.png"));
        assert!(matches!(
            composer.compose(&sample_slip()),
            Err(RenderError::TemplateNotFound(_))
        ));
        assert!(matches!(
            composer.compose_batch(&sample_batch(2)),
            Err(RenderError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn custom_notices_reach_the_header() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut config = RenderConfig::default().with_template(file.path());
        config.notices = Some(["Aviso 1".into(), "Aviso 2".into(), "Aviso 3".into()]);
        let canvas = Composer::new(config).compose(&sample_slip()).unwrap();
        let found = canvas.pages()[0]
            .ops
            .iter()
            .any(|op| {
                matches!(op, DrawOp::Text { text, y, .. } if text == "Aviso 2" && *y == 24.5)
            });
        assert!(found);
    }

    #[test]
    fn bad_barcode_payload_aborts_batch() {
        let (_file, composer) = composer_with_template();
        let mut slips = sample_batch(3);
        if let Some(barcode) = slips[2].barcode.as_mut() {
            barcode.payload = "not digits".to_string();
        }
        assert!(matches!(
            composer.render_batch(&slips, &RenderOptions::format("json")),
            Err(RenderError::Barcode(_))
        ));
    }
}
