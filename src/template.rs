//! Template binding – the background artwork every slip page is drawn on.
//!
//! The artwork is a raster image (PNG or JPEG), either the one bundled with
//! the library or a file, stretched over the page and shifted right by a
//! fixed margin. Besides the artwork the template carries
//! the style tags and notice lines the field layout relies on.

use crate::assets::Artwork;
use crate::canvas::Canvas;
use crate::error::Result;
use crate::fonts::TextStyle;

/// Tag of the larger face used for the bank code and digit line.
pub const TAG_LARGE: &str = "large";

/// Offset of the artwork on the page, in centimetres.
pub const TEMPLATE_OFFSET: (f64, f64) = (0.3, 0.0);

const TEMPLATE_NAME: &str = "template";

const DEFAULT_NOTICES: [&str; 3] = [
    "BOLETO EXPRESSO (2 VIA de BOLETO gerado pelo site www.bersi.com.br).",
    "Caso a geração da 2 via seja feita após o vencimento original, o novo boleto será corrigido com os acréscimos legais.",
    "Em caso de dúvidas ou esclarecimentos adicionais contatar a BERSI ADMINISTRADORA.",
];

/// A verified template asset plus the text it contributes to the header.
#[derive(Debug, Clone)]
pub struct Template {
    artwork: Artwork,
    notices: [String; 3],
}

impl Template {
    /// Check that the asset exists. Nothing is drawn if this fails.
    pub fn load(artwork: impl Into<Artwork>) -> Result<Self> {
        let artwork = artwork.into();
        artwork.ensure_available()?;
        Ok(Self {
            artwork,
            notices: DEFAULT_NOTICES.map(str::to_string),
        })
    }

    /// Replace the three notice lines printed under the composition block.
    /// The first one is set in bold.
    pub fn with_notices(mut self, notices: [String; 3]) -> Self {
        self.notices = notices;
        self
    }

    pub fn artwork(&self) -> &Artwork {
        &self.artwork
    }

    pub fn notices(&self) -> &[String; 3] {
        &self.notices
    }

    /// Bind the artwork as the current page's base layer and register the
    /// style tags used by the field layout.
    ///
    /// The asset is re-checked on every bind, so a file that vanishes midway
    /// through a batch still aborts the render.
    pub fn bind(&self, canvas: &mut Canvas) -> Result<()> {
        self.artwork.ensure_available()?;
        let (x, y) = TEMPLATE_OFFSET;
        canvas.define_template(TEMPLATE_NAME, self.artwork.clone(), x, y);
        canvas.use_template(TEMPLATE_NAME)?;
        canvas.define_tag(TAG_LARGE, TextStyle::regular(13.0));
        Ok(())
    }
}
