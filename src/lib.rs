//! # boleto-forge – fixed-layout payment slip renderer
//!
//! Renders Brazilian bank collection slips (boletos) over a background
//! template, one slip per page, and exports the result as a single stream.
//! The pipeline stages are:
//!
//! 1. **Bind** – load the template artwork as the page's base layer ([`template`])
//! 2. **Lay out** – place header and footer fields at fixed coordinates ([`layout`])
//! 3. **Barcode** – embed the interleaved 2 of 5 symbol ([`barcode`])
//! 4. **Compose** – repeat per slip with page breaks in between ([`pipeline`])
//! 5. **Export** – resolve the requested format and materialise the
//!    [`canvas`] as PDF ([`render`]), PNG/JPEG ([`raster`]) or a JSON dump ([`format`])
//!
//! A C-compatible FFI surface is exposed via the [`ffi`] module.

pub mod assets;
pub mod barcode;
pub mod canvas;
pub mod config;
pub mod error;
pub mod ffi;
pub mod fonts;
pub mod format;
pub mod layout;
pub mod pipeline;
pub mod presentation;
pub mod raster;
pub mod render;
pub mod samples;
pub mod slip;
pub mod template;

// Re-exports for convenience
pub use assets::Artwork;
pub use config::{RenderConfig, RenderOptions};
pub use error::RenderError;
pub use format::Format;
pub use pipeline::{render_batch, render_slip, Composer};
pub use slip::{BarcodePayload, Money, Slip, SlipRecord};
