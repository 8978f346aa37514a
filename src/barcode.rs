//! Barcode embedding – the interleaved 2 of 5 symbol at the foot of the slip.
//!
//! Symbol encoding uses the `barcoders` crate; the resulting module pattern
//! is stored on the canvas and stretched over a fixed rectangle at export.

use barcoders::sym::tf::TF;

use crate::canvas::Canvas;
use crate::error::{RenderError, Result};
use crate::slip::Slip;

pub const BARCODE_X: f64 = 0.7;
pub const BARCODE_WIDTH: f64 = 10.3;
pub const BARCODE_HEIGHT: f64 = 1.3;

/// Which entry point is composing the page. Batch pages reserve extra header
/// space, so the symbol sits higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Single,
    Batch,
}

impl RenderMode {
    /// Vertical offset of the symbol's bottom edge, in centimetres.
    pub fn barcode_y(self) -> f64 {
        match self {
            RenderMode::Single => 4.4,
            RenderMode::Batch => 5.8,
        }
    }
}

/// Encode digits as an interleaved 2 of 5 module pattern (`true` = bar).
///
/// Digits are encoded in pairs, so an odd-length payload gets a leading `0`.
/// `barcoders` would append a check digit instead, changing the payload.
pub fn encode_interleaved_2of5(payload: &str) -> Result<Vec<bool>> {
    let digits = if payload.len() % 2 == 1 {
        format!("0{payload}")
    } else {
        payload.to_string()
    };
    let symbol = TF::interleaved(&digits)
        .map_err(|e| RenderError::Barcode(format!("{payload:?}: {e}")))?;
    Ok(symbol.encode().into_iter().map(|m| m == 1).collect())
}

/// Draw the slip's barcode if it has one. Returns whether a symbol was drawn.
pub fn embed<S: Slip + ?Sized>(canvas: &mut Canvas, slip: &S, mode: RenderMode) -> Result<bool> {
    let Some(barcode) = slip.barcode() else {
        log::debug!("slip {} has no barcode payload", slip.document_number());
        return Ok(false);
    };

    let payload = barcode.payload();
    let modules = encode_interleaved_2of5(payload)?;
    canvas.barcode(
        payload,
        modules,
        BARCODE_X,
        mode.barcode_y(),
        BARCODE_WIDTH,
        BARCODE_HEIGHT,
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::DrawOp;
    use crate::samples::sample_slip;

    #[test]
    fn mode_offsets() {
        assert_eq!(RenderMode::Single.barcode_y(), 4.4);
        assert_eq!(RenderMode::Batch.barcode_y(), 5.8);
    }

    #[test]
    fn encodes_digit_payload() {
        let modules = encode_interleaved_2of5("00190000090281913600400000001234").unwrap();
        assert!(!modules.is_empty());
        // Start pattern: narrow bar, narrow space, narrow bar, narrow space.
        assert!(modules[0]);
        assert!(modules.iter().any(|m| !m));
    }

    #[test]
    fn odd_payload_is_zero_padded() {
        let odd = encode_interleaved_2of5("123").unwrap();
        assert_eq!(odd, encode_interleaved_2of5("0123").unwrap());
        assert_ne!(odd, encode_interleaved_2of5("1236").unwrap());
    }

    #[test]
    fn rejects_non_digits() {
        assert!(matches!(
            encode_interleaved_2of5("12AB"),
            Err(RenderError::Barcode(_))
        ));
    }

    #[test]
    fn geometry_differs_only_in_y() {
        let slip = sample_slip();
        let mut single = Canvas::a4();
        let mut batch = Canvas::a4();
        assert!(embed(&mut single, &slip, RenderMode::Single).unwrap());
        assert!(embed(&mut batch, &slip, RenderMode::Batch).unwrap());

        let geometry = |canvas: &Canvas| match &canvas.pages()[0].ops[0] {
            DrawOp::Barcode { x, y, width, height, .. } => (*x, *y, *width, *height),
            other => panic!("expected barcode op, got {other:?}"),
        };
        assert_eq!(geometry(&single), (0.7, 4.4, 10.3, 1.3));
        assert_eq!(geometry(&batch), (0.7, 5.8, 10.3, 1.3));
    }

    #[test]
    fn absent_payload_draws_nothing() {
        let mut slip = sample_slip();
        slip.barcode = None;
        let mut canvas = Canvas::a4();
        assert!(!embed(&mut canvas, &slip, RenderMode::Single).unwrap());
        assert!(canvas.pages()[0].ops.is_empty());
    }
}
