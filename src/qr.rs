//! QR identity payload and in-memory symbol rendering.
//!
//! The symbol is produced as an SVG fragment (a module grid of 1x1 rects)
//! that the layout embeds directly, so no raster image or temporary file is
//! ever involved.

use crate::card::HealthCardRecord;
use qrcode::{Color, EcLevel, QrCode};
use serde::Serialize;
use std::fmt::Write;
use thiserror::Error;

/// Literal document-type tag embedded in every card payload.
pub const DOCUMENT_TYPE: &str = "HEALTH_CARD";

/// Issuing-authority tag embedded in every card payload.
pub const ISSUING_AUTHORITY: &str = "GOVT_MIGRANT_HEALTH";

/// Quiet-zone width, in modules, on each side of the symbol.
const QUIET_ZONE_MODULES: usize = 4;

/// Errors from payload serialization or symbol encoding.
///
/// Consumers treat these as recoverable: the generator substitutes a
/// placeholder block instead of failing the document.
#[derive(Debug, Error)]
pub enum QrEncodeError {
    #[error("failed to serialize card payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("payload does not fit in a QR symbol: {0}")]
    Capacity(#[from] qrcode::types::QrError),
}

/// Compact identity payload encoded into the QR symbol.
///
/// Fixed keys only; enough for a scanning client to recognize the document
/// type without the full record.
#[derive(Debug, Serialize)]
pub struct CardPayload<'a> {
    #[serde(rename = "healthId")]
    pub health_id: &'a str,
    pub name: &'a str,
    #[serde(rename = "type")]
    pub document_type: &'static str,
    pub issuer: &'static str,
}

impl<'a> CardPayload<'a> {
    pub fn for_record(record: &'a HealthCardRecord) -> Self {
        Self {
            health_id: &record.health_id,
            name: &record.full_name,
            document_type: DOCUMENT_TYPE,
            issuer: ISSUING_AUTHORITY,
        }
    }

    /// Serializes the payload to the compact JSON string carried by the symbol.
    pub fn to_compact_json(&self) -> Result<String, QrEncodeError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Encodes `text` as a QR symbol and renders it as an SVG `<g>` fragment
/// positioned at `(x, y)` and scaled to `size` x `size` user units.
///
/// Pure function: identical text and size always yield identical markup.
/// Error-correction level M with a 4-module quiet zone, black on white.
pub fn qr_svg_fragment(text: &str, x: f64, y: f64, size: f64) -> Result<String, QrEncodeError> {
    let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::M)?;
    let modules = code.to_colors();
    let module_count = code.width();
    let total = module_count + 2 * QUIET_ZONE_MODULES;
    let scale = size / total as f64;

    let mut svg = String::with_capacity(modules.len() * 16);
    let _ = write!(
        svg,
        r#"<g transform="translate({x} {y}) scale({scale})">"#
    );
    let _ = write!(
        svg,
        r##"<rect x="0" y="0" width="{total}" height="{total}" fill="#ffffff"/>"##
    );

    for (i, color) in modules.iter().enumerate() {
        if *color == Color::Dark {
            let mx = i % module_count + QUIET_ZONE_MODULES;
            let my = i / module_count + QUIET_ZONE_MODULES;
            let _ = write!(
                svg,
                r##"<rect x="{mx}" y="{my}" width="1" height="1" fill="#000000"/>"##
            );
        }
    }

    svg.push_str("</g>");
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> HealthCardRecord {
        HealthCardRecord {
            health_id: "HLTH9341863BJHOX".to_string(),
            full_name: "Raj Kumar".to_string(),
            blood_group: "O+".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn payload_carries_identity_and_tags() {
        let record = sample_record();
        let json = CardPayload::for_record(&record).to_compact_json().unwrap();

        assert!(json.contains("HLTH9341863BJHOX"));
        assert!(json.contains("Raj Kumar"));
        assert!(json.contains(r#""type":"HEALTH_CARD""#));
        assert!(json.contains(r#""issuer":"GOVT_MIGRANT_HEALTH""#));
    }

    #[test]
    fn fragment_contains_dark_modules() {
        let svg = qr_svg_fragment("HLTH0001", 40.0, 500.0, 150.0).unwrap();

        assert!(svg.starts_with("<g transform="));
        assert!(svg.ends_with("</g>"));
        assert!(svg.matches(r##"fill="#000000""##).count() > 50);
    }

    #[test]
    fn fragment_is_deterministic() {
        let a = qr_svg_fragment("HLTH0001", 40.0, 500.0, 150.0).unwrap();
        let b = qr_svg_fragment("HLTH0001", 40.0, 500.0, 150.0).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let huge = "X".repeat(8000);
        let result = qr_svg_fragment(&huge, 0.0, 0.0, 150.0);
        assert!(matches!(result, Err(QrEncodeError::Capacity(_))));
    }
}
