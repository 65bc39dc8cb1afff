//! Health-card PDF generation with TRUE vector fidelity via svg2pdf.

use crate::card::HealthCardRecord;
use crate::qr::{self, CardPayload};
use crate::render::{self, QrBlock, PAGE_WIDTH, QR_SIZE, QR_TOP};
use thiserror::Error;
use tracing::{info, warn};

/// Fatal generation failures. QR encoding problems never surface here; they
/// degrade to the placeholder instead.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to parse card markup: {0}")]
    Markup(#[from] usvg::Error),
    #[error("card page has invalid dimensions: {width}x{height}")]
    PageDimensions { width: f32, height: f32 },
}

/// Finished one-page document as an opaque in-memory buffer.
#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    bytes: Vec<u8>,
}

impl GeneratedDocument {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Stateless card-to-PDF pipeline.
///
/// Each call is independent and idempotent for identical input; the only
/// construction-time state is the font database loaded for text layout.
/// Safe to share across tasks behind an `Arc`.
pub struct HealthCardGenerator {
    options: usvg::Options<'static>,
}

impl HealthCardGenerator {
    /// Creates a generator with system fonts loaded for text layout.
    pub fn new() -> Self {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        Self { options }
    }

    /// Renders `record` into a one-page PDF health card.
    ///
    /// The QR symbol encodes the compact identity payload (health ID, name,
    /// document-type and issuer tags). If the payload cannot be encoded the
    /// card is still produced with a visible placeholder in the QR slot.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the card markup cannot be parsed or has
    /// invalid page dimensions. No partial buffer is ever returned.
    pub fn generate(&self, record: &HealthCardRecord) -> Result<GeneratedDocument, RenderError> {
        let qr_x = (PAGE_WIDTH - QR_SIZE) / 2.0;
        let qr_block = match CardPayload::for_record(record)
            .to_compact_json()
            .and_then(|payload| qr::qr_svg_fragment(&payload, qr_x, QR_TOP, QR_SIZE))
        {
            Ok(fragment) => QrBlock::Symbol(fragment),
            Err(e) => {
                warn!(
                    health_id = %record.health_id,
                    error = %e,
                    "QR encoding failed, rendering placeholder"
                );
                QrBlock::Placeholder
            }
        };

        let svg = render::build_card_svg(record, qr_block);

        let tree = usvg::Tree::from_str(&svg, &self.options)?;

        let size = tree.size();
        if size.width() <= 0.0 || size.height() <= 0.0 {
            return Err(RenderError::PageDimensions {
                width: size.width(),
                height: size.height(),
            });
        }

        // True vector conversion, entirely in memory
        let pdf_data = svg2pdf::to_pdf(
            &tree,
            svg2pdf::ConversionOptions::default(),
            svg2pdf::PageOptions::default(),
        );

        info!(
            health_id = %record.health_id,
            bytes = pdf_data.len(),
            "health card rendered"
        );

        Ok(GeneratedDocument { bytes: pdf_data })
    }
}

impl Default for HealthCardGenerator {
    fn default() -> Self {
        Self::new()
    }
}
