//! One-page card layout as SVG markup.
//!
//! Pure string construction: the generator hands the finished markup to
//! usvg/svg2pdf for conversion. Page size is A4 in PDF points with fixed
//! margins and a fixed slot for the QR symbol below the details block.

use crate::card::HealthCardRecord;

/// A4 page, in PDF points.
pub const PAGE_WIDTH: f64 = 595.0;
pub const PAGE_HEIGHT: f64 = 842.0;

const MARGIN: f64 = 48.0;
const HEADING_Y: f64 = 72.0;
const DETAILS_TOP: f64 = 150.0;
const ROW_HEIGHT: f64 = 26.0;
const VALUE_X: f64 = 190.0;

/// Side length of the QR slot, shared with the placeholder box.
pub const QR_SIZE: f64 = 150.0;

/// Widest value that fits a detail row. Longer values are clipped for
/// display only; the QR payload carries the untruncated identity.
const MAX_VALUE_CHARS: usize = 40;

/// Top edge of the QR slot: below ten detail rows plus a gap.
pub const QR_TOP: f64 = DETAILS_TOP + 10.0 * ROW_HEIGHT + 36.0;

const ORGANIZATION: &str = "Government Migrant Worker Health Portal";
const TITLE: &str = "Migrant Worker Health Card";

/// Content of the QR slot: either a rendered symbol fragment or the
/// placeholder drawn when encoding failed.
pub enum QrBlock {
    Symbol(String),
    Placeholder,
}

/// Builds the complete card markup for one record.
pub fn build_card_svg(record: &HealthCardRecord, qr: QrBlock) -> String {
    let mut svg = String::with_capacity(4096);

    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{PAGE_WIDTH}" height="{PAGE_HEIGHT}" viewBox="0 0 {PAGE_WIDTH} {PAGE_HEIGHT}">"#
    ));
    svg.push_str(&format!(
        r##"<rect x="0" y="0" width="{PAGE_WIDTH}" height="{PAGE_HEIGHT}" fill="#ffffff"/>"##
    ));

    push_heading(&mut svg);
    push_details(&mut svg, record);

    let qr_x = (PAGE_WIDTH - QR_SIZE) / 2.0;
    match qr {
        QrBlock::Symbol(fragment) => svg.push_str(&fragment),
        QrBlock::Placeholder => push_placeholder(&mut svg, qr_x, QR_TOP),
    }

    svg.push_str("</svg>");
    svg
}

fn push_heading(svg: &mut String) {
    let center = PAGE_WIDTH / 2.0;
    svg.push_str(&format!(
        r#"<text x="{center}" y="{HEADING_Y}" text-anchor="middle" font-family="sans-serif" font-size="20" font-weight="bold">{}</text>"#,
        xml_escape(ORGANIZATION)
    ));
    svg.push_str(&format!(
        r#"<text x="{center}" y="{y}" text-anchor="middle" font-family="sans-serif" font-size="15">{}</text>"#,
        xml_escape(TITLE),
        y = HEADING_Y + 26.0
    ));
    svg.push_str(&format!(
        r##"<line x1="{MARGIN}" y1="{y}" x2="{x2}" y2="{y}" stroke="#000000" stroke-width="1"/>"##,
        y = HEADING_Y + 44.0,
        x2 = PAGE_WIDTH - MARGIN
    ));
}

fn push_details(svg: &mut String, record: &HealthCardRecord) {
    let rows: [(&str, &str); 10] = [
        ("Health ID", &record.health_id),
        ("Name", &record.full_name),
        ("Date of Birth", &record.date_of_birth),
        ("Blood Group", &record.blood_group),
        ("Mobile", &record.mobile),
        ("Email", &record.email),
        ("Address", &record.address),
        ("District", &record.district),
        ("Issue Date", &record.issue_date),
        ("Valid Until", &record.valid_until),
    ];

    for (i, (label, value)) in rows.iter().enumerate() {
        let y = DETAILS_TOP + i as f64 * ROW_HEIGHT;
        svg.push_str(&format!(
            r#"<text x="{MARGIN}" y="{y}" font-family="sans-serif" font-size="12" font-weight="bold">{}:</text>"#,
            xml_escape(label)
        ));
        svg.push_str(&format!(
            r#"<text x="{VALUE_X}" y="{y}" font-family="sans-serif" font-size="12">{}</text>"#,
            xml_escape(&clip_value(value))
        ));
    }
}

/// Visible fallback drawn in the QR slot when encoding failed. The card is
/// still issued; verification falls back to the printed health ID.
fn push_placeholder(svg: &mut String, x: f64, y: f64) {
    svg.push_str(&format!(
        r##"<rect x="{x}" y="{y}" width="{QR_SIZE}" height="{QR_SIZE}" fill="#f2f2f2" stroke="#888888" stroke-width="1.5" stroke-dasharray="6 4"/>"##
    ));
    let center = x + QR_SIZE / 2.0;
    svg.push_str(&format!(
        r#"<text x="{center}" y="{ty}" text-anchor="middle" font-family="sans-serif" font-size="11">QR code unavailable</text>"#,
        ty = y + QR_SIZE / 2.0 - 6.0
    ));
    svg.push_str(&format!(
        r#"<text x="{center}" y="{ty}" text-anchor="middle" font-family="sans-serif" font-size="9">Verify using the Health ID above</text>"#,
        ty = y + QR_SIZE / 2.0 + 12.0
    ));
}

fn clip_value(value: &str) -> String {
    if value.chars().count() <= MAX_VALUE_CHARS {
        value.to_string()
    } else {
        let mut out: String = value.chars().take(MAX_VALUE_CHARS).collect();
        out.push('…');
        out
    }
}

fn xml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> HealthCardRecord {
        HealthCardRecord {
            health_id: "HLTH9341863BJHOX".to_string(),
            full_name: "Raj Kumar".to_string(),
            blood_group: "O+".to_string(),
            district: "Ernakulam".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn markup_contains_record_fields() {
        let svg = build_card_svg(&sample_record(), QrBlock::Placeholder);

        assert!(svg.contains("HLTH9341863BJHOX"));
        assert!(svg.contains("Raj Kumar"));
        assert!(svg.contains("O+"));
        assert!(svg.contains("Ernakulam"));
        assert!(svg.contains("Migrant Worker Health Card"));
    }

    #[test]
    fn markup_embeds_qr_fragment() {
        let svg = build_card_svg(
            &sample_record(),
            QrBlock::Symbol("<g id=\"qr\"></g>".to_string()),
        );

        assert!(svg.contains("<g id=\"qr\"></g>"));
        assert!(!svg.contains("QR code unavailable"));
    }

    #[test]
    fn placeholder_has_explanatory_text() {
        let svg = build_card_svg(&sample_record(), QrBlock::Placeholder);

        assert!(svg.contains("QR code unavailable"));
        assert!(svg.contains("stroke-dasharray"));
    }

    #[test]
    fn field_values_are_escaped() {
        let record = HealthCardRecord {
            health_id: "HLTH<1>".to_string(),
            full_name: "D'Souza & Sons".to_string(),
            ..Default::default()
        };
        let svg = build_card_svg(&record, QrBlock::Placeholder);

        assert!(svg.contains("HLTH&lt;1&gt;"));
        assert!(svg.contains("D&apos;Souza &amp; Sons"));
        assert!(!svg.contains("D'Souza & Sons"));
    }

    #[test]
    fn long_values_are_clipped_for_display() {
        let record = HealthCardRecord {
            health_id: "H".repeat(500),
            ..Default::default()
        };
        let svg = build_card_svg(&record, QrBlock::Placeholder);

        assert!(svg.contains(&format!("{}…", "H".repeat(40))));
        assert!(!svg.contains(&"H".repeat(41)));
    }

    #[test]
    fn empty_fields_render_without_panicking() {
        let svg = build_card_svg(&HealthCardRecord::default(), QrBlock::Placeholder);
        assert!(svg.contains("Health ID"));
        assert!(svg.contains("Valid Until"));
    }
}
