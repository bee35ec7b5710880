//! Blank placeholders for empty slots that the OCR engine cannot see.
//!
//! Both passes walk a reading-ordered stream and only ever insert tokens; the
//! caller re-sorts afterwards.

use tracing::debug;

use crate::config::PipelineConfig;
use crate::core::geometry::{gap_between, BBox};
use crate::core::model::{PlacedToken, Token, TokenStream};

pub const COLON: &str = ":";
pub const SEAL: &str = "(인)";
pub const DATE_UNITS: [&str; 3] = ["년", "월", "일"];

pub fn is_date_unit(token: &Token) -> bool {
    DATE_UNITS.iter().any(|unit| token.is(unit))
}

pub(crate) fn same_row(a: &BBox, b: &BBox, tolerance: i32) -> bool {
    (a.y0 - b.y0).abs() <= tolerance
}

/// Box for a blank sitting in an empty `:` … `(인)` signature slot.
pub fn seal_slot_box(colon: &BBox, seal: &BBox, config: &PipelineConfig) -> BBox {
    if same_row(colon, seal, config.text_row_tolerance) {
        gap_between(colon, seal)
    } else {
        BBox::new(
            colon.x1,
            colon.y0,
            colon.x1 + config.seal_blank_width,
            colon.y1,
        )
        .clamped()
    }
}

/// Inserts a blank between a `:` and a directly following `(인)`.
pub fn insert_empty_seal_blanks(stream: TokenStream, config: &PipelineConfig) -> TokenStream {
    let entries = stream.into_entries();
    let mut out = Vec::with_capacity(entries.len());
    let mut inserted = 0usize;

    for (idx, entry) in entries.iter().enumerate() {
        out.push(entry.clone());
        let Some(next) = entries.get(idx + 1) else {
            continue;
        };
        if entry.token.is(COLON) && next.token.is(SEAL) {
            out.push(PlacedToken::blank(seal_slot_box(&entry.bbox, &next.bbox, config)));
            inserted += 1;
        }
    }

    debug!(inserted, "synthesized empty seal blanks");
    TokenStream::new(out)
}

/// Inserts a blank before a bare 년/월/일 whose predecessor is not numeric.
pub fn insert_date_unit_blanks(stream: TokenStream, config: &PipelineConfig) -> TokenStream {
    let entries = stream.into_entries();
    let mut out: Vec<PlacedToken> = Vec::with_capacity(entries.len());
    let mut inserted = 0usize;

    for entry in entries {
        if let Some(width) = entry
            .token
            .as_text()
            .and_then(|unit| config.date_blank_widths.for_unit(unit))
        {
            let needs_blank = out
                .last()
                .map(|prev| !prev.token.is_numeric())
                .unwrap_or(true);
            if needs_blank {
                let bbox = match out.last() {
                    Some(prev) if same_row(&prev.bbox, &entry.bbox, config.text_row_tolerance) => {
                        gap_between(&prev.bbox, &entry.bbox)
                    }
                    _ => BBox::new(
                        entry.bbox.x0 - width,
                        entry.bbox.y0,
                        entry.bbox.x0,
                        entry.bbox.y1,
                    )
                    .clamped(),
                };
                out.push(PlacedToken::blank(bbox));
                inserted += 1;
            }
        }
        out.push(entry);
    }

    debug!(inserted, "synthesized date unit blanks");
    TokenStream::new(out)
}
