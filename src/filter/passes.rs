//! Ordered rewrite passes that turn a canonical stream into an editable template.
//!
//! Each pass takes a stream and returns a new one so its effect can be checked
//! in isolation. [`crate::filter::TokenFilter`] applies them in declaration order.

use std::collections::HashSet;

use crate::config::{BlankMergeScope, PipelineConfig};
use crate::core::geometry::BBox;
use crate::core::model::{PlacedToken, TokenStream};
use crate::extract::synthesis::{is_date_unit, same_row, seal_slot_box, COLON, SEAL};

/// Indices of purely numeric tokens on lines that also hold a 년/월/일 token.
pub fn date_line_digits(stream: &TokenStream, row_tolerance: i32) -> HashSet<usize> {
    let entries = stream.entries();
    stream
        .line_groups(row_tolerance)
        .lines()
        .into_iter()
        .filter(|line| line.iter().any(|&idx| is_date_unit(&entries[idx].token)))
        .flat_map(|line| line.into_iter())
        .filter(|&idx| entries[idx].token.is_numeric())
        .collect()
}

/// Blanks date digits and in-table tokens outside the allowed vocabulary.
///
/// Free text outside every table region is kept verbatim.
pub fn mask_tokens(
    stream: &TokenStream,
    blank_indices: &HashSet<usize>,
    table_regions: &[BBox],
    allowed: &HashSet<String>,
) -> TokenStream {
    stream
        .entries()
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            if entry.token.is_blank() || blank_indices.contains(&idx) {
                return PlacedToken::blank(entry.bbox);
            }
            let in_table = table_regions
                .iter()
                .any(|region| region.intersects(&entry.bbox));
            let permitted = entry
                .token
                .as_text()
                .map(|text| allowed.contains(text))
                .unwrap_or(false);
            if in_table && !permitted {
                PlacedToken::blank(entry.bbox)
            } else {
                entry.clone()
            }
        })
        .collect()
}

/// Folds runs of neighbouring blanks on one row into a single union-box blank.
///
/// A run continues while the next token is a blank on the run's row and its
/// left edge is at most `blank_merge_max_gap` past the growing union.
pub fn merge_inline_blanks(stream: &TokenStream, config: &PipelineConfig) -> TokenStream {
    let entries = stream.entries();
    let row_tol = config.blank_merge_row_tolerance;
    let date_rows: Vec<i32> = entries
        .iter()
        .filter(|entry| is_date_unit(&entry.token))
        .map(|entry| entry.bbox.y0)
        .collect();
    let in_scope = |bbox: &BBox| match config.blank_merge_scope {
        BlankMergeScope::AllLines => true,
        BlankMergeScope::DateLines => date_rows.iter().any(|y| (bbox.y0 - y).abs() <= row_tol),
    };

    let mut out = Vec::with_capacity(entries.len());
    let mut i = 0;
    while i < entries.len() {
        let entry = &entries[i];
        if !(entry.token.is_blank() && in_scope(&entry.bbox)) {
            out.push(entry.clone());
            i += 1;
            continue;
        }

        let mut merged = entry.bbox;
        let mut j = i + 1;
        while let Some(next) = entries.get(j) {
            let joins = next.token.is_blank()
                && same_row(&next.bbox, &entry.bbox, row_tol)
                && next.bbox.x0 - merged.x1 <= config.blank_merge_max_gap;
            if !joins {
                break;
            }
            merged = merged.union(&next.bbox);
            j += 1;
        }
        out.push(PlacedToken::blank(merged));
        i = j;
    }
    TokenStream::new(out)
}

/// Reduces every `:` … `(인)` span to `:`, one blank, `(인)`.
///
/// The blank covers the collapsed tokens with its right edge clipped to the
/// seal. A seal directly after the colon gets a gap blank inserted instead.
pub fn collapse_seal_spans(stream: &TokenStream, config: &PipelineConfig) -> TokenStream {
    let entries = stream.entries();
    let mut out = Vec::with_capacity(entries.len());
    let mut i = 0;

    while i < entries.len() {
        let entry = &entries[i];
        let seal_idx = entry
            .token
            .is(COLON)
            .then(|| (i + 1..entries.len()).find(|&j| entries[j].token.is(SEAL)))
            .flatten();

        let Some(j) = seal_idx else {
            out.push(entry.clone());
            i += 1;
            continue;
        };

        let seal = &entries[j];
        let blank_box = if j == i + 1 {
            seal_slot_box(&entry.bbox, &seal.bbox, config)
        } else {
            let union = entries[i + 2..j]
                .iter()
                .fold(entries[i + 1].bbox, |acc, e| acc.union(&e.bbox));
            let x1 = seal.bbox.x0;
            BBox::new(union.x0.min(x1), union.y0, x1, union.y1)
        };
        out.push(entry.clone());
        out.push(PlacedToken::blank(blank_box));
        out.push(seal.clone());
        i = j + 1;
    }
    TokenStream::new(out)
}
