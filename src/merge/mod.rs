use tracing::debug;

use crate::core::model::TokenStream;

pub trait TokenMerger {
    fn merge(&self, table: &TokenStream, text: &TokenStream) -> TokenStream;
}

/// Table tokens first, then text tokens, re-ordered over the combined set.
///
/// Line grouping is first-match over the concatenated order, so a table box and
/// a text box from neighbouring rows can land in one line. That is accepted.
#[derive(Debug, Clone)]
pub struct SimpleTokenMerger {
    row_tolerance: i32,
}

impl SimpleTokenMerger {
    pub fn new(row_tolerance: i32) -> Self {
        Self { row_tolerance }
    }
}

impl Default for SimpleTokenMerger {
    fn default() -> Self {
        Self::new(5)
    }
}

impl TokenMerger for SimpleTokenMerger {
    fn merge(&self, table: &TokenStream, text: &TokenStream) -> TokenStream {
        let combined: TokenStream = table
            .entries()
            .iter()
            .chain(text.entries())
            .cloned()
            .collect();
        let merged = combined.into_reading_order(self.row_tolerance);
        debug!(
            table = table.len(),
            text = text.len(),
            merged = merged.len(),
            "merged token streams"
        );
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::BBox;
    use crate::core::model::PlacedToken;
    use pretty_assertions::assert_eq;

    fn stream(items: &[(&str, [i32; 4])]) -> TokenStream {
        items
            .iter()
            .map(|(text, b)| PlacedToken::new(*text, BBox::new(b[0], b[1], b[2], b[3])))
            .collect()
    }

    #[test]
    fn interleaves_sources_by_line_and_x() {
        let table = stream(&[("홍길동", [300, 100, 400, 120]), ("010", [300, 200, 400, 220])]);
        let text = stream(&[("성명", [100, 102, 200, 120]), ("이력서", [400, 10, 600, 40])]);
        let merged = SimpleTokenMerger::default().merge(&table, &text);
        assert_eq!(merged.texts(), vec!["이력서", "성명", "홍길동", "010"]);
        assert_eq!(merged.len(), table.len() + text.len());
    }

    #[test]
    fn merge_is_deterministic() {
        let table = stream(&[("a", [0, 10, 5, 20]), ("b", [10, 14, 15, 20])]);
        let text = stream(&[("c", [5, 9, 8, 20]), ("d", [0, 100, 5, 110])]);
        let merger = SimpleTokenMerger::default();
        let first = merger.merge(&table, &text);
        for _ in 0..5 {
            assert_eq!(merger.merge(&table, &text), first);
        }
    }

    #[test]
    fn table_tokens_win_ties() {
        let table = stream(&[("표", [100, 100, 150, 120])]);
        let text = stream(&[("글", [100, 100, 150, 120])]);
        let merged = SimpleTokenMerger::default().merge(&table, &text);
        assert_eq!(merged.texts(), vec!["표", "글"]);
    }

    #[test]
    fn concatenation_order_drives_line_collisions() {
        // The table box at y=104 registers first, so the text box at y=100 and the
        // one at y=109 both join its line even though they are 9 apart.
        let table = stream(&[("t", [500, 104, 520, 120])]);
        let text = stream(&[("late", [0, 109, 10, 120]), ("early", [50, 100, 60, 120])]);
        let merged = SimpleTokenMerger::default().merge(&table, &text);
        assert_eq!(merged.texts(), vec!["late", "early", "t"]);
    }
}
