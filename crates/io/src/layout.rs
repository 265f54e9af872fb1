//! Column recovery for `pdftotext -layout` output.
//!
//! The layout mode keeps the visual column positions of a page as runs of
//! spaces. A *segment* is a run of text whose words are separated by single
//! spaces; two or more spaces end a segment. Lines carrying at least
//! [`MIN_TABLE_SEGMENTS`] segments are taken as table rows and their segment
//! spans are merged into column intervals. Every non-blank line of the page
//! is then laid onto those columns.

use std::sync::OnceLock;

use regex::Regex;

use meterbill_recon::model::{Page, Row, Table, TableDocument};

/// Lines with fewer segments than this do not shape the column grid.
pub const MIN_TABLE_SEGMENTS: usize = 3;

fn segment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\S+(?: \S+)*").expect("segment pattern is valid"))
}

/// A text run and its character span on the line, `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Split a line into segments. Spans count characters, not bytes.
pub fn segments(line: &str) -> Vec<Segment> {
    segment_re()
        .find_iter(line)
        .map(|m| {
            let start = line[..m.start()].chars().count();
            let text = m.as_str().to_string();
            Segment {
                start,
                end: start + text.chars().count(),
                text,
            }
        })
        .collect()
}

/// Merge segment spans of table-like lines into sorted, disjoint column intervals.
pub fn columns(lines: &[Vec<Segment>]) -> Vec<(usize, usize)> {
    let mut spans: Vec<(usize, usize)> = lines
        .iter()
        .filter(|segs| segs.len() >= MIN_TABLE_SEGMENTS)
        .flat_map(|segs| segs.iter().map(|s| (s.start, s.end)))
        .collect();
    spans.sort_unstable();

    let mut merged: Vec<(usize, usize)> = Vec::new();
    for (start, end) in spans {
        match merged.last_mut() {
            Some(last) if start < last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Column index for a segment starting at `start`: the column containing it,
/// else the last column starting before it, else the first column.
fn column_for(cols: &[(usize, usize)], start: usize) -> usize {
    if let Some(i) = cols.iter().position(|&(s, e)| start >= s && start < e) {
        return i;
    }
    cols.iter().rposition(|&(s, _)| s <= start).unwrap_or(0)
}

/// Lay one page of layout text onto a single table.
pub fn page_table(page: &str) -> Option<Table> {
    let lines: Vec<Vec<Segment>> = page
        .lines()
        .map(segments)
        .filter(|segs| !segs.is_empty())
        .collect();
    if lines.is_empty() {
        return None;
    }

    let cols = columns(&lines);
    let table: Table = lines
        .into_iter()
        .map(|segs| {
            if cols.is_empty() {
                return segs.into_iter().map(|s| Some(s.text)).collect();
            }
            let mut row: Row = vec![None; cols.len()];
            for seg in segs {
                let cell = &mut row[column_for(&cols, seg.start)];
                match cell {
                    Some(existing) => {
                        existing.push(' ');
                        existing.push_str(&seg.text);
                    }
                    None => *cell = Some(seg.text),
                }
            }
            row
        })
        .collect();
    Some(table)
}

/// Convert whole-document layout text into a table document, one table per
/// page. Pages are separated by form feeds; a blank page keeps its slot with
/// no tables.
pub fn tables_from_layout_text(text: &str) -> TableDocument {
    let mut raw_pages: Vec<&str> = text.split('\x0c').collect();
    // pdftotext terminates the last page with a form feed as well.
    if raw_pages.len() > 1 && raw_pages.last().is_some_and(|p| p.trim().is_empty()) {
        raw_pages.pop();
    }

    let pages = raw_pages
        .into_iter()
        .map(|p| Page {
            tables: page_table(p).into_iter().collect(),
        })
        .collect();
    TableDocument { pages }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INVOICE_PAGE: &str = "\
FACTURA 2024/031                         Hoja 1
Ref      Concepto                         Cantidad      Importe
         ABC12345 N/S
001      TOTAL MONOCROMO                  1.000         9,80
002      TOTAL COLOR                      200           23,80
";

    #[test]
    fn segments_split_on_double_space() {
        let segs = segments("Ref      Concepto largo   12");
        let texts: Vec<&str> = segs.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["Ref", "Concepto largo", "12"]);
        assert_eq!(segs[1].start, 9);
        assert_eq!(segs[1].end, 23);
    }

    #[test]
    fn spans_count_chars_not_bytes() {
        let segs = segments("Ubicación  X");
        assert_eq!(segs[1].start, 11);
    }

    #[test]
    fn invoice_page_columns() {
        let table = page_table(INVOICE_PAGE).unwrap();
        assert_eq!(table.len(), 5);

        // Announcement line lands in the description column.
        assert_eq!(table[2][1].as_deref(), Some("ABC12345 N/S"));
        assert_eq!(table[2][0], None);

        assert_eq!(table[3][1].as_deref(), Some("TOTAL MONOCROMO"));
        assert_eq!(table[3][2].as_deref(), Some("1.000"));
        assert_eq!(table[4][1].as_deref(), Some("TOTAL COLOR"));
        assert_eq!(table[4][2].as_deref(), Some("200"));
    }

    #[test]
    fn pages_split_on_form_feed() {
        let text = format!("{INVOICE_PAGE}\x0c\n\x0c{INVOICE_PAGE}\x0c");
        let doc = tables_from_layout_text(&text);
        assert_eq!(doc.pages.len(), 3);
        assert_eq!(doc.pages[0].tables.len(), 1);
        assert!(doc.pages[1].tables.is_empty());
        assert_eq!(doc.pages[2].tables.len(), 1);
    }

    #[test]
    fn page_without_table_lines_keeps_segments_in_order() {
        let table = page_table("Intro  text\n\nclosing").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0], vec![Some("Intro".to_string()), Some("text".to_string())]);
    }

    #[test]
    fn extractor_reads_recovered_tables() {
        let doc = tables_from_layout_text(INVOICE_PAGE);
        let counters = meterbill_recon::extract_counters(&doc);
        assert_eq!(counters["ABC12345"].mono, 1000);
        assert_eq!(counters["ABC12345"].color, 200);
    }
}
