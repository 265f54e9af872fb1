//! Counter extraction from the billing document's tables.
//!
//! The invoice lists each device as a block: a row announcing the serial
//! (`<SERIAL> N/S` in the description column) followed by rows carrying the
//! period totals. Only the description (cell 1) and quantity (cell 2) columns
//! are read.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{CounterMap, DeviceCounters, TableDocument};

/// Marker for the monochrome total row.
pub const MONO_MARKER: &str = "TOTAL MONOCROMO";

/// Marker for the color total row.
pub const COLOR_MARKER: &str = "TOTAL COLOR";

/// Largest count accepted from a quantity cell. Every integer up to here is
/// exact in an `f64`; anything larger is treated as unparseable.
pub const MAX_COUNT: u64 = 1 << 53;

const DESCRIPTION_CELL: usize = 1;
const QUANTITY_CELL: usize = 2;

fn serial_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([A-Z0-9]{8,})\s+N/S").expect("serial pattern is valid"))
}

#[derive(Clone, Copy)]
enum Counter {
    Mono,
    Color,
}

/// Scan every page, table and row in order and collect per-serial counters.
///
/// Rows before the first serial announcement are ignored. A later total for
/// the same serial overwrites the earlier one.
pub fn extract_counters(doc: &TableDocument) -> CounterMap {
    let mut counters = CounterMap::new();
    let mut current: Option<String> = None;

    for page in &doc.pages {
        for table in &page.tables {
            for row in table {
                if row.len() < 3 {
                    continue;
                }

                let desc = row[DESCRIPTION_CELL]
                    .as_deref()
                    .unwrap_or("")
                    .to_uppercase();

                if let Some(serial) = announced_serial(&desc) {
                    current = Some(serial);
                    continue;
                }

                let Some(serial) = current.as_deref() else {
                    continue;
                };

                let quantity = row[QUANTITY_CELL].as_deref();
                if desc.contains(MONO_MARKER) {
                    record(&mut counters, serial, Counter::Mono, parse_count(quantity));
                }
                if desc.contains(COLOR_MARKER) {
                    record(&mut counters, serial, Counter::Color, parse_count(quantity));
                }
            }
        }
    }

    log::debug!("extracted counters for {} device(s)", counters.len());
    counters
}

/// Serial captured from an announcement row, if `desc` (upper-cased) is one.
pub fn announced_serial(desc: &str) -> Option<String> {
    serial_re()
        .captures(desc)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn record(counters: &mut CounterMap, serial: &str, which: Counter, value: u64) {
    let entry = counters
        .entry(serial.to_string())
        .or_insert_with(|| DeviceCounters::new(serial));
    match which {
        Counter::Mono => entry.mono = value,
        Counter::Color => entry.color = value,
    }
}

/// Parse a locale-formatted count (`1.234,56` → 1234). Anything unparseable,
/// negative, non-finite or above [`MAX_COUNT`] counts as zero.
pub fn parse_count(cell: Option<&str>) -> u64 {
    let Some(raw) = cell else {
        return 0;
    };
    let normalized = raw.trim().replace('.', "").replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v <= MAX_COUNT as f64 => v.trunc() as u64,
        Ok(_) => {
            log::debug!("count out of range: {:?}", raw);
            0
        }
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Page, Row};

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| Some(c.to_string())).collect()
    }

    fn doc(rows: Vec<Row>) -> TableDocument {
        TableDocument {
            pages: vec![Page { tables: vec![rows] }],
        }
    }

    #[test]
    fn parse_count_locale() {
        assert_eq!(parse_count(Some("1.234")), 1234);
        assert_eq!(parse_count(Some("1.234,56")), 1234);
        assert_eq!(parse_count(Some(" 12 ")), 12);
        assert_eq!(parse_count(Some("0,99")), 0);
        assert_eq!(parse_count(Some("1.000.000")), 1_000_000);
    }

    #[test]
    fn parse_count_failures_are_zero() {
        assert_eq!(parse_count(None), 0);
        assert_eq!(parse_count(Some("")), 0);
        assert_eq!(parse_count(Some("n/a")), 0);
        assert_eq!(parse_count(Some("-5")), 0);
        assert_eq!(parse_count(Some("inf")), 0);
    }

    #[test]
    fn oversized_counts_are_zero() {
        assert_eq!(parse_count(Some("99.999.999.999.999.999.999")), 0);
        assert_eq!(parse_count(Some("9.007.199.254.740.992")), MAX_COUNT);
        assert_eq!(parse_count(Some("9.007.199.254.740.994")), 0);

        let d = doc(vec![
            row(&["", "ABC12345 N/S", ""]),
            row(&["", "TOTAL MONOCROMO", "99.999.999.999.999.999.999"]),
            row(&["", "TOTAL COLOR", "5"]),
        ]);
        let c = extract_counters(&d);
        assert_eq!(c["ABC12345"].mono, 0);
        assert_eq!(c["ABC12345"].color, 5);
    }

    #[test]
    fn announcement_requires_eight_chars_and_marker() {
        assert_eq!(announced_serial("EQUIPO ABC12345 N/S"), Some("ABC12345".into()));
        assert_eq!(announced_serial("ABC1234 N/S"), None);
        assert_eq!(announced_serial("ABC12345"), None);
    }

    #[test]
    fn basic_block() {
        let d = doc(vec![
            row(&["", "Printer X ABC12345 N/S", ""]),
            row(&["", "Total monocromo", "1.000"]),
            row(&["", "Total color", "200"]),
        ]);
        let c = extract_counters(&d);
        assert_eq!(c.len(), 1);
        assert_eq!(c["ABC12345"].mono, 1000);
        assert_eq!(c["ABC12345"].color, 200);
    }

    #[test]
    fn rows_before_first_announcement_ignored() {
        let d = doc(vec![
            row(&["", "TOTAL MONOCROMO", "999"]),
            row(&["", "ABC12345 N/S", ""]),
            row(&["", "TOTAL MONOCROMO", "5"]),
        ]);
        let c = extract_counters(&d);
        assert_eq!(c.len(), 1);
        assert_eq!(c["ABC12345"].mono, 5);
    }

    #[test]
    fn missing_color_row_keeps_zero() {
        let d = doc(vec![
            row(&["", "ABC12345 N/S", ""]),
            row(&["", "TOTAL MONOCROMO", "10"]),
        ]);
        let c = extract_counters(&d);
        assert_eq!(c["ABC12345"].color, 0);
    }

    #[test]
    fn later_total_overwrites() {
        let d = doc(vec![
            row(&["", "ABC12345 N/S", ""]),
            row(&["", "TOTAL MONOCROMO", "10"]),
            row(&["", "XYZ99999 N/S", ""]),
            row(&["", "TOTAL COLOR", "3"]),
            row(&["", "ABC12345 N/S", ""]),
            row(&["", "TOTAL MONOCROMO", "25"]),
        ]);
        let c = extract_counters(&d);
        assert_eq!(c["ABC12345"].mono, 25);
        let order: Vec<&str> = c.keys().map(|k| k.as_str()).collect();
        assert_eq!(order, vec!["ABC12345", "XYZ99999"]);
    }

    #[test]
    fn announcement_row_is_not_a_counter_row() {
        let d = doc(vec![row(&["", "ABC12345 N/S TOTAL MONOCROMO", "77"])]);
        let c = extract_counters(&d);
        assert!(c.is_empty());
    }

    #[test]
    fn short_and_null_rows_skipped() {
        let d = doc(vec![
            row(&["", "ABC12345 N/S", ""]),
            row(&["", "TOTAL MONOCROMO"]),
            vec![None, None, None],
            vec![None, Some("TOTAL COLOR".into()), None],
        ]);
        let c = extract_counters(&d);
        assert_eq!(c["ABC12345"].mono, 0);
        assert_eq!(c["ABC12345"].color, 0);
    }

    #[test]
    fn bad_cell_does_not_abort() {
        let d = doc(vec![
            row(&["", "ABC12345 N/S", ""]),
            row(&["", "TOTAL MONOCROMO", "###"]),
            row(&["", "TOTAL COLOR", "40"]),
        ]);
        let c = extract_counters(&d);
        assert_eq!(c["ABC12345"].mono, 0);
        assert_eq!(c["ABC12345"].color, 40);
    }

    #[test]
    fn current_serial_carries_across_pages() {
        let d = TableDocument {
            pages: vec![
                Page {
                    tables: vec![vec![row(&["", "ABC12345 N/S", ""])]],
                },
                Page {
                    tables: vec![vec![row(&["", "TOTAL COLOR", "8"])]],
                },
            ],
        };
        let c = extract_counters(&d);
        assert_eq!(c["ABC12345"].color, 8);
    }
}
