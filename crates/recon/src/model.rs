use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::costing::CostBreakdown;
use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Billing document (extractor input)
// ---------------------------------------------------------------------------

/// One table row. `None` is a cell the table extractor could not fill.
pub type Row = Vec<Option<String>>;

/// Rows top-to-bottom.
pub type Table = Vec<Row>;

/// Tables found on a single page, in extraction order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub tables: Vec<Table>,
}

/// A paginated tabular document (the billing invoice).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDocument {
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl TableDocument {
    /// Decode a document previously extracted by another tool.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, ReconError> {
        serde_json::from_slice(bytes).map_err(|e| ReconError::DocumentParse(e.to_string()))
    }

    pub fn row_count(&self) -> usize {
        self.pages
            .iter()
            .flat_map(|p| p.tables.iter())
            .map(|t| t.len())
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Inventory workbook (reconciler input)
// ---------------------------------------------------------------------------

/// A single workbook cell, reduced to what the reconciler needs.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Text rendering of the cell. Empty cells have none.
    ///
    /// Whole numbers render without a fractional part so that a serial typed
    /// as a number (`12345678`) compares equal to the invoice text.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s.clone()),
            CellValue::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(n.to_string())
                }
            }
            CellValue::Bool(b) => Some(if *b { "TRUE".into() } else { "FALSE".into() }),
        }
    }
}

/// A worksheet as a dense grid anchored at A1 (row 0 is spreadsheet row 1).
#[derive(Debug, Clone, Default)]
pub struct SheetGrid {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl SheetGrid {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self { name: name.into(), rows }
    }

    /// Cell at (row, col), 0-based. Out-of-range reads are empty.
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }
}

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

/// Raw usage meters for one device, read from the billing document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCounters {
    pub serial: String,
    pub mono: u64,
    pub color: u64,
}

impl DeviceCounters {
    pub fn new(serial: impl Into<String>) -> Self {
        Self {
            serial: serial.into(),
            mono: 0,
            color: 0,
        }
    }
}

/// Serial → counters, iterated in first-extraction order.
pub type CounterMap = IndexMap<String, DeviceCounters>;

// ---------------------------------------------------------------------------
// Reconciled output
// ---------------------------------------------------------------------------

/// Organizational unit assigned to devices billed but absent from inventory.
pub const NOT_IN_INVENTORY: &str = "NOT IN INVENTORY (invoice only)";

/// Location assigned to devices billed but absent from inventory.
pub const UNKNOWN_LOCATION: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceStatus {
    Matched,
    UnmatchedInInventory,
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Matched => write!(f, "matched"),
            Self::UnmatchedInInventory => write!(f, "unmatched-in-inventory"),
        }
    }
}

/// One row of the reconciliation result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledDevice {
    pub serial: String,
    pub org_unit: Option<String>,
    pub location: Option<String>,
    pub mono: u64,
    pub color: u64,
    #[serde(flatten)]
    pub cost: CostBreakdown,
    pub status: DeviceStatus,
}

impl ReconciledDevice {
    pub fn impressions(&self) -> u64 {
        self.mono.saturating_add(self.color)
    }

    pub fn is_matched(&self) -> bool {
        self.status == DeviceStatus::Matched
    }
}

/// Ordered result: matched rows in scan order, then unmatched rows.
pub type ReconciliationResult = Vec<ReconciledDevice>;
