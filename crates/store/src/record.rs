use std::fmt;

use serde::{Deserialize, Serialize};

use meterbill_recon::ReconciliationResult;

/// Time-derived, strictly increasing record identifier (milliseconds since epoch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(RecordId)
    }
}

/// Index entry: everything about a record except its table and source bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMeta {
    pub id: RecordId,
    pub label: String,
    /// Local time, `%Y-%m-%d %H:%M:%S`.
    pub created_at: String,
    pub document_name: String,
    pub inventory_name: String,
    pub device_count: usize,
    pub total_pre_tax: f64,
    pub total_inclusive: f64,
}

/// A persisted reconciliation run. Fields whose artifact file was missing
/// on load are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub meta: RecordMeta,
    pub devices: Option<ReconciliationResult>,
    pub document: Option<Vec<u8>>,
    pub inventory: Option<Vec<u8>>,
}

impl Record {
    pub fn id(&self) -> RecordId {
        self.meta.id
    }

    pub fn label(&self) -> &str {
        &self.meta.label
    }
}
