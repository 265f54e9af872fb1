//! On-disk layout and whole-set load/save.
//!
//! ```text
//! <root>/history.json                 index: JSON array of RecordMeta
//! <root>/documents/<id>_data.json     result table
//! <root>/documents/<id>_invoice.pdf   source document bytes
//! <root>/documents/<id>_inventory.xlsx source workbook bytes
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use meterbill_recon::ReconciliationResult;

use crate::error::StoreError;
use crate::record::{Record, RecordId, RecordMeta};

pub const INDEX_FILE: &str = "history.json";
pub const DOCUMENTS_DIR: &str = "documents";

#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    pub fn documents_dir(&self) -> PathBuf {
        self.root.join(DOCUMENTS_DIR)
    }

    pub fn data_path(&self, id: RecordId) -> PathBuf {
        self.documents_dir().join(format!("{id}_data.json"))
    }

    pub fn document_path(&self, id: RecordId) -> PathBuf {
        self.documents_dir().join(format!("{id}_invoice.pdf"))
    }

    pub fn inventory_path(&self, id: RecordId) -> PathBuf {
        self.documents_dir().join(format!("{id}_inventory.xlsx"))
    }

    fn artifact_paths(&self, id: RecordId) -> [PathBuf; 3] {
        [
            self.data_path(id),
            self.document_path(id),
            self.inventory_path(id),
        ]
    }
}

/// Outcome of [`load_all`]: the records that loaded plus every problem met
/// on the way. Loading never fails as a whole.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub records: Vec<Record>,
    pub warnings: Vec<StoreError>,
}

impl LoadReport {
    fn warn(&mut self, err: StoreError) {
        log::warn!("store: {}", err);
        self.warnings.push(err);
    }
}

/// Read the index and every record it lists, in index order.
///
/// A missing index is an empty history. An unreadable or malformed index
/// yields an empty history and a warning. A record whose artifact files are
/// missing loads with those fields `None`; a record that fails to decode is
/// skipped with a warning.
pub fn load_all(layout: &Layout) -> LoadReport {
    let mut report = LoadReport::default();
    let index_path = layout.index_path();

    let bytes = match fs::read(&index_path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => return report,
        Err(e) => {
            report.warn(StoreError::io(&index_path, e));
            return report;
        }
    };

    let entries: Vec<serde_json::Value> = match serde_json::from_slice(&bytes) {
        Ok(v) => v,
        Err(e) => {
            report.warn(StoreError::Malformed {
                path: index_path,
                message: e.to_string(),
            });
            return report;
        }
    };

    for (i, entry) in entries.into_iter().enumerate() {
        let meta: RecordMeta = match serde_json::from_value(entry) {
            Ok(m) => m,
            Err(e) => {
                report.warn(StoreError::Malformed {
                    path: index_path.clone(),
                    message: format!("entry {i}: {e}"),
                });
                continue;
            }
        };
        match load_record(layout, meta) {
            Ok(record) => report.records.push(record),
            Err(e) => report.warn(e),
        }
    }

    log::debug!(
        "store: loaded {} record(s) from {}",
        report.records.len(),
        layout.root().display()
    );
    report
}

fn load_record(layout: &Layout, meta: RecordMeta) -> Result<Record, StoreError> {
    let data_path = layout.data_path(meta.id);
    let devices = match read_optional(&data_path)? {
        Some(bytes) => Some(
            serde_json::from_slice::<ReconciliationResult>(&bytes).map_err(|e| {
                StoreError::Malformed {
                    path: data_path.clone(),
                    message: e.to_string(),
                }
            })?,
        ),
        None => None,
    };
    let document = read_optional(&layout.document_path(meta.id))?;
    let inventory = read_optional(&layout.inventory_path(meta.id))?;

    Ok(Record {
        meta,
        devices,
        document,
        inventory,
    })
}

fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// Write every record's artifacts, then rewrite the whole index.
pub fn save_all(layout: &Layout, records: &[Record]) -> Result<(), StoreError> {
    let docs = layout.documents_dir();
    fs::create_dir_all(&docs).map_err(|e| StoreError::io(&docs, e))?;

    for r in records {
        let id = r.id();
        if let Some(devices) = &r.devices {
            let json = serde_json::to_vec_pretty(devices)
                .map_err(|e| StoreError::Encode(e.to_string()))?;
            write(&layout.data_path(id), &json)?;
        }
        if let Some(bytes) = &r.document {
            write(&layout.document_path(id), bytes)?;
        }
        if let Some(bytes) = &r.inventory {
            write(&layout.inventory_path(id), bytes)?;
        }
    }

    write_index(layout, records.iter().map(|r| &r.meta))
}

/// Rewrite the index with exactly these entries.
pub fn write_index<'a, I>(layout: &Layout, metas: I) -> Result<(), StoreError>
where
    I: IntoIterator<Item = &'a RecordMeta>,
{
    let metas: Vec<&RecordMeta> = metas.into_iter().collect();
    let json =
        serde_json::to_vec_pretty(&metas).map_err(|e| StoreError::Encode(e.to_string()))?;
    fs::create_dir_all(layout.root()).map_err(|e| StoreError::io(layout.root(), e))?;
    write(&layout.index_path(), &json)
}

fn write(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    fs::write(path, bytes).map_err(|e| StoreError::io(path, e))
}

/// Remove a record's artifact files. Absent files are not an error.
pub fn delete_files(layout: &Layout, id: RecordId) -> Result<(), StoreError> {
    let mut first_err = None;
    for path in layout.artifact_paths(id) {
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                log::warn!("could not remove {}: {}", path.display(), e);
                first_err.get_or_insert(StoreError::io(&path, e));
            }
        }
    }
    first_err.map_or(Ok(()), Err)
}

/// Remove every file in the documents directory and the index itself.
pub fn clear(layout: &Layout) -> Result<(), StoreError> {
    let docs = layout.documents_dir();
    match fs::read_dir(&docs) {
        Ok(entries) => {
            for entry in entries {
                let entry = entry.map_err(|e| StoreError::io(&docs, e))?;
                let path = entry.path();
                if path.is_file() {
                    fs::remove_file(&path).map_err(|e| StoreError::io(&path, e))?;
                }
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(StoreError::io(&docs, e)),
    }

    let index = layout.index_path();
    match fs::remove_file(&index) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StoreError::io(&index, e)),
    }
}
