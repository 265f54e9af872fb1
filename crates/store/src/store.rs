use std::path::PathBuf;

use chrono::{DateTime, Local};

use meterbill_recon::aggregate::TaggedDevice;
use meterbill_recon::summary::compute_summary;
use meterbill_recon::ReconciliationResult;

use crate::disk::{self, Layout, LoadReport};
use crate::error::StoreError;
use crate::record::{Record, RecordId, RecordMeta};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The session's working set of records, mirrored to a data directory.
///
/// Mutations update memory first and then persist. When persisting fails the
/// error is returned but the in-memory change stands; memory stays the
/// authoritative copy for the rest of the session.
#[derive(Debug)]
pub struct RecordStore {
    layout: Layout,
    records: Vec<Record>,
}

impl RecordStore {
    /// Load every record under `root`. Problems met while loading are returned
    /// alongside the store rather than failing it.
    pub fn open(root: impl Into<PathBuf>) -> (Self, Vec<StoreError>) {
        let layout = Layout::new(root);
        let LoadReport { records, warnings } = disk::load_all(&layout);
        (Self { layout, records }, warnings)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Records in creation order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Rewrite everything on disk from the working set.
    pub fn save_all(&self) -> Result<(), StoreError> {
        disk::save_all(&self.layout, &self.records)
    }

    /// Store a new run stamped with the current local time.
    pub fn append_new(
        &mut self,
        label: &str,
        document: Vec<u8>,
        document_name: &str,
        inventory: Vec<u8>,
        inventory_name: &str,
        result: ReconciliationResult,
    ) -> Result<RecordId, StoreError> {
        self.append_new_at(
            Local::now(),
            label,
            document,
            document_name,
            inventory,
            inventory_name,
            result,
        )
    }

    /// [`append_new`](Self::append_new) with an explicit clock reading.
    #[allow(clippy::too_many_arguments)]
    pub fn append_new_at(
        &mut self,
        now: DateTime<Local>,
        label: &str,
        document: Vec<u8>,
        document_name: &str,
        inventory: Vec<u8>,
        inventory_name: &str,
        result: ReconciliationResult,
    ) -> Result<RecordId, StoreError> {
        let id = self.next_id(now.timestamp_millis());
        let summary = compute_summary(&result);

        let meta = RecordMeta {
            id,
            label: label.to_string(),
            created_at: now.format(TIMESTAMP_FORMAT).to_string(),
            document_name: document_name.to_string(),
            inventory_name: inventory_name.to_string(),
            device_count: summary.devices,
            total_pre_tax: summary.pre_tax_total,
            total_inclusive: summary.inclusive_total,
        };
        log::info!(
            "store: new record {} '{}' ({} device(s))",
            id,
            meta.label,
            meta.device_count
        );

        self.records.push(Record {
            meta,
            devices: Some(result),
            document: Some(document),
            inventory: Some(inventory),
        });
        self.save_all()?;
        Ok(id)
    }

    /// Millisecond timestamp, bumped past the highest id already held.
    fn next_id(&self, now_ms: i64) -> RecordId {
        match self.records.iter().map(|r| r.id().0).max() {
            Some(last) if now_ms <= last => RecordId(last + 1),
            _ => RecordId(now_ms),
        }
    }

    /// Change a record's label. Nothing else about the record changes.
    pub fn rename(&mut self, id: RecordId, label: &str) -> Result<(), StoreError> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(StoreError::NotFound(id.0))?;
        record.meta.label = label.to_string();
        disk::write_index(&self.layout, self.records.iter().map(|r| &r.meta))
    }

    /// Drop a record and its artifact files.
    pub fn delete(&mut self, id: RecordId) -> Result<Record, StoreError> {
        let pos = self
            .records
            .iter()
            .position(|r| r.id() == id)
            .ok_or(StoreError::NotFound(id.0))?;
        let removed = self.records.remove(pos);

        // The index is rewritten even when a file could not be removed.
        let files = disk::delete_files(&self.layout, id);
        let index = disk::write_index(&self.layout, self.records.iter().map(|r| &r.meta));
        files.and(index)?;
        Ok(removed)
    }

    /// Forget every record and remove all stored files.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.records.clear();
        disk::clear(&self.layout)
    }

    /// Concatenate the rows of the selected records (all when `ids` is
    /// `None`), each tagged with its record's label and timestamp. Records
    /// whose table failed to load contribute nothing. `None` when no
    /// record is selected.
    pub fn accumulate(&self, ids: Option<&[RecordId]>) -> Option<Vec<TaggedDevice>> {
        let selected: Vec<&Record> = self
            .records
            .iter()
            .filter(|r| ids.map_or(true, |ids| ids.contains(&r.id())))
            .collect();
        if selected.is_empty() {
            return None;
        }

        let rows = selected
            .into_iter()
            .flat_map(|r| {
                r.devices.iter().flatten().map(move |d| TaggedDevice {
                    document: r.meta.label.clone(),
                    date: r.meta.created_at.clone(),
                    device: d.clone(),
                })
            })
            .collect();
        Some(rows)
    }
}
