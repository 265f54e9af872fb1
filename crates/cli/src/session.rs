//! Application state for one interactive session.
//!
//! All state lives in [`AppState`], created once from the data directory and
//! changed only through [`AppState::apply`]. View changes are decided by the
//! pure [`next_view`] function so front ends never re-derive them.

use std::fmt;
use std::path::PathBuf;

use meterbill_io::IoError;
use meterbill_recon::{Pricing, ReconError};
use meterbill_store::{RecordId, RecordStore, StoreError};

use crate::pipeline::reconcile_bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Upload form for a new run.
    #[default]
    New,
    /// One stored record.
    Record,
    /// Every stored record aggregated.
    Accumulated,
    /// Two records side by side.
    Compare,
}

/// A document + inventory pair submitted for a new run.
#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub label: String,
    pub document: Vec<u8>,
    pub document_name: String,
    pub inventory: Vec<u8>,
    pub inventory_name: String,
}

impl Submission {
    fn validate(&self) -> Result<(), SessionError> {
        if self.label.trim().is_empty() {
            return Err(SessionError::Input("a label is required".into()));
        }
        if self.document.is_empty() {
            return Err(SessionError::Input("no billing document selected".into()));
        }
        if self.inventory.is_empty() {
            return Err(SessionError::Input("no inventory workbook selected".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub enum Event {
    ShowNew,
    ShowRecord(RecordId),
    ShowAccumulated,
    ShowCompare,
    Submit(Submission),
    Rename { id: RecordId, label: String },
    Delete(RecordId),
    ClearHistory,
}

#[derive(Debug)]
pub enum SessionError {
    /// User input rejected before anything ran.
    Input(String),
    Io(IoError),
    Recon(ReconError),
    Store(StoreError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(msg) => write!(f, "{msg}"),
            Self::Io(e) => write!(f, "{e}"),
            Self::Recon(e) => write!(f, "{e}"),
            Self::Store(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Input(_) => None,
            Self::Io(e) => Some(e),
            Self::Recon(e) => Some(e),
            Self::Store(e) => Some(e),
        }
    }
}

impl From<IoError> for SessionError {
    fn from(e: IoError) -> Self {
        Self::Io(e)
    }
}

impl From<ReconError> for SessionError {
    fn from(e: ReconError) -> Self {
        Self::Recon(e)
    }
}

impl From<StoreError> for SessionError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// View after `event`, given the number of stored records once the event's
/// own effect on the history has been applied.
///
/// `Accumulated` needs at least one record and `Compare` at least two;
/// otherwise the current view is kept. Removing records out from under an
/// aggregate view falls back to `New`.
pub fn next_view(current: ViewMode, event: &Event, history_len: usize) -> ViewMode {
    match event {
        Event::ShowNew | Event::ClearHistory => ViewMode::New,
        Event::ShowRecord(_) | Event::Submit(_) => ViewMode::Record,
        Event::ShowAccumulated if history_len >= 1 => ViewMode::Accumulated,
        Event::ShowCompare if history_len >= 2 => ViewMode::Compare,
        Event::ShowAccumulated | Event::ShowCompare | Event::Rename { .. } => current,
        Event::Delete(_) => match current {
            ViewMode::Accumulated if history_len == 0 => ViewMode::New,
            ViewMode::Compare if history_len < 2 => ViewMode::New,
            other => other,
        },
    }
}

#[derive(Debug)]
pub struct AppState {
    pub store: RecordStore,
    pub view: ViewMode,
    pub selected: Option<RecordId>,
    pub pricing: Pricing,
}

impl AppState {
    /// Read the store under `data_dir`. Load warnings are returned for the
    /// caller to surface; they never prevent the session from starting.
    pub fn open(data_dir: impl Into<PathBuf>, pricing: Pricing) -> (Self, Vec<StoreError>) {
        let (store, warnings) = RecordStore::open(data_dir);
        let state = Self {
            store,
            view: ViewMode::New,
            selected: None,
            pricing,
        };
        (state, warnings)
    }

    /// Apply one event.
    ///
    /// Rejected input and unknown ids leave view and selection unchanged. A
    /// delete or clear whose files could not be removed still takes effect
    /// in memory before the storage error is returned.
    pub fn apply(&mut self, event: Event) -> Result<(), SessionError> {
        match &event {
            Event::ShowRecord(id) => {
                if self.store.get(*id).is_none() {
                    return Err(StoreError::NotFound(id.0).into());
                }
                self.selected = Some(*id);
            }
            Event::Submit(sub) => {
                sub.validate()?;
                let result = reconcile_bytes(&sub.document, &sub.inventory, &self.pricing)?;
                let id = self.store.append_new(
                    sub.label.trim(),
                    sub.document.clone(),
                    &sub.document_name,
                    sub.inventory.clone(),
                    &sub.inventory_name,
                    result,
                )?;
                self.selected = Some(id);
            }
            Event::Rename { id, label } => {
                if label.trim().is_empty() {
                    return Err(SessionError::Input("a label is required".into()));
                }
                self.store.rename(*id, label.trim())?;
            }
            Event::Delete(id) => {
                let deleted = self.store.delete(*id);
                if self.selected == Some(*id) {
                    self.selected = None;
                    if self.view == ViewMode::Record {
                        self.view = ViewMode::New;
                    }
                }
                deleted?;
            }
            Event::ClearHistory => {
                let cleared = self.store.clear();
                self.selected = None;
                self.view = ViewMode::New;
                cleared?;
            }
            Event::ShowNew | Event::ShowAccumulated | Event::ShowCompare => {}
        }

        self.view = next_view(self.view, &event, self.store.len());
        Ok(())
    }
}
