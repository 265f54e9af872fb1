//! `meterbill-recon` — printer counter reconciliation engine.
//!
//! Pure engine crate: receives decoded tables and sheets, returns costed,
//! reconciled rows. No filesystem or process I/O.

pub mod aggregate;
pub mod compare;
pub mod costing;
pub mod engine;
pub mod error;
pub mod extract;
pub mod inventory;
pub mod model;
pub mod summary;

pub use costing::{cost, CostBreakdown, Pricing, PRICE_COLOR, PRICE_MONO, TAX_RATE};
pub use engine::{reconcile, reconcile_sheets, run};
pub use error::ReconError;
pub use extract::extract_counters;
pub use inventory::{Inventory, InventoryRow};
pub use model::{
    CellValue, CounterMap, DeviceCounters, DeviceStatus, ReconciledDevice, ReconciliationResult,
    SheetGrid, TableDocument,
};
