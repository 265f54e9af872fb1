//! `meterbill-store` — durable history of reconciliation runs.
//!
//! One index file plus three artifact files per record. The in-memory
//! working set ([`RecordStore`]) is authoritative for the session; disk is
//! rewritten from it after every mutation.

pub mod disk;
pub mod duplicates;
pub mod error;
pub mod record;
pub mod store;

pub use disk::{Layout, LoadReport};
pub use duplicates::find_duplicates;
pub use error::StoreError;
pub use record::{Record, RecordId, RecordMeta};
pub use store::RecordStore;
