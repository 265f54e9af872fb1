// File I/O: invoice documents in, inventory workbooks in, result tables out.

pub mod csv;
pub mod document;
pub mod error;
pub mod layout;
pub mod pdf;
pub mod xlsx;

pub use document::load_document;
pub use error::IoError;
pub use xlsx::read_workbook;

/// Column headers shared by the CSV and XLSX result exports.
pub const RESULT_HEADERS: [&str; 11] = [
    "Serial",
    "Org unit",
    "Location",
    "Mono",
    "Color",
    "Mono cost",
    "Color cost",
    "Pre-tax total",
    "Tax",
    "Inclusive total",
    "Status",
];
