//! CLI Exit Code Registry
//!
//! Single source of truth for `meterbill` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                               |
//! |------|-------------------------------------------------------|
//! | 0    | Success                                               |
//! | 1    | General error (unspecified)                           |
//! | 2    | Usage / input error (bad args, missing label or file) |
//! | 3    | I/O error (unreadable file, pdftotext missing)        |
//! | 4    | Parse error (bad document, workbook, or sheet schema) |
//! | 5    | Storage error (history could not be written)          |

use meterbill_io::IoError;
use meterbill_cli::session::SessionError;
use meterbill_store::StoreError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure (e.g. output encoding).
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, rejected user input.
pub const EXIT_USAGE: u8 = 2;

/// File could not be read or written, or an external tool is unavailable.
pub const EXIT_IO: u8 = 3;

/// Input bytes could not be decoded or violate the expected layout.
pub const EXIT_PARSE: u8 = 4;

/// Record store read/write failure.
pub const EXIT_STORE: u8 = 5;

/// Map a SessionError to its exit code.
pub fn session_exit_code(err: &SessionError) -> u8 {
    match err {
        SessionError::Input(_) => EXIT_USAGE,
        SessionError::Io(e) => io_exit_code(e),
        SessionError::Recon(_) => EXIT_PARSE,
        SessionError::Store(StoreError::NotFound(_)) => EXIT_USAGE,
        SessionError::Store(_) => EXIT_STORE,
    }
}

pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::PdfToolMissing | IoError::PdfTool(_) | IoError::Io(_) | IoError::Export(_) => {
            EXIT_IO
        }
        IoError::PdfNoText | IoError::Workbook(_) | IoError::Document(_) => EXIT_PARSE,
    }
}
