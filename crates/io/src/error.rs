use std::fmt;

use meterbill_recon::ReconError;

/// Failures while decoding input bytes or encoding exports.
#[derive(Debug)]
pub enum IoError {
    /// `pdftotext` is not on PATH.
    PdfToolMissing,
    /// `pdftotext` ran but failed.
    PdfTool(String),
    /// The PDF produced no text (scanned / image-only).
    PdfNoText,
    /// Workbook bytes could not be opened or a sheet could not be read.
    Workbook(String),
    /// Table document JSON did not match the expected shape.
    Document(ReconError),
    /// CSV/XLSX export failure.
    Export(String),
    Io(std::io::Error),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoError::PdfToolMissing => write!(f, "pdftotext not installed (poppler-utils)"),
            IoError::PdfTool(msg) => write!(f, "pdftotext failed: {msg}"),
            IoError::PdfNoText => {
                write!(f, "PDF appears scanned/image-only: text extraction failed")
            }
            IoError::Workbook(msg) => write!(f, "workbook error: {msg}"),
            IoError::Document(e) => write!(f, "{e}"),
            IoError::Export(msg) => write!(f, "export error: {msg}"),
            IoError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IoError::Document(e) => Some(e),
            IoError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Io(e)
    }
}

impl From<ReconError> for IoError {
    fn from(e: ReconError) -> Self {
        IoError::Document(e)
    }
}
