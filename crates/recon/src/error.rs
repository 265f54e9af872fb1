use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// An inventory sheet has the serial column but lacks a required companion column.
    MissingColumn { sheet: String, column: String },
    /// Table document JSON could not be decoded.
    DocumentParse(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingColumn { sheet, column } => {
                write!(f, "sheet '{sheet}': missing column '{column}'")
            }
            Self::DocumentParse(msg) => write!(f, "table document parse error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
