use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum StoreError {
    /// Filesystem failure on a specific path.
    Io { path: PathBuf, source: std::io::Error },
    /// A stored JSON file could not be decoded.
    Malformed { path: PathBuf, message: String },
    /// JSON encoding failed while saving.
    Encode(String),
    /// No record with this id in the working set.
    NotFound(i64),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            Self::Malformed { path, message } => {
                write!(f, "{}: malformed JSON: {}", path.display(), message)
            }
            Self::Encode(msg) => write!(f, "failed to encode JSON: {msg}"),
            Self::NotFound(id) => write!(f, "no record with id {id}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
