//! Byte-identical artifact detection.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::StoreError;

const BLOCK_SIZE: usize = 8192;

/// SHA-256 of a file, streamed in fixed-size blocks, as `sha256:<hex>`.
pub fn fingerprint(path: &Path) -> io::Result<String> {
    let mut reader = BufReader::with_capacity(BLOCK_SIZE, File::open(path)?);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(format!("sha256:{:x}", hasher.finalize()))
}

/// Group the regular files of `dir` by content fingerprint, keeping only
/// groups with more than one file. Unreadable files are logged and skipped.
pub fn find_duplicates(dir: &Path) -> Result<BTreeMap<String, Vec<String>>, StoreError> {
    let entries = fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(e) if e.path().is_file() => files.push(e.path()),
            Ok(_) => {}
            Err(e) => log::error!("duplicates: {}: {}", dir.display(), e),
        }
    }
    Ok(group_by_fingerprint(files))
}

fn group_by_fingerprint(files: Vec<PathBuf>) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for path in files {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        match fingerprint(&path) {
            Ok(fp) => groups.entry(fp).or_default().push(name),
            Err(e) => log::error!("duplicates: {}: {}", path.display(), e),
        }
    }

    groups.retain(|_, names| names.len() > 1);
    for names in groups.values_mut() {
        names.sort();
    }
    groups
}
