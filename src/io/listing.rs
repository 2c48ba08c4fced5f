use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::Result;

/// Names of the regular files directly inside `dir`, sorted.
///
/// Names that are not valid UTF-8 cannot match any requested output and are skipped.
pub fn list_files(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => warn!("Skipping non UTF-8 file name {:?} in {:?}", name, dir),
        }
    }
    names.sort();
    debug!("Found {} files in {:?}", names.len(), dir);
    Ok(names)
}
