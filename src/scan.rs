//! Input discovery.
//!
//! Walks the input root recursively and returns every file with a supported
//! image extension, in sorted order:
//!
//! ```text
//! input-images/
//! ├── alice/
//! │   ├── beach.HEIC        → alice/beach.HEIC
//! │   └── notes.txt         (ignored: not an image)
//! ├── bob/
//! │   └── trips/
//! │       └── rome.png      → bob/trips/rome.png
//! └── stray.jpg             → stray.jpg (no author, rejected later)
//! ```
//!
//! Discovery makes no decisions about authorship or duplicates; it only
//! lists candidates. Unreadable subdirectories are logged and skipped.

use crate::imaging::rust_backend;
use log::warn;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Input directory does not exist: {0}")]
    InputDirectoryMissing(PathBuf),
    #[error("Input path is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// One discovered input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Full path on disk.
    pub path: PathBuf,
    /// Path relative to the input root, components joined with `/`.
    /// This is the ledger key.
    pub relative: String,
}

impl SourceImage {
    /// Filename without its extension.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// List all supported images under `root`, sorted by path.
pub fn discover(root: &Path) -> Result<Vec<SourceImage>, ScanError> {
    if !root.exists() {
        return Err(ScanError::InputDirectoryMissing(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let mut images = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() || !rust_backend::is_supported(entry.path()) {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        images.push(SourceImage {
            path: entry.path().to_path_buf(),
            relative: relative_key(rel),
        });
    }
    Ok(images)
}

fn relative_key(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
