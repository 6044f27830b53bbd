//! The processed-file ledger: durable record of what has been ingested.
//!
//! The ledger maps each ingested file's path (relative to the input root) to
//! its content [`Fingerprint`]. It is what makes re-running the tool safe:
//! anything whose fingerprint appears anywhere in the ledger is skipped.
//!
//! # Design
//!
//! Lookups are **content-addressed**. The on-disk document is keyed by path
//! because that is what a human wants to read, but the skip decision only asks
//! "has this content been seen?". A runtime reverse index of fingerprints is
//! built at load time and only grows during a run, so moving or renaming a
//! file inside the input tree never causes it to be converted twice. A path
//! re-pointed at new content keeps its old fingerprint known until the next
//! load, when only the values still in the document count.
//!
//! ## Storage
//!
//! A pretty-printed JSON object, `{"alice/p1.jpg": "<sha256>", ...}`, keys in
//! sorted order. Saving writes a temporary sibling and renames it over the
//! old document, so a crash mid-write leaves the previous ledger intact.
//!
//! ## Corruption
//!
//! A ledger that cannot be read or parsed is treated as empty, with a
//! warning. The worst case is re-converting files that were already
//! converted, never aborting the run.

use crate::hash::Fingerprint;
use log::warn;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// In-memory ledger: relative input path → fingerprint.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    entries: BTreeMap<String, String>,
    /// Runtime reverse index of every fingerprint value. Never serialized.
    fingerprints: HashSet<String>,
}

impl Ledger {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the ledger document. Returns an empty ledger if the file doesn't
    /// exist, can't be read, or isn't a JSON object of strings.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Self::empty(),
            Err(e) => {
                warn!(
                    "Error reading ledger {}: {}. Starting fresh.",
                    path.display(),
                    e
                );
                return Self::empty();
            }
        };
        match serde_json::from_str::<BTreeMap<String, String>>(&content) {
            Ok(entries) => Self::from_entries(entries),
            Err(e) => {
                warn!(
                    "Error loading ledger {}: {}. Starting fresh.",
                    path.display(),
                    e
                );
                Self::empty()
            }
        }
    }

    fn from_entries(entries: BTreeMap<String, String>) -> Self {
        let fingerprints = entries.values().cloned().collect();
        Self {
            entries,
            fingerprints,
        }
    }

    /// Write the full ledger, replacing the existing document.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = temp_path(path);
        fs::write(&tmp, json)
            .and_then(|()| fs::rename(&tmp, path))
            .inspect_err(|_| {
                let _ = fs::remove_file(&tmp);
            })
    }

    /// True if this content has been ingested under any path.
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.fingerprints.contains(fingerprint.as_str())
    }

    /// Record an ingested file. The reverse index is append-only: a
    /// replaced entry's fingerprint stays known for the rest of the run.
    pub fn insert(&mut self, relative_path: impl Into<String>, fingerprint: &Fingerprint) {
        let value = fingerprint.as_str().to_string();
        self.fingerprints.insert(value.clone());
        self.entries.insert(relative_path.into(), value);
    }

    pub fn get(&self, relative_path: &str) -> Option<&str> {
        self.entries.get(relative_path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `processed_files.json` → `processed_files.json.tmp`, in the same directory
/// so the rename stays on one filesystem.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "ledger".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fp(s: &str) -> Fingerprint {
        Fingerprint::from_hex(s)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    #[test]
    fn empty_ledger_contains_nothing() {
        let l = Ledger::empty();
        assert!(l.is_empty());
        assert!(!l.contains(&fp("abc")));
    }

    #[test]
    fn contains_by_content_not_path() {
        let mut l = Ledger::empty();
        l.insert("alice/p1.jpg", &fp("hash1"));

        assert!(l.contains(&fp("hash1")));
        assert!(!l.contains(&fp("hash2")));
        assert_eq!(l.get("alice/p1.jpg"), Some("hash1"));
        assert_eq!(l.get("bob/p1.jpg"), None);
    }

    #[test]
    fn repointed_path_keeps_old_fingerprint_known() {
        let mut l = Ledger::empty();
        l.insert("alice/p1.jpg", &fp("old"));
        l.insert("alice/p1.jpg", &fp("new"));

        assert_eq!(l.len(), 1);
        assert_eq!(l.get("alice/p1.jpg"), Some("new"));
        assert!(l.contains(&fp("new")));
        assert!(l.contains(&fp("old")));
    }

    #[test]
    fn repointed_fingerprint_is_forgotten_after_reload() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("processed_files.json");
        let mut l = Ledger::empty();
        l.insert("alice/p1.jpg", &fp("old"));
        l.insert("alice/p1.jpg", &fp("new"));
        l.save(&path).unwrap();

        let loaded = Ledger::load(&path);
        assert!(loaded.contains(&fp("new")));
        assert!(!loaded.contains(&fp("old")));
    }

    #[test]
    fn shared_fingerprint_survives_repoint_of_one_path() {
        let mut l = Ledger::empty();
        l.insert("alice/p1.jpg", &fp("same"));
        l.insert("bob/copy.jpg", &fp("same"));
        l.insert("alice/p1.jpg", &fp("other"));

        assert!(l.contains(&fp("same")));
        assert!(l.contains(&fp("other")));
    }

    // =========================================================================
    // Load / save
    // =========================================================================

    #[test]
    fn load_missing_file_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let l = Ledger::load(&tmp.path().join("nonexistent.json"));
        assert!(l.is_empty());
    }

    #[test]
    fn load_existing_document() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("processed_files.json");
        fs::write(
            &path,
            r#"{"image1.jpg": "hash123", "image2.jpg": "hash456"}"#,
        )
        .unwrap();

        let l = Ledger::load(&path);
        assert_eq!(l.len(), 2);
        assert_eq!(l.get("image1.jpg"), Some("hash123"));
        assert!(l.contains(&fp("hash456")));
    }

    #[test]
    fn load_invalid_json_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("processed_files.json");
        fs::write(&path, "invalid json content").unwrap();
        assert!(Ledger::load(&path).is_empty());
    }

    #[test]
    fn load_wrong_shape_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("processed_files.json");
        fs::write(&path, r#"{"a.jpg": 42}"#).unwrap();
        assert!(Ledger::load(&path).is_empty());

        fs::write(&path, r#"["a.jpg", "b.jpg"]"#).unwrap();
        assert!(Ledger::load(&path).is_empty());
    }

    #[test]
    fn load_directory_in_place_of_file_returns_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("processed_files.json");
        fs::create_dir(&path).unwrap();
        assert!(Ledger::load(&path).is_empty());
    }

    #[test]
    fn save_writes_pretty_json_and_reloads() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("processed_files.json");
        let mut l = Ledger::empty();
        l.insert("bob/p2.jpg", &fp("h2"));
        l.insert("alice/p1.jpg", &fp("h1"));
        l.save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "{\n  \"alice/p1.jpg\": \"h1\",\n  \"bob/p2.jpg\": \"h2\"\n}"
        );

        let loaded = Ledger::load(&path);
        assert_eq!(loaded.len(), 2);
        assert!(loaded.contains(&fp("h1")));
        assert!(loaded.contains(&fp("h2")));
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("processed_files.json");
        Ledger::empty().save(&path).unwrap();

        let names: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("processed_files.json")]);
    }

    #[test]
    fn save_into_missing_directory_errors() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("processed_files.json");
        assert!(Ledger::empty().save(&path).is_err());
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let tmp = TempDir::new().unwrap();
        // A non-empty directory at the target makes the rename fail after
        // the temp file was fully written.
        let path = tmp.path().join("processed_files.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        assert!(Ledger::empty().save(&path).is_err());
        assert!(!tmp.path().join("processed_files.json.tmp").exists());
    }

    #[test]
    fn failed_temp_write_errors_without_creating_target() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("processed_files.json");
        // The temp path is taken by a directory, so writing it fails.
        fs::create_dir(tmp.path().join("processed_files.json.tmp")).unwrap();

        assert!(Ledger::empty().save(&path).is_err());
        assert!(!path.exists());
    }
}
