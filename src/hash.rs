//! Content fingerprints for deduplication.
//!
//! Every source file is identified by the SHA-256 of its bytes, not by its
//! name, location or mtime. The same photo dropped into a second author
//! folder has the same fingerprint.
//!
//! Files are streamed through the digest in [`CHUNK_SIZE`] blocks, so memory
//! use stays flat no matter how large the source is.

use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read size for streaming a file through the digest.
pub const CHUNK_SIZE: usize = 4096;

/// Number of hex characters used in output filenames.
pub const SHORT_LEN: usize = 8;

/// Lowercase hex SHA-256 of a file's full content (64 characters).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already-computed hex digest (e.g. a value read back from the ledger).
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First [`SHORT_LEN`] hex characters, or the whole string if shorter.
    pub fn short(&self) -> &str {
        self.0.get(..SHORT_LEN).unwrap_or(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// SHA-256 of a file's contents, streamed in [`CHUNK_SIZE`] reads.
pub fn hash_file(path: &Path) -> io::Result<Fingerprint> {
    let file = File::open(path)?;
    hash_reader(file)
}

/// SHA-256 of everything `reader` yields.
pub fn hash_reader(mut reader: impl Read) -> io::Result<Fingerprint> {
    let mut hasher = Sha256::new();
    let mut buf = [0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(Fingerprint(format!("{:x}", hasher.finalize())))
}
