//! # photo-ingest
//!
//! Batch ingestion of author-attributed photos. Drop images into per-author
//! folders, run the tool, and get uniformly named JPEGs carrying attribution
//! metadata. Re-running is safe: content already ingested is skipped.
//!
//! # Pipeline
//!
//! Every run is a single sequential pass over the input tree:
//!
//! ```text
//! input-images/alice/IMG_0042.HEIC
//!   │ discover   (scan)        sorted walk, supported extensions only
//!   │ hash       (hash)        SHA-256 of the bytes
//!   │ dedup      (ledger)      fingerprint seen before? → skip
//!   │ attribute  (attribution) parent folder name → "alice"
//!   │ name       (naming)      alice_20240319_142501_IMG_0042_3fa9c2d1.jpg
//!   │ decode     (imaging)     any supported format → pixels + source EXIF
//!   │ normalize  (imaging)     alpha flattened onto white → RGB
//!   │ embed      (metadata)    Artist / ImageDescription / Copyright
//!   ▼ encode     (imaging)     JPEG, quality 95, optimized Huffman tables
//! output/alice_20240319_142501_IMG_0042_3fa9c2d1.jpg
//! ```
//!
//! The ledger (`processed_files.json`) is written back once, after the last
//! file.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`process`] | Batch orchestrator: per-file state machine, summary, dry-run plan |
//! | [`scan`] | Recursive discovery of supported images under the input root |
//! | [`hash`] | Streaming SHA-256 content fingerprints |
//! | [`ledger`] | Persistent relative-path → fingerprint map with a reverse index |
//! | [`attribution`] | Author resolution from the containing folder |
//! | [`naming`] | Output filename synthesis and sanitization |
//! | [`metadata`] | EXIF attribution with an explicit fallback chain |
//! | [`imaging`] | Decode, alpha flattening, EXIF blocks, JPEG encode |
//! | [`config`] | `photo-ingest.toml` loading, validation, merging |
//! | [`output`] | CLI output formatting for the run summary and check plan |
//! | [`logging`] | `env_logger` setup and startup capability warnings |
//!
//! # Design Decisions
//!
//! ## Content-Addressed Dedup
//!
//! The ledger is keyed by path for human readers, but the skip decision only
//! asks whether the content's fingerprint has been seen. Renaming or moving a
//! file inside the input tree therefore never produces a second output.
//!
//! ## Pure-Rust Codecs, Optional HEIC
//!
//! JPEG, PNG, BMP, TIFF and WebP go through the `image` crate with no system
//! dependencies. HEIC needs libheif, so it sits behind the `heic` feature;
//! without it HEIC files are still discovered and reported as per-file
//! failures rather than silently ignored.
//!
//! ## Never Overwrite
//!
//! Output names include a second-granularity timestamp and a hash prefix.
//! An existing file with the same name is reported as a collision, and
//! writes use `create_new`, so an earlier output is never replaced.
//!
//! ## Known Sharp Edge: Nested Folders
//!
//! The author is the *immediate* parent folder. `alice/2023/trip.jpg` is
//! attributed to `2023`, not `alice`. See [`attribution`].

pub mod attribution;
pub mod config;
pub mod hash;
pub mod imaging;
pub mod ledger;
pub mod logging;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod process;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
