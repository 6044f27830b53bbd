//! Shared test utilities for the photo-ingest test suite.
//!
//! Builds throwaway input trees and configs under a [`TempDir`], writes real
//! encoded images, and lists what a run produced.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let (tmp, config) = setup_workspace();
//! write_image(&config.input_dir.join("alice/p1.png"), ImageFormat::Png, 4, 3);
//! let summary = ingest_with_backend(&RustBackend::new(), &config, &fixed_clock).unwrap();
//! assert_eq!(output_names(&config).len(), 1);
//! ```

use crate::config::IngestConfig;
use chrono::{NaiveDate, NaiveDateTime};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// =========================================================================
// Workspace setup
// =========================================================================

/// Temp dir with an empty `input/` and a config pointing into it.
///
/// `output/` and the ledger are not created; the run is expected to do that.
pub fn setup_workspace() -> (TempDir, IngestConfig) {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("input")).unwrap();
    let config = IngestConfig {
        input_dir: tmp.path().join("input"),
        output_dir: tmp.path().join("output"),
        ledger_path: tmp.path().join("processed_files.json"),
        ..IngestConfig::default()
    };
    (tmp, config)
}

/// Write raw bytes, creating parent directories.
pub fn write_bytes(path: &Path, bytes: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

/// Write a real `width`×`height` image in `format`, creating parents.
///
/// Pixels vary with position so distinct sizes give distinct bytes.
/// Formats without alpha support get an RGB image.
pub fn write_image(path: &Path, format: ImageFormat, width: u32, height: u32) {
    let rgba = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 200, 255])
    });
    let img = match format {
        ImageFormat::Jpeg | ImageFormat::Bmp => {
            DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).to_rgb8())
        }
        _ => DynamicImage::ImageRgba8(rgba),
    };
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    img.save_with_format(path, format).unwrap();
}

// =========================================================================
// Inspection
// =========================================================================

/// Sorted filenames in the output directory (empty if it doesn't exist).
pub fn output_names(config: &IngestConfig) -> Vec<String> {
    let Ok(entries) = fs::read_dir(&config.output_dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// A clock frozen at 2024-03-19 14:25:01.
pub fn fixed_clock() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 19)
        .unwrap()
        .and_hms_opt(14, 25, 1)
        .unwrap()
}
