//! Image codec backend trait and shared error type.
//!
//! The [`ImageBackend`] trait covers the two codec operations the ingest
//! pipeline needs: decode an arbitrary source into pixels plus whatever EXIF
//! block it carries, and encode an opaque RGB raster as JPEG with an optional
//! EXIF block attached.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests swap in a mock to
//! drive the orchestrator's failure paths without crafting broken files.

use super::params::Quality;
use image::{DynamicImage, RgbImage};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Unsupported format: {0}")]
    Unsupported(String),
}

/// A decoded source image.
#[derive(Debug)]
pub struct Decoded {
    pub image: DynamicImage,
    /// Raw TIFF-structured EXIF block, without any `Exif\0\0` prefix.
    pub exif: Option<Vec<u8>>,
}

/// Trait for image codec backends.
pub trait ImageBackend {
    /// Decode `bytes` (the full content of the file at `path`) into pixels
    /// and the embedded EXIF block, if any.
    ///
    /// `path` is only a format hint (HEIC/HEIF carry no signature the
    /// generic decoders recognize); the bytes are authoritative. An
    /// unreadable EXIF block is not a decode failure.
    fn decode(&self, path: &Path, bytes: &[u8]) -> Result<Decoded, BackendError>;

    /// Encode an opaque RGB raster as JPEG with optimized Huffman tables,
    /// attaching `exif` (a TIFF-structured block) as an APP1 segment when
    /// present.
    fn encode_jpeg(
        &self,
        image: &RgbImage,
        quality: Quality,
        exif: Option<&[u8]>,
    ) -> Result<Vec<u8>, BackendError>;
}
