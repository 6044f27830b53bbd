//! Pure Rust codec backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, BMP, TIFF, WebP) | `image::ImageReader` with content sniffing, `DynamicImage::from_decoder` |
//! | Source EXIF (JPEG, PNG, WebP) | `image::ImageDecoder::exif_metadata` |
//! | Source EXIF (TIFF) | the file itself is the block |
//! | Decode (HEIC, HEIF) | `libheif-rs`, behind the `heic` feature ([`heic`](super::heic)) |
//! | Encode → JPEG | `jpeg_encoder::Encoder` with optimized Huffman tables |
//! | EXIF attach | `jpeg_encoder::Encoder::add_app_segment` (APP1) |

use super::backend::{BackendError, Decoded, ImageBackend};
use super::params::Quality;
use super::{exif, heic};
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader, RgbImage};
use jpeg_encoder::{ColorType, Encoder};
use log::{debug, warn};
use std::io::Cursor;
use std::path::Path;

/// Every extension the ingester picks up, lowercase.
///
/// HEIC/HEIF are always listed: without the `heic` feature they are still
/// discovered and then fail to decode one by one, which is reported rather
/// than silently ignored.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "heic", "heif", "jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp",
];

/// Case-insensitive membership in [`SUPPORTED_EXTENSIONS`].
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SUPPORTED_EXTENSIONS.iter().any(|s| e.eq_ignore_ascii_case(s)))
}

fn is_heif(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| heic::EXTENSIONS.iter().any(|s| e.eq_ignore_ascii_case(s)))
}

/// Pure Rust backend using the `image` crate ecosystem.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path, bytes: &[u8]) -> Result<Decoded, BackendError> {
        if is_heif(path) {
            return heic::decode(bytes);
        }
        let decode_error = |e: image::ImageError| {
            BackendError::Decode(format!("Failed to decode {}: {}", path.display(), e))
        };

        let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        let format = reader.format();
        let mut decoder = reader.into_decoder().map_err(decode_error)?;

        let exif = match decoder.exif_metadata() {
            Ok(block) => block.map(|b| exif::strip_header(&b).to_vec()),
            Err(e) => {
                debug!("Ignoring unreadable EXIF in {}: {}", path.display(), e);
                None
            }
        };
        let exif = exif.or_else(|| (format == Some(ImageFormat::Tiff)).then(|| bytes.to_vec()));

        let image = DynamicImage::from_decoder(decoder).map_err(decode_error)?;
        Ok(Decoded { image, exif })
    }

    fn encode_jpeg(
        &self,
        image: &RgbImage,
        quality: Quality,
        exif: Option<&[u8]>,
    ) -> Result<Vec<u8>, BackendError> {
        let (Ok(width), Ok(height)) = (
            u16::try_from(image.width()),
            u16::try_from(image.height()),
        ) else {
            return Err(BackendError::Encode(format!(
                "{}x{} exceeds the JPEG dimension limit of {}",
                image.width(),
                image.height(),
                u16::MAX
            )));
        };

        let mut buf = Vec::new();
        let mut encoder = Encoder::new(&mut buf, quality.value());
        encoder.set_optimized_huffman_tables(true);
        if let Some(block) = exif {
            if let Err(e) = encoder.add_app_segment(1, &exif::app1_payload(block)) {
                warn!("Dropping EXIF block from output: {}", e);
            }
        }
        encoder
            .encode(image.as_raw(), width, height, ColorType::Rgb)
            .map_err(|e| BackendError::Encode(format!("JPEG encode failed: {}", e)))?;
        Ok(buf)
    }
}
