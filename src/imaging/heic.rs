//! Optional HEIC/HEIF decoding through libheif.
//!
//! Compiled in with the `heic` cargo feature. Without it the extensions are
//! still discovered, but each file fails to decode with
//! [`BackendError::Unsupported`] and the batch carries on.
//!
//! The EXIF block comes from the primary image's `Exif` metadata item, which
//! starts with a 4-byte big-endian offset to the TIFF header.

use super::backend::{BackendError, Decoded};
#[cfg(feature = "heic")]
use image::DynamicImage;

/// Whether HEIC/HEIF decoding was compiled into this binary.
pub const AVAILABLE: bool = cfg!(feature = "heic");

/// Extensions routed to this decoder.
pub const EXTENSIONS: &[&str] = &["heic", "heif"];

#[cfg(feature = "heic")]
pub fn decode(bytes: &[u8]) -> Result<Decoded, BackendError> {
    use libheif_rs::{ColorSpace, HeifContext, RgbChroma};

    let heic_error = |msg: String| BackendError::Decode(msg);

    let ctx = HeifContext::read_from_bytes(bytes)
        .map_err(|e| heic_error(format!("Failed to read HEIC: {e}")))?;
    let handle = ctx
        .primary_image_handle()
        .map_err(|e| heic_error(format!("Failed to get HEIC handle: {e}")))?;

    let exif = exif_block(&handle);
    let has_alpha = handle.has_alpha_channel();
    let (chroma, channels) = if has_alpha {
        (RgbChroma::Rgba, 4)
    } else {
        (RgbChroma::Rgb, 3)
    };
    let decoded = handle
        .decode(ColorSpace::Rgb(chroma), None)
        .map_err(|e| heic_error(format!("Failed to decode HEIC: {e}")))?;

    let plane = decoded
        .planes()
        .interleaved
        .ok_or_else(|| heic_error("HEIC image has no interleaved plane".into()))?;
    let (width, height) = (plane.width, plane.height);

    // Rows may be padded: copy `width * channels` bytes out of each stride.
    let row_len = width as usize * channels;
    let mut pixels = Vec::with_capacity(row_len * height as usize);
    for y in 0..height as usize {
        let start = y * plane.stride;
        let row = plane
            .data
            .get(start..start + row_len)
            .ok_or_else(|| heic_error("HEIC plane shorter than its dimensions".into()))?;
        pixels.extend_from_slice(row);
    }

    let image = if has_alpha {
        image::RgbaImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgba8)
    } else {
        image::RgbImage::from_raw(width, height, pixels).map(DynamicImage::ImageRgb8)
    };
    let image =
        image.ok_or_else(|| heic_error("Failed to build image from HEIC data".into()))?;
    Ok(Decoded { image, exif })
}

#[cfg(feature = "heic")]
fn exif_block(handle: &libheif_rs::ImageHandle) -> Option<Vec<u8>> {
    let mut ids = [0; 1];
    if handle.metadata_block_ids(&mut ids, b"Exif") == 0 {
        return None;
    }
    let item = handle.metadata(ids[0]).ok()?;
    let skip: [u8; 4] = item.get(..4)?.try_into().ok()?;
    let start = 4usize.checked_add(u32::from_be_bytes(skip) as usize)?;
    item.get(start..).map(<[u8]>::to_vec)
}

#[cfg(not(feature = "heic"))]
pub fn decode(_bytes: &[u8]) -> Result<Decoded, BackendError> {
    Err(BackendError::Unsupported(
        "HEIC/HEIF support not compiled in (enable the `heic` feature)".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "heic"))]
    #[test]
    fn decode_without_plugin_is_unsupported() {
        assert!(!AVAILABLE);
        assert!(matches!(decode(b"...."), Err(BackendError::Unsupported(_))));
    }

    #[cfg(feature = "heic")]
    #[test]
    fn decode_garbage_is_a_decode_error() {
        assert!(matches!(
            decode(b"not a heic file"),
            Err(BackendError::Decode(_))
        ));
    }
}
