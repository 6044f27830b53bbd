//! Attribution metadata for output JPEGs.
//!
//! Every converted image carries three synthesized EXIF IFD0 tags on top of
//! the source's descriptive IFD0 tags and its Exif and GPS directories
//! (capture date, exposure, location):
//!
//! | Tag | Value |
//! |---|---|
//! | Artist (`0x013B`) | `{author}` |
//! | ImageDescription (`0x010E`) | `Author: {author}` |
//! | Copyright (`0x8298`) | `Copyright {year} {author}` |
//!
//! Synthesized values replace source values of the same tag.
//!
//! ## Fallback chain
//!
//! Metadata never blocks a conversion. [`embed`] reports which stage
//! succeeded through [`EmbeddedMetadata`]:
//!
//! 1. **Full**: source tags + attribution serialized fine.
//! 2. **Existing**: attribution could not be written (e.g. the block would
//!    exceed one APP1 segment); only the source tags are carried.
//! 3. **Omitted**: nothing usable; the JPEG is written without EXIF.

use crate::imaging::exif::{ARTIST, COPYRIGHT, ExifBlock, ExifError, IMAGE_DESCRIPTION};
use log::{debug, warn};

/// Outcome of metadata synthesis for one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddedMetadata {
    /// Source tags plus attribution.
    Full(Vec<u8>),
    /// Source tags only; attribution failed.
    Existing(Vec<u8>),
    /// No EXIF block is written.
    Omitted,
}

impl EmbeddedMetadata {
    /// The TIFF block to attach, if any.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Full(b) | Self::Existing(b) => Some(b),
            Self::Omitted => None,
        }
    }

    /// Short label used in logs and the summary.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Full(_) => "full",
            Self::Existing(_) => "existing only",
            Self::Omitted => "omitted",
        }
    }
}

/// Build the output EXIF block.
///
/// `existing` is the raw TIFF block the decoder found in the source file, if
/// any. A malformed source block is treated as absent.
pub fn embed(existing: Option<&[u8]>, author: &str, year: i32) -> EmbeddedMetadata {
    let source = existing
        .and_then(|raw| match ExifBlock::parse(raw) {
            Ok(block) => Some(block),
            Err(e) => {
                debug!("Ignoring unreadable source EXIF: {}", e);
                None
            }
        })
        .unwrap_or_default();

    match with_attribution(source.clone(), author, year).and_then(|b| b.to_bytes()) {
        Ok(bytes) => return EmbeddedMetadata::Full(bytes),
        Err(e) => warn!("Could not add attribution metadata for {}: {}", author, e),
    }

    if source.is_empty() {
        return EmbeddedMetadata::Omitted;
    }
    match source.to_bytes() {
        Ok(bytes) => EmbeddedMetadata::Existing(bytes),
        Err(e) => {
            warn!("Could not carry source metadata: {}", e);
            EmbeddedMetadata::Omitted
        }
    }
}

/// Copyright line as written into the Copyright tag.
pub fn copyright_line(author: &str, year: i32) -> String {
    format!("Copyright {year} {author}")
}

/// Description line as written into the ImageDescription tag.
pub fn description_line(author: &str) -> String {
    format!("Author: {author}")
}

fn with_attribution(mut block: ExifBlock, author: &str, year: i32) -> Result<ExifBlock, ExifError> {
    block.set_ascii(ARTIST, author)?;
    block.set_ascii(IMAGE_DESCRIPTION, &description_line(author))?;
    block.set_ascii(COPYRIGHT, &copyright_line(author, year))?;
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::exif::{DATE_TIME_ORIGINAL, Ifd};

    const MAKE: u16 = 0x010F;

    fn parsed(meta: &EmbeddedMetadata) -> ExifBlock {
        ExifBlock::parse(meta.bytes().expect("block present")).unwrap()
    }

    fn source_block(tags: &[(u16, &str)]) -> Vec<u8> {
        let mut b = ExifBlock::new();
        for (tag, value) in tags {
            b.set_ascii(*tag, value).unwrap();
        }
        b.to_bytes().unwrap()
    }

    // =========================================================================
    // Full attribution
    // =========================================================================

    #[test]
    fn no_source_gives_attribution_only() {
        let meta = embed(None, "alice", 2024);
        assert!(matches!(meta, EmbeddedMetadata::Full(_)));

        let block = parsed(&meta);
        assert_eq!(block.len(), 3);
        assert_eq!(block.ascii(ARTIST).as_deref(), Some("alice"));
        assert_eq!(
            block.ascii(IMAGE_DESCRIPTION).as_deref(),
            Some("Author: alice")
        );
        assert_eq!(
            block.ascii(COPYRIGHT).as_deref(),
            Some("Copyright 2024 alice")
        );
    }

    #[test]
    fn source_tags_are_carried() {
        let src = source_block(&[(MAKE, "Canon")]);
        let block = parsed(&embed(Some(&src), "bob", 2023));
        assert_eq!(block.ascii(MAKE).as_deref(), Some("Canon"));
        assert_eq!(block.ascii(ARTIST).as_deref(), Some("bob"));
    }

    #[test]
    fn attribution_overrides_source_values() {
        let src = source_block(&[(ARTIST, "someone else"), (COPYRIGHT, "old")]);
        let block = parsed(&embed(Some(&src), "carol", 2022));
        assert_eq!(block.ascii(ARTIST).as_deref(), Some("carol"));
        assert_eq!(
            block.ascii(COPYRIGHT).as_deref(),
            Some("Copyright 2022 carol")
        );
    }

    #[test]
    fn malformed_source_is_ignored() {
        let meta = embed(Some(b"garbage"), "dave", 2024);
        assert!(matches!(meta, EmbeddedMetadata::Full(_)));
        assert_eq!(parsed(&meta).len(), 3);
    }

    #[test]
    fn unicode_author_round_trips() {
        let block = parsed(&embed(None, "Zoë Ångström", 2024));
        assert_eq!(block.ascii(ARTIST).as_deref(), Some("Zoë Ångström"));
    }

    // =========================================================================
    // Fallbacks
    // =========================================================================

    #[test]
    fn oversized_author_falls_back_to_existing() {
        let src = source_block(&[(MAKE, "Nikon")]);
        let huge = "x".repeat(40_000);
        let meta = embed(Some(&src), &huge, 2024);

        assert!(matches!(meta, EmbeddedMetadata::Existing(_)));
        let block = parsed(&meta);
        assert_eq!(block.ascii(MAKE).as_deref(), Some("Nikon"));
        assert!(block.ascii(ARTIST).is_none());
    }

    #[test]
    fn oversized_author_without_source_is_omitted() {
        let huge = "x".repeat(40_000);
        let meta = embed(None, &huge, 2024);
        assert_eq!(meta, EmbeddedMetadata::Omitted);
        assert!(meta.bytes().is_none());
    }

    #[test]
    fn labels() {
        assert_eq!(EmbeddedMetadata::Full(vec![]).label(), "full");
        assert_eq!(EmbeddedMetadata::Existing(vec![]).label(), "existing only");
        assert_eq!(EmbeddedMetadata::Omitted.label(), "omitted");
    }

    // =========================================================================
    // Capture metadata
    // =========================================================================

    #[test]
    fn capture_date_and_gps_survive_attribution() {
        let mut src = ExifBlock::new();
        src.set_ascii(MAKE, "Fuji").unwrap();
        src.set_ascii_in(Ifd::Exif, DATE_TIME_ORIGINAL, "2021:05:06 07:08:09")
            .unwrap();
        src.set_ascii_in(Ifd::Gps, 0x0001, "S").unwrap();

        let block = parsed(&embed(Some(&src.to_bytes().unwrap()), "erin", 2024));
        assert_eq!(block.ascii(ARTIST).as_deref(), Some("erin"));
        assert_eq!(block.ascii(MAKE).as_deref(), Some("Fuji"));
        assert_eq!(
            block.ascii_in(Ifd::Exif, DATE_TIME_ORIGINAL).as_deref(),
            Some("2021:05:06 07:08:09")
        );
        assert_eq!(block.ascii_in(Ifd::Gps, 0x0001).as_deref(), Some("S"));
        assert_eq!(block.len(), 6);
    }

    #[test]
    fn capture_date_is_kept_when_attribution_falls_back() {
        let mut src = ExifBlock::new();
        src.set_ascii_in(Ifd::Exif, DATE_TIME_ORIGINAL, "2021:05:06 07:08:09")
            .unwrap();
        let huge = "x".repeat(40_000);

        let meta = embed(Some(&src.to_bytes().unwrap()), &huge, 2024);
        assert!(matches!(meta, EmbeddedMetadata::Existing(_)));
        assert!(parsed(&meta).ascii_in(Ifd::Exif, DATE_TIME_ORIGINAL).is_some());
    }
}
