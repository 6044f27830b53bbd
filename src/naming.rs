//! Output filename synthesis.
//!
//! Every converted image gets a name built from who took it, when it was
//! ingested, what it was called, and what it contains:
//!
//! ```text
//! {author}_{YYYYMMDD_HHMMSS}_{stem}_{hash8}.jpg
//! alice_20260319_142501_IMG_0042_3fa9c2d1.jpg
//! ```
//!
//! ## Sanitization
//!
//! - **Author**: keeps alphanumerics, `-` and `_`; everything else is dropped.
//!   `"Jane Doe!"` → `"JaneDoe"`.
//! - **Stem**: keeps alphanumerics, `-`, `_` and spaces; trims, turns the
//!   remaining spaces into `_`, and truncates to [`MAX_STEM_CHARS`].
//!   `"My Photo 01"` → `"My_Photo_01"`.
//!
//! Alphanumeric is Unicode-aware, so `"Zoë"` stays `"Zoë"`.
//!
//! ## Uniqueness
//!
//! The name is the only collision avoidance. Two files would clash only with
//! the same author, same second, same truncated stem and the same 8-hex-digit
//! hash prefix. The orchestrator still checks for an existing file before
//! writing and never overwrites.

use crate::hash::Fingerprint;
use chrono::NaiveDateTime;

/// Maximum length of the sanitized original stem, in characters.
pub const MAX_STEM_CHARS: usize = 20;

/// `strftime` pattern for the timestamp segment.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Build the output filename for one converted image.
pub fn synthesize(
    author: &str,
    original_stem: &str,
    fingerprint: &Fingerprint,
    timestamp: &NaiveDateTime,
) -> String {
    format!(
        "{}_{}_{}_{}.jpg",
        sanitize_author(author),
        timestamp.format(TIMESTAMP_FORMAT),
        sanitize_stem(original_stem),
        fingerprint.short()
    )
}

/// Keep only alphanumerics, `-` and `_`.
pub fn sanitize_author(author: &str) -> String {
    author
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_'))
        .collect()
}

/// Keep alphanumerics, `-`, `_` and spaces; trim; spaces → `_`; truncate.
pub fn sanitize_stem(stem: &str) -> String {
    let kept: String = stem
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ' '))
        .collect();
    kept.trim()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .take(MAX_STEM_CHARS)
        .collect()
}
