//! Parameter types for image operations.
//!
//! These describe *what* to produce, not *how*. They sit between the
//! orchestrator (which decides what each output looks like) and the
//! [`backend`](super::backend) (which does the pixel and codec work).
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 95). Clamped on construction.
//! - [`Background`]: opaque fill that transparent pixels are flattened onto (default white).

use image::Rgb;
use serde::{Deserialize, Serialize};

/// Quality setting for JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(95)
    }
}

/// Opaque colour used under any alpha channel when flattening to RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Background(pub [u8; 3]);

impl Background {
    pub const WHITE: Self = Self([255, 255, 255]);

    pub fn rgb(self) -> Rgb<u8> {
        Rgb(self.0)
    }
}

impl Default for Background {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_95() {
        assert_eq!(Quality::default().value(), 95);
    }

    #[test]
    fn background_default_is_white() {
        assert_eq!(Background::default().rgb(), Rgb([255, 255, 255]));
    }
}
