//! Image processing: decode anything, flatten to RGB, encode JPEG.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (+ `libheif-rs` for HEIC/HEIF) |
//! | **Source EXIF** | `image::ImageDecoder::exif_metadata` |
//! | **Normalize** | alpha compositing over a fixed background |
//! | **EXIF** | TIFF block reader and writer (IFD0, Exif and GPS directories) |
//! | **Encode** | `jpeg_encoder::Encoder`, optimized Huffman tables, APP1 segment |
//!
//! The module is split into:
//! - **Parameters**: [`Quality`] and [`Background`]
//! - **Normalize**: pure pixel conversion (unit testable)
//! - **EXIF**: byte-level metadata block handling
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
pub mod exif;
pub mod heic;
pub mod normalize;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Decoded, ImageBackend};
pub use normalize::normalize;
pub use params::{Background, Quality};
pub use rust_backend::RustBackend;
