//! Colour-mode normalization: any decoded raster → opaque 8-bit RGB.
//!
//! JPEG has no alpha channel and no palette, so every source is flattened
//! before encoding:
//!
//! | Source colour type | Treatment |
//! |---|---|
//! | RGB8 | passed through |
//! | RGBA, LumaA (any depth) | composited over the background using alpha as the mask |
//! | Luma, RGB16, RGB32F | converted straight to RGB8 |
//!
//! Palette (indexed) PNGs never reach this module as such: the decoder
//! expands them to RGB8, or RGBA8 when they carry a `tRNS` transparency
//! chunk, which then takes the compositing path.
//!
//! Pixel dimensions are never changed.

use super::params::Background;
use image::{DynamicImage, Rgb, RgbImage};

/// Flatten `image` to opaque RGB, compositing any alpha over `background`.
pub fn normalize(image: DynamicImage, background: Background) -> RgbImage {
    if image.color().has_alpha() {
        flatten_alpha(&image, background)
    } else {
        match image {
            DynamicImage::ImageRgb8(rgb) => rgb,
            other => other.to_rgb8(),
        }
    }
}

fn flatten_alpha(image: &DynamicImage, background: Background) -> RgbImage {
    let rgba = image.to_rgba8();
    let Rgb(bg) = background.rgb();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        Rgb([blend(r, bg[0], a), blend(g, bg[1], a), blend(b, bg[2], a)])
    })
}

/// `src` over `dst` with 8-bit coverage `alpha`, rounded to nearest.
#[inline]
fn blend(src: u8, dst: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((src as u32 * a + dst as u32 * (255 - a) + 127) / 255) as u8
}
