//! Aspect-preserving bound fitting for the single-attempt compressor.

use crate::core::Dimensions;

/// Shrinks `natural` to fit within `max_width` × `max_height`, keeping aspect.
///
/// The width cap is applied first; the height cap is then applied to the
/// already width-corrected size. Never enlarges, and never returns a zero side.
pub fn fit_within(natural: Dimensions, max_width: u32, max_height: u32) -> Dimensions {
    let mut width = natural.width as f64;
    let mut height = natural.height as f64;

    if width > max_width as f64 {
        height = height * max_width as f64 / width;
        width = max_width as f64;
    }

    if height > max_height as f64 {
        width = width * max_height as f64 / height;
        height = max_height as f64;
    }

    Dimensions::new(to_pixels(width), to_pixels(height))
}

// Canvas sizes are integral: truncate, but keep at least one pixel.
fn to_pixels(value: f64) -> u32 {
    (value.floor() as u32).max(1)
}
