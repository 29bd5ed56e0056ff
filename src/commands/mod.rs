//! Compression commands for the upload flow:
//! - [`compress_image`]: compress a single image once
//! - [`compress_image_to_target`]: compress a single image toward a size target
//! - [`compress_batch_to_target`]: compress several images concurrently

mod image;

pub use image::*;
