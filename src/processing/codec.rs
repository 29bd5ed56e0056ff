//! Decode and encode capabilities used by the compressor.
//!
//! [`ImageCodec`] is the seam between the search logic and pixel work. The
//! default [`RasterCodec`] runs on the `image` crate; tests substitute cheap
//! fakes that only track dimensions.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::metadata::Orientation;
use image::{DynamicImage, ExtendedColorType, ImageDecoder, ImageFormat, ImageReader, ImageResult};
use tracing::debug;

use crate::core::Dimensions;
use crate::utils::{CompressionError, CompressionResult, EncodeFormat};

/// Turns bytes into pixels and pixels back into bytes.
///
/// Implementations run on tokio's blocking pool, so they may do heavy
/// synchronous work.
pub trait ImageCodec: Send + Sync + 'static {
    /// Decoded pixel data handed from `decode` to `encode`.
    type Decoded: Send + 'static;

    /// Decodes `bytes`, using `media_type` as a format hint.
    fn decode(&self, bytes: &[u8], media_type: &str) -> CompressionResult<Self::Decoded>;

    /// Natural size of a decoded image.
    fn dimensions(&self, image: &Self::Decoded) -> Dimensions;

    /// Resizes `image` to exactly `target` and encodes it as `media_type` at `quality`.
    fn encode(
        &self,
        image: Self::Decoded,
        target: Dimensions,
        media_type: &str,
        quality: f32,
    ) -> CompressionResult<Vec<u8>>;
}

/// Pure-Rust codec backed by the `image` crate.
///
/// Re-encodes JPEG and WebP (lossy, honour quality) and PNG (lossless).
/// Decoding applies the EXIF orientation, so pixels come out upright.
#[derive(Debug, Clone, Copy)]
pub struct RasterCodec {
    filter: FilterType,
}

impl Default for RasterCodec {
    fn default() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }
}

impl RasterCodec {
    pub fn with_filter(filter: FilterType) -> Self {
        Self { filter }
    }
}

impl ImageCodec for RasterCodec {
    type Decoded = DynamicImage;

    fn decode(&self, bytes: &[u8], media_type: &str) -> CompressionResult<DynamicImage> {
        let decoded = match ImageFormat::from_mime_type(media_type) {
            Some(format) => read_upright(bytes, Some(format))
                // The declared type may be wrong; let the decoder sniff the header.
                .or_else(|_| read_upright(bytes, None)),
            None => read_upright(bytes, None),
        };

        decoded.map_err(|e| CompressionError::decoding(e.to_string()))
    }

    fn dimensions(&self, image: &DynamicImage) -> Dimensions {
        Dimensions::new(image.width(), image.height())
    }

    fn encode(
        &self,
        image: DynamicImage,
        target: Dimensions,
        media_type: &str,
        quality: f32,
    ) -> CompressionResult<Vec<u8>> {
        let format: EncodeFormat = media_type.parse()?;

        let image = if self.dimensions(&image) == target {
            image
        } else {
            image.resize_exact(target.width, target.height, self.filter)
        };

        let mut buf = Vec::new();
        match format {
            EncodeFormat::JPEG => {
                let rgb = image.to_rgb8();
                let mut encoder =
                    JpegEncoder::new_with_quality(&mut buf, EncodeFormat::encoder_quality(quality));
                encoder
                    .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
                    .map_err(|e| CompressionError::encoding(format!("JPEG encode failed: {e}")))?;
            }
            EncodeFormat::PNG => {
                image
                    .write_with_encoder(PngEncoder::new(Cursor::new(&mut buf)))
                    .map_err(|e| CompressionError::encoding(format!("PNG encode failed: {e}")))?;
            }
            EncodeFormat::WebP => {
                let webp_quality = EncodeFormat::encoder_quality(quality) as f32;
                let encoded = if image.color().has_alpha() {
                    let rgba = image.to_rgba8();
                    webp::Encoder::from_rgba(&rgba, rgba.width(), rgba.height())
                        .encode_simple(false, webp_quality)
                } else {
                    let rgb = image.to_rgb8();
                    webp::Encoder::from_rgb(&rgb, rgb.width(), rgb.height())
                        .encode_simple(false, webp_quality)
                };
                let encoded = encoded
                    .map_err(|e| CompressionError::encoding(format!("WebP encode failed: {e:?}")))?;
                buf.extend_from_slice(&encoded);
            }
        }

        if buf.is_empty() {
            return Err(CompressionError::encoding("Encoder produced no output"));
        }

        if !format.honours_quality() {
            debug!("{} ignores quality {:.2}", format.media_type(), quality);
        }

        Ok(buf)
    }
}

/// Decodes `bytes` and rotates/flips the pixels as the EXIF orientation says.
///
/// The re-encoded output carries no EXIF, so the transform must be baked in.
fn read_upright(bytes: &[u8], format: Option<ImageFormat>) -> ImageResult<DynamicImage> {
    let mut reader = ImageReader::new(Cursor::new(bytes));
    match format {
        Some(format) => reader.set_format(format),
        None => reader = reader.with_guessed_format()?,
    }

    let mut decoder = reader.into_decoder()?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);
    let mut image = DynamicImage::from_decoder(decoder)?;
    if orientation != Orientation::NoTransforms {
        debug!("Applying EXIF orientation {:?}", orientation);
        image.apply_orientation(orientation);
    }
    Ok(image)
}
