#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use abastecimento_lib::core::Dimensions;
use abastecimento_lib::processing::ImageCodec;
use abastecimento_lib::utils::{CompressionError, CompressionResult};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, ImageFormat, Rgb, RgbImage};

const MAGIC: &[u8; 4] = b"FAKE";
pub const CORRUPT: &[u8] = b"BAD!";

/// One `encode` call seen by [`FakeCodec`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncodeCall {
    pub target: Dimensions,
    pub quality: f32,
}

/// Codec that never touches pixels.
///
/// Output size is `pixels × quality × bytes_per_pixel`; the output embeds its
/// dimensions so re-decoding a previous candidate sees the shrunken size.
pub struct FakeCodec {
    natural: Dimensions,
    bytes_per_pixel: f64,
    fail_encode_on: Option<usize>,
    decodes: AtomicUsize,
    calls: Mutex<Vec<EncodeCall>>,
}

impl FakeCodec {
    pub fn new(natural: Dimensions, bytes_per_pixel: f64) -> Self {
        Self {
            natural,
            bytes_per_pixel,
            fail_encode_on: None,
            decodes: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Makes the `n`th encode (1-based) fail.
    pub fn failing_on(mut self, n: usize) -> Self {
        self.fail_encode_on = Some(n);
        self
    }

    pub fn decodes(&self) -> usize {
        self.decodes.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<EncodeCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl ImageCodec for FakeCodec {
    type Decoded = Dimensions;

    fn decode(&self, bytes: &[u8], _media_type: &str) -> CompressionResult<Dimensions> {
        self.decodes.fetch_add(1, Ordering::SeqCst);
        if bytes.starts_with(CORRUPT) {
            return Err(CompressionError::decoding("corrupt fixture"));
        }
        if bytes.len() >= 12 && bytes.starts_with(MAGIC) {
            let width = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
            let height = u32::from_le_bytes(bytes[8..12].try_into().unwrap());
            return Ok(Dimensions::new(width, height));
        }
        Ok(self.natural)
    }

    fn dimensions(&self, image: &Dimensions) -> Dimensions {
        *image
    }

    fn encode(
        &self,
        _image: Dimensions,
        target: Dimensions,
        _media_type: &str,
        quality: f32,
    ) -> CompressionResult<Vec<u8>> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(EncodeCall { target, quality });
        if self.fail_encode_on == Some(calls.len()) {
            return Err(CompressionError::encoding("fixture encoder refused"));
        }

        let size = ((target.pixels() as f64 * quality as f64 * self.bytes_per_pixel) as usize).max(12);
        let mut out = vec![0u8; size];
        out[..4].copy_from_slice(MAGIC);
        out[4..8].copy_from_slice(&target.width.to_le_bytes());
        out[8..12].copy_from_slice(&target.height.to_le_bytes());
        Ok(out)
    }
}

/// Placeholder bytes large enough to skip the "already small" shortcut.
pub fn source_bytes(size: usize) -> Vec<u8> {
    vec![0xAB; size]
}

fn noisy_image(width: u32, height: u32) -> RgbImage {
    let mut seed: u32 = 0x2545_F491;
    RgbImage::from_fn(width, height, |x, y| {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        let noise = (seed & 0x3F) as u8;
        Rgb([
            ((x * 255 / width.max(1)) as u8).wrapping_add(noise),
            ((y * 255 / height.max(1)) as u8).wrapping_add(noise / 2),
            noise.wrapping_mul(3),
        ])
    })
}

/// A real JPEG with a gradient and deterministic noise, so it compresses poorly.
pub fn noisy_jpeg(width: u32, height: u32, quality: u8) -> Vec<u8> {
    let img = noisy_image(width, height);

    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// The same noisy picture as [`noisy_jpeg`], stored as lossless WebP.
pub fn noisy_webp(width: u32, height: u32) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(noisy_image(width, height))
        .write_to(&mut std::io::Cursor::new(&mut buf), ImageFormat::WebP)
        .unwrap();
    buf
}

/// Inserts an EXIF APP1 segment holding only `orientation` right after the JPEG SOI marker.
pub fn with_exif_orientation(jpeg: &[u8], orientation: u16) -> Vec<u8> {
    let mut app1 = vec![0xFF, 0xE1, 0x00, 0x22];
    app1.extend_from_slice(b"Exif\0\0");
    // Big-endian TIFF header, first IFD at offset 8, one entry.
    app1.extend_from_slice(b"MM\0\x2A\0\0\0\x08");
    app1.extend_from_slice(&[0x00, 0x01]);
    app1.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
    app1.extend_from_slice(&orientation.to_be_bytes());
    app1.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&app1);
    out.extend_from_slice(&jpeg[2..]);
    out
}
