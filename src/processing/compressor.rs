//! Single-attempt compressor.
//!
//! Each attempt runs inside `tokio::task::spawn_blocking` so the async caller
//! is never blocked by decoding or encoding. Attempts are independent: no
//! state is shared between calls beyond the (stateless) codec.

use std::sync::Arc;

use tracing::debug;

use crate::core::{CompressionConfig, Dimensions, ImagePayload};
use crate::utils::CompressionResult;

use super::codec::{ImageCodec, RasterCodec};
use super::resize::fit_within;

/// Compresses image payloads with a shared codec.
///
/// Cheap to clone; clones share the codec.
pub struct Compressor<C: ImageCodec = RasterCodec> {
    codec: Arc<C>,
}

impl<C: ImageCodec> Clone for Compressor<C> {
    fn clone(&self) -> Self {
        Self {
            codec: Arc::clone(&self.codec),
        }
    }
}

impl Default for Compressor<RasterCodec> {
    fn default() -> Self {
        Self::with_codec(RasterCodec::default())
    }
}

impl Compressor<RasterCodec> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: ImageCodec> Compressor<C> {
    pub fn with_codec(codec: C) -> Self {
        Self {
            codec: Arc::new(codec),
        }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Produces one re-encoded candidate for `payload`.
    ///
    /// Non-image payloads and payloads already within `config.max_size_kb` are
    /// returned as-is. Otherwise the image is decoded, fitted within the
    /// configured bounds and re-encoded at `config.quality` in its own type.
    /// The result may still exceed `max_size_kb`: the ceiling is only a skip
    /// threshold here.
    pub async fn compress(
        &self,
        payload: &ImagePayload,
        config: &CompressionConfig,
    ) -> CompressionResult<ImagePayload> {
        if !payload.is_image() {
            debug!("'{}' is not an image ({}), passing through", payload.name(), payload.media_type());
            return Ok(payload.clone());
        }

        if payload.size() as f64 <= config.max_size_bytes() {
            return Ok(payload.clone());
        }

        let codec = Arc::clone(&self.codec);
        let bytes = payload.shared_bytes();
        let media_type = payload.media_type().to_string();
        let config = *config;

        let (encoded, natural, target) = tokio::task::spawn_blocking(move || {
            encode_once(&*codec, &bytes, &media_type, &config)
        })
        .await??;

        let compressed = payload.reencoded(encoded);

        debug!(
            "Image compressed: {:.1}KB -> {:.1}KB ({} → {}, q={:.2})",
            payload.size() as f64 / 1024.0,
            compressed.size() as f64 / 1024.0,
            natural,
            target,
            config.quality
        );

        Ok(compressed)
    }
}

/// Decodes, fits and re-encodes once. Decoded pixels are dropped on every path.
fn encode_once<C: ImageCodec>(
    codec: &C,
    bytes: &[u8],
    media_type: &str,
    config: &CompressionConfig,
) -> CompressionResult<(Vec<u8>, Dimensions, Dimensions)> {
    let decoded = codec.decode(bytes, media_type)?;
    let natural = codec.dimensions(&decoded);
    let target = fit_within(natural, config.max_width, config.max_height);
    let encoded = codec.encode(decoded, target, media_type, config.quality)?;
    Ok((encoded, natural, target))
}
