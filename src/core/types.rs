//! Core types for compression payloads, settings and results.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::formats::is_image_media_type;

/// An immutable file handed to the compressor.
///
/// Cloning is cheap: the bytes are shared. A compression attempt never mutates
/// a payload, it builds a new one through [`ImagePayload::reencoded`].
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    name: String,
    media_type: String,
    bytes: Arc<[u8]>,
    last_modified: DateTime<Utc>,
}

impl ImagePayload {
    pub fn new(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes: bytes.into(),
            last_modified: Utc::now(),
        }
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = last_modified;
        self
    }

    /// Display name (file name) of the payload
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared media type, e.g. `image/jpeg`
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// Size in bytes
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_image(&self) -> bool {
        is_image_media_type(&self.media_type)
    }

    /// True when both payloads are backed by the same byte buffer.
    pub fn shares_bytes(&self, other: &ImagePayload) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    /// Builds the successor of this payload from freshly encoded bytes.
    ///
    /// Name and media type are carried over; the timestamp is reset to now.
    pub fn reencoded(&self, bytes: Vec<u8>) -> Self {
        Self {
            name: self.name.clone(),
            media_type: self.media_type.clone(),
            bytes: bytes.into(),
            last_modified: Utc::now(),
        }
    }
}

/// Pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scales both sides by `factor`, truncating toward zero.
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            width: (self.width as f64 * factor).floor() as u32,
            height: (self.height as f64 * factor).floor() as u32,
        }
    }

    pub fn pixels(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}×{}", self.width, self.height)
    }
}

/// Parameters of one single-attempt compression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompressionConfig {
    /// Width cap in pixels
    pub max_width: u32,
    /// Height cap in pixels
    pub max_height: u32,
    /// Lossy quality in (0, 1]
    pub quality: f32,
    /// Payloads at or under this many KB are passed through untouched
    #[serde(rename = "maxSizeKB")]
    pub max_size_kb: f64,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            max_width: 1920,
            max_height: 1080,
            quality: 0.8,
            max_size_kb: 2048.0,
        }
    }
}

impl CompressionConfig {
    pub fn new(max_width: u32, max_height: u32, quality: f32, max_size_kb: f64) -> Self {
        Self {
            max_width,
            max_height,
            quality,
            max_size_kb,
        }
    }

    pub fn max_size_bytes(&self) -> f64 {
        self.max_size_kb * 1024.0
    }
}

/// Caller intent for the target-seeking search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TargetSpec {
    /// Byte budget in KB; the search is skipped when absent or not positive
    #[serde(rename = "targetKB")]
    pub target_kb: Option<f64>,
    pub max_width: u32,
    pub max_height: u32,
    pub initial_quality: f32,
    pub min_quality: f32,
    pub quality_step: f32,
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for TargetSpec {
    fn default() -> Self {
        Self {
            target_kb: None,
            max_width: 1280,
            max_height: 720,
            initial_quality: 0.7,
            min_quality: 0.4,
            quality_step: 0.1,
            min_width: 640,
            min_height: 480,
        }
    }
}

impl TargetSpec {
    /// Default search parameters aiming at `target_kb`.
    pub fn new(target_kb: f64) -> Self {
        Self {
            target_kb: Some(target_kb),
            ..Self::default()
        }
    }

    /// Target in bytes, or `None` when the search should not run.
    pub fn target_bytes(&self) -> Option<f64> {
        self.target_kb
            .filter(|kb| kb.is_finite() && *kb > 0.0)
            .map(|kb| kb * 1024.0)
    }

    pub fn initial_bounds(&self) -> Dimensions {
        Dimensions::new(self.max_width, self.max_height)
    }

    pub fn min_bounds(&self) -> Dimensions {
        Dimensions::new(self.min_width, self.min_height)
    }
}

/// Per-file report of a compression run, suitable for display or JSON output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionSummary {
    pub name: String,
    pub media_type: String,
    /// Original size in bytes
    pub original_size: u64,
    /// Final size in bytes
    pub compressed_size: u64,
    /// Bytes saved (never negative: a larger result is discarded)
    pub saved_bytes: u64,
    /// Saved bytes as a percentage of the original
    pub compression_ratio: f64,
    /// Single-attempt invocations used
    pub attempts: usize,
    /// Whether the final size fits the requested budget
    pub within_target: bool,
    /// Timestamp of the final payload
    pub last_modified: DateTime<Utc>,
}

impl CompressionSummary {
    pub fn new(
        original: &ImagePayload,
        compressed: &ImagePayload,
        attempts: usize,
        within_target: bool,
    ) -> Self {
        let original_size = original.size();
        let compressed_size = compressed.size();
        let saved_bytes = original_size.saturating_sub(compressed_size);
        let compression_ratio = if original_size > 0 {
            saved_bytes as f64 / original_size as f64 * 100.0
        } else {
            0.0
        };

        Self {
            name: original.name().to_string(),
            media_type: original.media_type().to_string(),
            original_size,
            compressed_size,
            saved_bytes,
            compression_ratio,
            attempts,
            within_target,
            last_modified: compressed.last_modified(),
        }
    }
}
