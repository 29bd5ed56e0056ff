use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::CompressionError;

/// Media type used when a file's type cannot be inferred.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Formats the compressor can re-encode into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeFormat {
    JPEG,
    PNG,
    WebP,
}

impl EncodeFormat {
    /// Canonical media type for this format
    pub fn media_type(&self) -> &'static str {
        match self {
            Self::JPEG => "image/jpeg",
            Self::PNG => "image/png",
            Self::WebP => "image/webp",
        }
    }

    /// Whether the quality knob changes the encoded output.
    ///
    /// PNG is lossless, so quality is ignored.
    pub fn honours_quality(&self) -> bool {
        matches!(self, Self::JPEG | Self::WebP)
    }

    /// Maps a fractional quality in (0, 1] to the encoder's 1-100 scale.
    pub fn encoder_quality(quality: f32) -> u8 {
        (quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl FromStr for EncodeFormat {
    type Err = CompressionError;

    fn from_str(media_type: &str) -> Result<Self, Self::Err> {
        let essence = media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Ok(Self::JPEG),
            "image/png" => Ok(Self::PNG),
            "image/webp" => Ok(Self::WebP),
            _ => Err(CompressionError::encoding(format!(
                "Unsupported output type: {media_type}"
            ))),
        }
    }
}

/// True when `media_type` declares an image (`image/*`).
pub fn is_image_media_type(media_type: &str) -> bool {
    media_type
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

/// Infers a media type from a file extension.
///
/// Unknown extensions map to [`OCTET_STREAM`], which the compressor passes through.
pub fn media_type_from_path(path: impl AsRef<Path>) -> String {
    image::ImageFormat::from_path(path.as_ref())
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| OCTET_STREAM.to_string())
}

/// Returns the file name portion of `path`, or the whole string when there is none.
pub fn extract_filename(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path)
}
