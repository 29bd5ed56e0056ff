mod support;

use std::io::Cursor;

use abastecimento_lib::core::{CompressionConfig, ImagePayload, TargetSpec};
use abastecimento_lib::processing::{Compressor, MAX_ATTEMPTS};
use abastecimento_lib::utils::CompressionError;
use abastecimento_lib::{compress_image, compress_image_to_target};
use image::{DynamicImage, ImageFormat, RgbImage};

use support::{noisy_jpeg, noisy_webp, with_exif_orientation};

#[tokio::test]
async fn jpeg_is_fitted_and_reencoded() {
    let original = ImagePayload::new("odometro.jpg", "image/jpeg", noisy_jpeg(1200, 800, 95));
    let config = CompressionConfig::new(600, 600, 0.6, 10.0);

    let compressed = compress_image(&original, &config).await.unwrap();
    let decoded = image::load_from_memory(compressed.bytes()).unwrap();

    assert_eq!((decoded.width(), decoded.height()), (600, 400));
    assert_eq!(compressed.name(), "odometro.jpg");
    assert_eq!(compressed.media_type(), "image/jpeg");
    assert!(compressed.size() < original.size());
}

#[tokio::test]
async fn target_search_on_real_jpeg_stays_bounded() {
    let original = ImagePayload::new("bomba.jpg", "image/jpeg", noisy_jpeg(1600, 1200, 98));
    let spec = TargetSpec::new(120.0);

    let outcome = Compressor::new().seek_target(&original, &spec).await.unwrap();

    assert!(outcome.attempts >= 1 && outcome.attempts <= MAX_ATTEMPTS);
    assert!(outcome.payload.size() <= original.size());
    if outcome.within_target {
        assert!(outcome.payload.size() <= 120 * 1024);
    }

    let via_command = compress_image_to_target(&original, &spec).await.unwrap();
    assert_eq!(via_command.size(), outcome.payload.size());
}

#[tokio::test]
async fn undecodable_bytes_are_a_decoding_error() {
    let broken = ImagePayload::new("foto.jpg", "image/jpeg", vec![0x42u8; 300 * 1024]);

    let result = compress_image(&broken, &CompressionConfig::new(800, 600, 0.8, 100.0)).await;

    assert!(matches!(result, Err(CompressionError::Decoding(_))));
}

#[tokio::test]
async fn types_without_an_encoder_are_an_encoding_error() {
    let mut bmp = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::new(64, 64))
        .write_to(&mut Cursor::new(&mut bmp), ImageFormat::Bmp)
        .unwrap();
    let payload = ImagePayload::new("scan.bmp", "image/bmp", bmp);

    let result = compress_image(&payload, &CompressionConfig::new(32, 32, 0.8, 1.0)).await;

    assert!(matches!(result, Err(CompressionError::Encoding(_))));
}

#[tokio::test]
async fn webp_quality_changes_the_output_size() {
    let original = ImagePayload::new("painel.webp", "image/webp", noisy_webp(800, 600));

    let high = compress_image(&original, &CompressionConfig::new(800, 800, 0.9, 1.0)).await.unwrap();
    let low = compress_image(&original, &CompressionConfig::new(800, 800, 0.2, 1.0)).await.unwrap();

    assert!(low.size() < high.size(), "q0.2={} q0.9={}", low.size(), high.size());
    assert!(low.size() < original.size());
    assert_eq!(low.media_type(), "image/webp");
    assert!(image::load_from_memory_with_format(low.bytes(), ImageFormat::WebP).is_ok());
}

#[tokio::test]
async fn webp_search_shrinks_within_a_quality_tier() {
    let original = ImagePayload::new("painel.webp", "image/webp", noisy_webp(800, 600));

    let outcome = Compressor::new()
        .seek_target(&original, &TargetSpec::new(1.0))
        .await
        .unwrap();

    let first = &outcome.history[0];
    let second = &outcome.history[1];
    assert_eq!(first.step.bounds, second.step.bounds);
    assert!(second.step.quality < first.step.quality);
    assert!(second.candidate_size < first.candidate_size);
}

#[tokio::test]
async fn exif_rotated_photo_is_fitted_upright() {
    // Stored 800×600 with Orientation=6: displayed as 600×800 portrait.
    let rotated = with_exif_orientation(&noisy_jpeg(800, 600, 95), 6);
    let original = ImagePayload::new("hodometro.jpg", "image/jpeg", rotated);

    let compressed = compress_image(&original, &CompressionConfig::new(400, 400, 0.8, 1.0)).await.unwrap();
    let decoded = image::load_from_memory(compressed.bytes()).unwrap();

    assert_eq!((decoded.width(), decoded.height()), (300, 400));
}
