//! Entry points for the upload flow.

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::core::{CompressionConfig, CompressionSummary, ImagePayload, TargetSpec};
use crate::processing::{Compressor, ImageCodec, TargetOutcome};
use crate::utils::{CompressionError, CompressionResult};

/// Compresses a single image once with the given settings.
///
/// Non-images and images within `config.max_size_kb` are returned unchanged.
/// See [`CompressionConfig::default`] for the default bounds (1920×1080, q=0.8, 2048 KB).
pub async fn compress_image(
    payload: &ImagePayload,
    config: &CompressionConfig,
) -> CompressionResult<ImagePayload> {
    Compressor::new().compress(payload, config).await
}

/// Compresses a single image toward `spec.target_kb`.
///
/// Returns the best candidate found in at most ten attempts, which may still
/// exceed the target.
pub async fn compress_image_to_target(
    payload: &ImagePayload,
    spec: &TargetSpec,
) -> CompressionResult<ImagePayload> {
    Compressor::new().compress_to_target(payload, spec).await
}

/// Compresses several payloads toward the same target concurrently.
///
/// Each payload gets its own search; nothing is shared between them. Results
/// are returned in input order, one per payload, so a failure on one file does
/// not hide the others.
pub async fn compress_batch_to_target<C: ImageCodec>(
    compressor: &Compressor<C>,
    payloads: Vec<ImagePayload>,
    spec: &TargetSpec,
) -> Vec<CompressionResult<TargetOutcome>> {
    let total = payloads.len();
    debug!("Received batch of {} payloads", total);

    let mut set = JoinSet::new();
    for (idx, payload) in payloads.into_iter().enumerate() {
        let compressor = compressor.clone();
        let spec = *spec;
        set.spawn(async move { (idx, compressor.seek_target(&payload, &spec).await) });
    }

    let mut results: Vec<Option<CompressionResult<TargetOutcome>>> = (0..total).map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, result)) => {
                if let Err(e) = &result {
                    warn!("Compression failed for payload #{}: {}", idx, e);
                }
                results[idx] = Some(result);
            }
            Err(e) => warn!("Compression task aborted: {}", e),
        }
    }

    results
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| Err(CompressionError::Task("task aborted".to_string()))))
        .collect()
}

/// Builds per-file summaries for a finished batch, skipping failures.
pub fn summarize(originals: &[ImagePayload], outcomes: &[CompressionResult<TargetOutcome>]) -> Vec<CompressionSummary> {
    originals
        .iter()
        .zip(outcomes)
        .filter_map(|(original, outcome)| {
            outcome.as_ref().ok().map(|o| {
                CompressionSummary::new(original, &o.payload, o.attempts, o.within_target)
            })
        })
        .collect()
}
