//! Target-seeking compression.
//!
//! Drives the single-attempt compressor through a bounded sequence of
//! (quality, bounds) settings until the payload fits a byte budget. Quality is
//! lowered first at each bounds tier; bounds shrink by 10% only once quality
//! reaches its floor, and quality is then reset to its initial value.

use serde::Serialize;
use tracing::{debug, info};

use crate::core::{CompressionConfig, Dimensions, ImagePayload, TargetSpec};
use crate::utils::CompressionResult;

use super::codec::ImageCodec;
use super::compressor::Compressor;

/// Hard cap on single-attempt invocations per search.
pub const MAX_ATTEMPTS: usize = 10;

/// Factor applied to both bounds when quality is exhausted.
pub const BOUNDS_STEP: f64 = 0.9;

// Absorbs float drift in `quality - step` (0.7 - 3 × 0.1 must still reach 0.4).
const QUALITY_EPSILON: f32 = 1e-4;

/// Settings of the next attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStep {
    pub bounds: Dimensions,
    pub quality: f32,
}

impl SearchStep {
    pub fn initial(spec: &TargetSpec) -> Self {
        Self {
            bounds: spec.initial_bounds(),
            quality: spec.initial_quality,
        }
    }

    /// The step after a miss, or `None` when neither quality nor bounds can shrink.
    pub fn next(&self, spec: &TargetSpec) -> Option<Self> {
        let lowered = self.quality - spec.quality_step;
        if lowered >= spec.min_quality - QUALITY_EPSILON {
            return Some(Self {
                bounds: self.bounds,
                quality: lowered.max(spec.min_quality),
            });
        }

        let shrunk = self.bounds.scaled(BOUNDS_STEP);
        let min = spec.min_bounds();
        if shrunk.width >= min.width && shrunk.height >= min.height {
            return Some(Self {
                bounds: shrunk,
                quality: spec.initial_quality,
            });
        }

        None
    }

    fn config(&self, target_kb: f64) -> CompressionConfig {
        CompressionConfig::new(self.bounds.width, self.bounds.height, self.quality, target_kb)
    }
}

/// One attempt of a search, as recorded in [`TargetOutcome::history`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub step: SearchStep,
    /// Size of the candidate this attempt produced
    pub candidate_size: u64,
    /// Size of the best payload after this attempt
    pub best_size: u64,
}

/// Result of a target-seeking search.
#[derive(Debug, Clone)]
pub struct TargetOutcome {
    /// Smallest payload seen (the input itself when nothing improved on it)
    pub payload: ImagePayload,
    /// Single-attempt invocations performed
    pub attempts: usize,
    /// Whether `payload` fits the target; false when no target was given
    pub within_target: bool,
    pub history: Vec<AttemptRecord>,
}

impl TargetOutcome {
    fn untouched(payload: &ImagePayload) -> Self {
        Self {
            payload: payload.clone(),
            attempts: 0,
            within_target: false,
            history: Vec::new(),
        }
    }
}

impl<C: ImageCodec> Compressor<C> {
    /// Compresses `payload` toward `spec.target_kb`, returning the best candidate.
    ///
    /// Missing the target is not an error; a decode or encode failure on any
    /// attempt aborts the search.
    pub async fn compress_to_target(
        &self,
        payload: &ImagePayload,
        spec: &TargetSpec,
    ) -> CompressionResult<ImagePayload> {
        self.seek_target(payload, spec).await.map(|outcome| outcome.payload)
    }

    /// Like [`Compressor::compress_to_target`], also reporting how the search went.
    pub async fn seek_target(
        &self,
        payload: &ImagePayload,
        spec: &TargetSpec,
    ) -> CompressionResult<TargetOutcome> {
        if !payload.is_image() {
            return Ok(TargetOutcome::untouched(payload));
        }

        let (Some(target_kb), Some(target_bytes)) = (spec.target_kb, spec.target_bytes()) else {
            debug!("No usable target for '{}', passing through", payload.name());
            return Ok(TargetOutcome::untouched(payload));
        };

        let mut best = payload.clone();
        let mut step = SearchStep::initial(spec);
        let mut history = Vec::with_capacity(MAX_ATTEMPTS);

        while history.len() < MAX_ATTEMPTS {
            let candidate = self.compress(&best, &step.config(target_kb)).await?;
            let candidate_size = candidate.size();
            if candidate_size < best.size() {
                best = candidate;
            }

            history.push(AttemptRecord {
                step,
                candidate_size,
                best_size: best.size(),
            });

            if best.size() as f64 <= target_bytes {
                break;
            }

            match step.next(spec) {
                Some(next) => step = next,
                None => {
                    debug!("'{}': quality and bounds exhausted at {}", payload.name(), step.bounds);
                    break;
                }
            }
        }

        let within_target = best.size() as f64 <= target_bytes;
        info!(
            "'{}': {:.1}KB -> {:.1}KB in {} attempt(s), target {:.0}KB {}",
            payload.name(),
            payload.size() as f64 / 1024.0,
            best.size() as f64 / 1024.0,
            history.len(),
            target_kb,
            if within_target { "reached" } else { "missed" }
        );

        Ok(TargetOutcome {
            payload: best,
            attempts: history.len(),
            within_target,
            history,
        })
    }
}
