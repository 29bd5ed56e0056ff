//! Image compression pipeline.
//!
//! - [`Compressor::compress`]: one decode + fit + encode attempt.
//! - [`Compressor::compress_to_target`]: bounded search toward a byte budget.
//! - [`ImageCodec`]: the pixel backend, [`RasterCodec`] by default.

mod codec;
mod compressor;
mod resize;
mod target;

pub use codec::{ImageCodec, RasterCodec};
pub use compressor::Compressor;
pub use resize::fit_within;
pub use target::{AttemptRecord, BOUNDS_STEP, MAX_ATTEMPTS, SearchStep, TargetOutcome};
