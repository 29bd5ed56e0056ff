//! Core types and session state.
//!
//! This module contains the fundamental types used throughout the crate:
//! - [`ImagePayload`]: an immutable file handed to the compressor
//! - [`CompressionConfig`]: settings of one compression attempt
//! - [`TargetSpec`]: settings of the target-seeking search
//! - [`CompressionSummary`]: per-file report of a run
//! - [`SessionContext`]: the signed-in user and permission flags

mod state;
mod types;
mod user;

pub use state::SessionContext;
pub use types::{CompressionConfig, CompressionSummary, Dimensions, ImagePayload, TargetSpec};
pub use user::UserProfile;
