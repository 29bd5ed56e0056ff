// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod processing;
pub mod session;
pub mod commands;

// Public exports for external consumers
pub use crate::core::{
    CompressionConfig, CompressionSummary, Dimensions, ImagePayload, SessionContext, TargetSpec,
    UserProfile,
};
pub use crate::processing::{Compressor, ImageCodec, RasterCodec, TargetOutcome};
pub use crate::session::{ApiConfig, HttpAuthService, Navigation, RouteGuard, UserService};
pub use crate::utils::{
    CompressionError, CompressionResult, format_file_size, status_class,
    validate_file_size, validate_total_size,
};
pub use crate::commands::*;
