pub mod error;
pub mod validation;
pub mod formats;
pub mod fs;
pub mod status;

pub use error::{
    CompressionError, CompressionResult, ConfigError, SessionError, SessionResult,
};
pub use validation::{load_settings, load_target_spec, validate_config, validate_target_spec};
pub use formats::{EncodeFormat, extract_filename, is_image_media_type, media_type_from_path};
pub use fs::{
    FileSize,
    format_file_size,
    output_paths,
    read_payload,
    validate_file_size,
    validate_total_size,
    write_payload,
};
pub use status::{StatusColor, status_class};
