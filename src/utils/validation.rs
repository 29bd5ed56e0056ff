use std::path::Path;

use serde::de::DeserializeOwned;

use crate::core::{CompressionConfig, TargetSpec};
use crate::utils::ConfigError;

type Result<T> = std::result::Result<T, ConfigError>;

fn validate_quality(name: &str, quality: f32) -> Result<()> {
    if !(quality > 0.0 && quality <= 1.0) {
        return Err(ConfigError::invalid(format!(
            "{name} must be in (0, 1], got {quality}"
        )));
    }
    Ok(())
}

fn validate_bounds(name: &str, width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ConfigError::invalid(format!(
            "{name} cannot be 0 (got {width}x{height})"
        )));
    }
    Ok(())
}

/// Validates single-attempt settings.
pub fn validate_config(config: &CompressionConfig) -> Result<()> {
    validate_bounds("Max dimensions", config.max_width, config.max_height)?;
    validate_quality("Quality", config.quality)?;

    if !(config.max_size_kb.is_finite() && config.max_size_kb > 0.0) {
        return Err(ConfigError::invalid(format!(
            "maxSizeKB must be positive, got {}",
            config.max_size_kb
        )));
    }

    Ok(())
}

/// Validates target-seeking settings and their ordering invariants.
///
/// A missing target is valid: the search simply does not run.
pub fn validate_target_spec(spec: &TargetSpec) -> Result<()> {
    validate_bounds("Max dimensions", spec.max_width, spec.max_height)?;
    validate_bounds("Min dimensions", spec.min_width, spec.min_height)?;
    validate_quality("Initial quality", spec.initial_quality)?;
    validate_quality("Min quality", spec.min_quality)?;

    if spec.min_quality > spec.initial_quality {
        return Err(ConfigError::invalid(format!(
            "minQuality ({}) exceeds initialQuality ({})",
            spec.min_quality, spec.initial_quality
        )));
    }

    if !(spec.quality_step > 0.0) {
        return Err(ConfigError::invalid("qualityStep must be positive"));
    }

    if spec.min_width > spec.max_width || spec.min_height > spec.max_height {
        return Err(ConfigError::invalid(format!(
            "Min dimensions {}x{} exceed max dimensions {}x{}",
            spec.min_width, spec.min_height, spec.max_width, spec.max_height
        )));
    }

    Ok(())
}

/// Reads a JSON settings file into `T`.
pub async fn load_settings<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let raw = tokio::fs::read_to_string(path.as_ref()).await?;
    Ok(serde_json::from_str(&raw)?)
}

/// Reads and validates a target-seeking settings file.
pub async fn load_target_spec(path: impl AsRef<Path>) -> Result<TargetSpec> {
    let spec: TargetSpec = load_settings(path).await?;
    validate_target_spec(&spec)?;
    Ok(spec)
}
