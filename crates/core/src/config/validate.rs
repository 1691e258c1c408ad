use super::{types::Config, ConfigError};

/// S3 rejects multipart parts smaller than this (except the last).
const MIN_PART_SIZE: u64 = 5 * 1024 * 1024;

/// Validate configuration
/// Currently validates:
/// - Engine timeout, if set, is not 0
/// - Engine executable is not empty
/// - Multipart part size meets the S3 minimum
/// - Staging directory is set
///
/// Bucket settings are checked per command with `Config::require_*`.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.engine.timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "engine.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.engine.executable.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "engine.executable cannot be empty".to_string(),
        ));
    }

    if config.storage.multipart_part_size_bytes < MIN_PART_SIZE {
        return Err(ConfigError::ValidationError(format!(
            "storage.multipart_part_size_bytes must be at least {}",
            MIN_PART_SIZE
        )));
    }

    if config.batch.staging_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "batch.staging_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}
