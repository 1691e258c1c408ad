use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::batch::BatchConfig;
use crate::engine::EngineConfig;
use crate::storage::{PrefixLocation, StorageConfig};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

impl Config {
    /// Source bucket and prefix for the listing run.
    ///
    /// Both must be set. An explicitly empty prefix lists the whole bucket.
    pub fn require_source(&self) -> Result<PrefixLocation, ConfigError> {
        let bucket = non_empty(&self.storage.source_bucket).ok_or(ConfigError::MissingSetting {
            key: "storage.source_bucket",
            env: "S3_SOURCE_BUCKET",
            nested: "STORAGE__SOURCE_BUCKET",
        })?;
        let prefix = self
            .storage
            .source_prefix
            .clone()
            .ok_or(ConfigError::MissingSetting {
                key: "storage.source_prefix",
                env: "S3_SOURCE_FOLDER",
                nested: "STORAGE__SOURCE_PREFIX",
            })?;
        Ok(PrefixLocation::new(bucket, prefix))
    }

    /// Destination bucket and prefix every remote variant publishes to.
    ///
    /// Both must be set. An explicitly empty prefix publishes at the bucket root.
    pub fn require_destination(&self) -> Result<PrefixLocation, ConfigError> {
        let bucket = non_empty(&self.storage.dest_bucket).ok_or(ConfigError::MissingSetting {
            key: "storage.dest_bucket",
            env: "S3_TARGET_BUCKET",
            nested: "STORAGE__DEST_BUCKET",
        })?;
        let prefix = self
            .storage
            .dest_prefix
            .clone()
            .ok_or(ConfigError::MissingSetting {
                key: "storage.dest_prefix",
                env: "S3_TARGET_FOLDER",
                nested: "STORAGE__DEST_PREFIX",
            })?;
        Ok(PrefixLocation::new(bucket, prefix))
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_destination() {
        let mut config = Config::default();
        assert!(matches!(
            config.require_destination(),
            Err(ConfigError::MissingSetting {
                key: "storage.dest_bucket",
                ..
            })
        ));

        config.storage.dest_bucket = Some("copc".to_string());
        assert!(matches!(
            config.require_destination(),
            Err(ConfigError::MissingSetting {
                key: "storage.dest_prefix",
                env: "S3_TARGET_FOLDER",
                ..
            })
        ));

        config.storage.dest_prefix = Some(String::new());
        assert_eq!(
            config.require_destination().unwrap(),
            PrefixLocation::new("copc", "")
        );
    }

    #[test]
    fn test_require_source_needs_prefix() {
        let mut config = Config::default();
        config.storage.source_bucket = Some("raw".to_string());
        let err = config.require_source().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingSetting {
                key: "storage.source_prefix",
                ..
            }
        ));
        assert!(err.to_string().contains("S3_SOURCE_FOLDER"));
    }

    #[test]
    fn test_require_source_rejects_blank_bucket() {
        let mut config = Config::default();
        config.storage.source_bucket = Some("  ".to_string());
        assert!(config.require_source().is_err());

        config.storage.source_bucket = Some("raw".to_string());
        config.storage.source_prefix = Some("incoming/".to_string());
        assert_eq!(
            config.require_source().unwrap(),
            PrefixLocation::new("raw", "incoming/")
        );
    }

    #[test]
    fn test_missing_setting_message_names_env() {
        let err = Config::default().require_source().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("S3_SOURCE_BUCKET"));
        assert!(message.contains("COPCIFY_STORAGE__SOURCE_BUCKET"));
    }
}
