//! Configuration for the storage module.

use serde::{Deserialize, Serialize};

/// Canned ACL granting the destination bucket owner full control.
pub const BUCKET_OWNER_FULL_CONTROL: &str = "bucket-owner-full-control";

/// Object storage locations and client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Bucket listed by the batch job.
    #[serde(default)]
    pub source_bucket: Option<String>,

    /// Prefix listed by the batch job. The object whose key equals it is skipped.
    #[serde(default)]
    pub source_prefix: Option<String>,

    /// Bucket converted files are uploaded to.
    #[serde(default)]
    pub dest_bucket: Option<String>,

    /// Prefix converted files are uploaded under.
    #[serde(default)]
    pub dest_prefix: Option<String>,

    /// Canned ACL applied to uploads.
    #[serde(default)]
    pub acl: Option<String>,

    /// AWS region override.
    #[serde(default)]
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible stores. Enables path-style addressing.
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Files larger than this are uploaded in parts.
    #[serde(default = "default_multipart_threshold")]
    pub multipart_threshold_bytes: u64,

    /// Size of each uploaded part.
    #[serde(default = "default_part_size")]
    pub multipart_part_size_bytes: u64,
}

fn default_multipart_threshold() -> u64 {
    64 * 1024 * 1024 // 64 MiB
}

fn default_part_size() -> u64 {
    16 * 1024 * 1024 // 16 MiB, above the 5 MiB S3 minimum
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            source_bucket: None,
            source_prefix: None,
            dest_bucket: None,
            dest_prefix: None,
            acl: None,
            region: None,
            endpoint_url: None,
            multipart_threshold_bytes: default_multipart_threshold(),
            multipart_part_size_bytes: default_part_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_defaults() {
        let config: StorageConfig = toml::from_str(
            r#"
dest_bucket = "copc"
dest_prefix = "converted/"
"#,
        )
        .unwrap();

        assert_eq!(config.dest_bucket.as_deref(), Some("copc"));
        assert!(config.source_bucket.is_none());
        assert_eq!(config.multipart_threshold_bytes, 64 * 1024 * 1024);
        assert_eq!(config.multipart_part_size_bytes, 16 * 1024 * 1024);
    }
}
