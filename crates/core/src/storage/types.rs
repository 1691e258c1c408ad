//! Types for the storage module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A bucket and key pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// A bucket and key prefix, such as the configured source or destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixLocation {
    pub bucket: String,
    pub prefix: String,
}

impl PrefixLocation {
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }
}

/// One entry of a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl ObjectEntry {
    /// Creates an entry with only a key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size: None,
            last_modified: None,
        }
    }

    /// Whether this entry is a zero-byte "folder" placeholder.
    pub fn is_folder_marker(&self, prefix: &str) -> bool {
        self.key == prefix || self.key.ends_with('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let loc = ObjectLocation::new("raw", "site/a.laz");
        assert_eq!(loc.to_string(), "s3://raw/site/a.laz");
    }

    #[test]
    fn test_folder_marker() {
        assert!(ObjectEntry::new("incoming/").is_folder_marker("incoming/"));
        assert!(ObjectEntry::new("incoming").is_folder_marker("incoming"));
        assert!(ObjectEntry::new("incoming/sub/").is_folder_marker("incoming/"));
        assert!(!ObjectEntry::new("incoming/a.laz").is_folder_marker("incoming/"));
    }
}
