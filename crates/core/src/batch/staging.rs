//! Per-item scratch directories.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::ItemError;

/// A uniquely named directory under the staging root, removed on drop.
///
/// Every exit path of an item (success, failure, early return) drops the
/// guard, so downloaded inputs and converted outputs never accumulate.
#[derive(Debug)]
pub struct StagingArea {
    path: PathBuf,
}

impl StagingArea {
    /// Creates `<root>/<uuid>/`.
    pub async fn create(root: &Path) -> Result<Self, ItemError> {
        let path = root.join(Uuid::new_v4().to_string());
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|source| ItemError::Staging {
                path: path.clone(),
                source,
            })?;
        debug!("Created staging directory {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        // Blocking removal: items run one at a time on a current-thread runtime.
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => debug!("Removed staging directory {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                "Failed to remove staging directory {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_removed_on_drop() {
        let root = TempDir::new().unwrap();
        let area = StagingArea::create(root.path()).await.unwrap();
        let path = area.path().to_path_buf();
        std::fs::write(path.join("a.laz"), b"data").unwrap();
        assert!(path.exists());

        drop(area);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_unique_per_item() {
        let root = TempDir::new().unwrap();
        let a = StagingArea::create(root.path()).await.unwrap();
        let b = StagingArea::create(root.path()).await.unwrap();
        assert_ne!(a.path(), b.path());
    }
}
