//! Filesystem object storage.
//!
//! Objects live at `{root}/{bucket}/{path}` and are served by the router under
//! `/storage`, so the public URL of an object is
//! `{public_base_url}/storage/{bucket}/{path}`.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use super::{BackendError, ObjectStorage};

pub struct FsStorage {
    root: PathBuf,
    public_base_url: String,
}

impl FsStorage {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self { root: root.into(), public_base_url: public_base_url.trim_end_matches('/').to_owned() }
    }

    fn object_path(&self, bucket: &str, path: &str) -> Result<PathBuf, BackendError> {
        let relative = Path::new(bucket).join(path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if bucket.is_empty() || path.is_empty() || escapes {
            return Err(BackendError::InvalidPath(format!("{bucket}/{path}")));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for FsStorage {
    async fn upload(&self, bucket: &str, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), BackendError> {
        let target = self.object_path(bucket, path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &bytes).await?;
        tracing::debug!(bucket, path, content_type, size = bytes.len(), "stored object");
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/{bucket}/{path}", self.public_base_url)
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
