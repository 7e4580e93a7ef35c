use chrono::Utc;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::UploadConfig;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("File too large: {size} bytes exceeds the {max} byte limit")]
    TooLarge { size: usize, max: usize },

    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// A file part received with a create or update request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Writes uploaded files into the public upload directory under collision-free names
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    mount: String,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            mount: config.mount.trim_matches('/').to_string(),
            max_bytes: config.max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn mount(&self) -> &str {
        &self.mount
    }

    /// Store the file and return its path relative to the public root, e.g. `uploads/<name>`
    pub async fn save(&self, file: &UploadedFile) -> Result<String, UploadError> {
        if file.bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge { size: file.bytes.len(), max: self.max_bytes });
        }

        tokio::fs::create_dir_all(&self.dir).await?;

        let stored_name = Self::unique_name(&file.file_name);
        let target = self.dir.join(&stored_name);

        // create_new: an existing file is never overwritten
        let mut out = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .await?;
        out.write_all(&file.bytes).await?;
        out.flush().await?;

        tracing::info!(
            file = %stored_name,
            bytes = file.bytes.len(),
            content_type = file.content_type.as_deref().unwrap_or("unknown"),
            "Stored upload"
        );
        Ok(format!("{}/{}", self.mount, stored_name))
    }

    /// Best-effort removal of a file previously returned by [`UploadStore::save`]
    pub async fn remove(&self, relative_path: &str) {
        let Some(name) = relative_path
            .strip_prefix(self.mount.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return;
        };
        if name.is_empty() || name.contains(['/', '\\']) {
            return;
        }
        if let Err(e) = tokio::fs::remove_file(self.dir.join(name)).await {
            tracing::warn!("Failed to remove upload {}: {}", relative_path, e);
        }
    }

    /// `<unix millis>-<8 random hex>-<sanitized original name>`
    pub fn unique_name(original: &str) -> String {
        let random = Uuid::new_v4().simple().to_string();
        format!("{}-{}-{}", Utc::now().timestamp_millis(), &random[..8], Self::sanitize(original))
    }

    /// Final path component only, anything outside `[A-Za-z0-9._-]` replaced with `_`
    pub fn sanitize(original: &str) -> String {
        let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
        let cleaned: String = base
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
            .collect();
        if cleaned.is_empty() { "upload".to_string() } else { cleaned }
    }
}
