use super::{file_extension, StorageStrategy};
use crate::models::UploadResult;
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use md5::{Digest, Md5};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::Builder;
use tokio::fs;
use tracing::{debug, info};

/// Directory under the web root that receives uploads.
pub const UPLOAD_SUBDIR: &str = "upload";

/// Prefix of in-progress writes; never a valid upload name.
const PARTIAL_PREFIX: &str = ".partial-";

/// Writes uploads to disk under a content-derived name.
pub struct LocalDiskStore {
    upload_dir: PathBuf,
}

impl LocalDiskStore {
    pub fn new(web_root: &Path) -> Self {
        Self {
            upload_dir: web_root.join(UPLOAD_SUBDIR),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    /// `img_<yyyy_MM_dd>_<MD5 hex, uppercase><original extension>`.
    pub fn file_name_for(content: &[u8], original_name: &str, date: NaiveDate) -> String {
        let digest = hex::encode_upper(Md5::digest(content));
        format!(
            "img_{}_{}{}",
            date.format("%Y_%m_%d"),
            digest,
            file_extension(original_name)
        )
    }
}

impl LocalDiskStore {
    /// Write `content` to a temporary file in `dir`, then move it to `path`
    /// unless something already lives there.
    ///
    /// Returns `false` when `path` already existed. A failed write never leaves
    /// a file under `path`.
    fn publish_sync(dir: &Path, path: &Path, content: &[u8]) -> Result<bool> {
        let mut partial = Builder::new().prefix(PARTIAL_PREFIX).tempfile_in(dir)?;
        partial.write_all(content)?;
        partial.as_file().sync_all()?;

        match partial.persist_noclobber(path) {
            Ok(_) => Ok(true),
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.error.into()),
        }
    }

    async fn publish(dir: PathBuf, path: PathBuf, content: Bytes) -> Result<bool> {
        tokio::task::spawn_blocking(move || Self::publish_sync(&dir, &path, &content))
            .await
            .map_err(|e| crate::Error::Storage(format!("Local write task join error: {}", e)))?
    }
}

#[async_trait]
impl StorageStrategy for LocalDiskStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn store(&self, name: &str, content: Bytes) -> Result<UploadResult> {
        fs::create_dir_all(&self.upload_dir).await?;

        let file_name = Self::file_name_for(&content, name, Utc::now().date_naive());
        let path = self.upload_dir.join(&file_name);

        if fs::try_exists(&path).await? {
            debug!("{} already stored as {}, skipping write", name, file_name);
        } else if Self::publish(self.upload_dir.clone(), path.clone(), content.clone()).await? {
            info!("Stored {} ({} bytes) as {}", name, content.len(), path.display());
        } else {
            debug!("{} was stored as {} concurrently, skipping write", name, file_name);
        }

        Ok(UploadResult::succeeded(file_name))
    }
}
