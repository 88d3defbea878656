//! Application orchestration for dispatching uploads to the active storage backend.

use crate::models::{Config, StorageBackend, UploadResult, UploadedFile};
use crate::storage::{CloudBlobStore, LocalDiskStore, RelayClient, StorageStrategy};
use crate::{Error, Result};
use futures_util::{Stream, StreamExt};
use tracing::{debug, info, warn};

/// Holds the storage strategy chosen at startup and the relay used for mirroring.
pub struct App {
    storage: Box<dyn StorageStrategy>,
    relay: Option<RelayClient>,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub storage: Box<dyn StorageStrategy>,
    pub relay: Option<RelayClient>,
}

impl App {
    /// Build an app from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses that
    /// need to inject mocks.
    pub fn with_services(services: AppServices) -> Self {
        Self {
            storage: services.storage,
            relay: services.relay,
        }
    }

    /// Construct an app from configuration, resolving the storage backend once.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;

        // Reuse one HTTP connection pool for uploads and mirroring.
        let http_client = reqwest::Client::new();
        let relay = config
            .relay_base_url
            .as_ref()
            .map(|url| RelayClient::new_with_client(url.clone(), http_client.clone()));

        let storage: Box<dyn StorageStrategy> = match config.storage_backend {
            StorageBackend::Cdn => {
                let url = config.relay_base_url.clone().ok_or_else(|| {
                    Error::Config("RELAY_BASE_URL is required for the cdn backend".to_string())
                })?;
                info!("Storage backend: CDN relay ({})", url);
                Box::new(RelayClient::new_with_client(url, http_client))
            }
            StorageBackend::Blob => {
                if config.storage_connection_string.trim().is_empty() {
                    warn!("STORAGE_CONNECTION_STRING is empty; every blob upload will fail");
                }
                info!("Storage backend: blob storage");
                Box::new(CloudBlobStore::new(config.storage_connection_string.clone()))
            }
            StorageBackend::Local => {
                let store = LocalDiskStore::new(&config.web_root);
                info!("Storage backend: local disk ({})", store.upload_dir().display());
                Box::new(store)
            }
        };

        if relay.is_none() {
            info!("RELAY_BASE_URL not set; URL mirroring is unavailable");
        }

        Ok(Self::with_services(AppServices { storage, relay }))
    }

    pub fn storage_name(&self) -> &'static str {
        self.storage.name()
    }

    /// Store one file. Empty files are skipped and yield `None`.
    pub async fn upload_file(&self, file: UploadedFile) -> Result<Option<UploadResult>> {
        if file.is_empty() {
            debug!("Skipping empty upload {:?}", file.name);
            return Ok(None);
        }

        info!(
            "Dispatching {} ({} bytes) to {} storage",
            file.name,
            file.len(),
            self.storage.name()
        );
        let result = self.storage.store(&file.name, file.content).await?;
        if !result.success {
            warn!(
                "Upload of {} failed: {}",
                file.name,
                result.error_message.as_deref().unwrap_or("no details")
            );
        }
        Ok(Some(result))
    }

    /// Store files in order; the last dispatched file decides the outcome.
    ///
    /// The next file is pulled from `files` only after the previous one has been
    /// stored. Earlier results are not aggregated and earlier uploads are never
    /// rolled back. An error from the source or the storage ends the batch.
    pub async fn upload_files<S>(&self, files: S) -> Result<Option<UploadResult>>
    where
        S: Stream<Item = Result<UploadedFile>>,
    {
        let mut files = std::pin::pin!(files);
        let mut last = None;
        while let Some(file) = files.next().await {
            if let Some(result) = self.upload_file(file?).await? {
                last = Some(result);
            }
        }
        Ok(last)
    }

    /// Mirror a remote URL through the relay.
    pub async fn mirror(&self, source_url: &str) -> Result<String> {
        if source_url.trim().is_empty() {
            return Err(Error::BadRequest("url must not be blank".to_string()));
        }
        let relay = self
            .relay
            .as_ref()
            .ok_or_else(|| Error::Config("RELAY_BASE_URL not set".to_string()))?;
        relay.mirror(source_url).await
    }
}
