//! Data models and structures
//!
//! Defines the uploaded file, the per-file upload outcome, the storage backend
//! selector and the environment-driven configuration.

use bytes::Bytes;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A file received from the client, fully buffered in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// File name as supplied by the client.
    pub name: String,
    pub content: Bytes,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Outcome of storing a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub success: bool,
    /// URI for remote backends, bare file name for local storage.
    pub locator: Option<String>,
    pub error_message: Option<String>,
}

impl UploadResult {
    pub fn succeeded(locator: impl Into<String>) -> Self {
        Self {
            success: true,
            locator: Some(locator.into()),
            error_message: None,
        }
    }

    pub fn failed(error_message: Option<String>) -> Self {
        Self {
            success: false,
            locator: None,
            error_message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StorageBackend {
    /// HTTP passthrough to the relay upload endpoint
    Cdn,
    /// S3-compatible blob storage
    Blob,
    /// Content-hash named files under the web root
    Local,
}

impl FromStr for StorageBackend {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cdn" => Ok(Self::Cdn),
            "blob" => Ok(Self::Blob),
            "local" => Ok(Self::Local),
            other => Err(crate::Error::Config(format!(
                "Unknown STORAGE_BACKEND '{}'. Expected one of: cdn, blob, local",
                other
            ))),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cdn => "cdn",
            Self::Blob => "blob",
            Self::Local => "local",
        };
        f.write_str(name)
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub storage_backend: StorageBackend,
    pub relay_base_url: Option<String>,
    pub storage_connection_string: String,
    pub web_root: PathBuf,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let storage_backend = match std::env::var("STORAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StorageBackend::Cdn,
        };

        Ok(Self {
            storage_backend,
            relay_base_url: std::env::var("RELAY_BASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            storage_connection_string: std::env::var("STORAGE_CONNECTION_STRING")
                .unwrap_or_default(),
            web_root: std::env::var("WEB_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("wwwroot")),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".to_string()),
        })
    }

    /// Check cross-field requirements for the selected backend.
    ///
    /// Run after command-line overrides have been applied.
    pub fn validate(&self) -> crate::Result<()> {
        if self.storage_backend == StorageBackend::Cdn && self.relay_base_url.is_none() {
            return Err(crate::Error::Config(
                "RELAY_BASE_URL not set (required for the cdn backend)".to_string(),
            ));
        }
        Ok(())
    }
}
