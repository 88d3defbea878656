//! Storage strategies for uploaded files
//!
//! Each backend takes the original file name plus its bytes and reports where the
//! content now lives. Exactly one strategy is active per process.

pub mod blob;
pub mod local;
pub mod mock;
pub mod relay;

pub use blob::{BlobPayload, CloudBlobStore, ConnectionString};
pub use local::LocalDiskStore;
pub use mock::MockStorage;
pub use relay::RelayClient;

use crate::models::UploadResult;
use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait StorageStrategy: Send + Sync {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Store `content` under the client-supplied `name`.
    ///
    /// Expected failures come back as `Ok` with `success == false`; `Err` is
    /// reserved for faults the caller cannot recover from.
    async fn store(&self, name: &str, content: Bytes) -> Result<UploadResult>;
}

/// Extension of `file_name` including the leading dot, or an empty string.
pub(crate) fn file_extension(file_name: &str) -> &str {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    match base.rfind('.') {
        Some(idx) if idx + 1 < base.len() => &base[idx..],
        _ => "",
    }
}
