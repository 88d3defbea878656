use super::{file_extension, StorageStrategy};
use crate::models::UploadResult;
use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Body, Client};
use tracing::{debug, info, warn};

/// Relative path of the relay's upload handler.
pub const RELAY_UPLOAD_PATH: &str = "UpLoadForByte.ashx";

/// Header telling the relay which file type it is receiving.
pub const FILE_TYPE_HEADER: &str = "TxoooUploadFileType";

/// Query parameter naming the source URL for mirroring.
pub const MIRROR_URL_PARAM: &str = "tx_down_url";

/// Body the relay returns (with a 200) when it could not store the content.
const SENTINEL_BODY: &str = "Error";

pub const REMOTE_SERVER_ERROR: &str = "remote server error";

/// Client for the CDN relay service.
pub struct RelayClient {
    client: Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::new_with_client(base_url, Client::new())
    }

    pub fn new_with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), RELAY_UPLOAD_PATH)
    }

    /// Ask the relay to fetch `source_url` and store a copy; returns the mirrored URI.
    pub async fn mirror(&self, source_url: &str) -> Result<String> {
        if source_url.trim().is_empty() {
            return Err(Error::BadRequest("url must not be blank".to_string()));
        }

        debug!("Requesting relay mirror of {}", source_url);

        let response = self
            .client
            .get(self.endpoint())
            .query(&[(MIRROR_URL_PARAM, source_url)])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send mirror request to relay: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Relay mirror request failed (status {})", status);
            return Err(Error::Relay(format!(
                "remote server request failed, {}",
                status
            )));
        }

        let body = response.text().await?;
        if is_sentinel(&body) {
            warn!("Relay reported an error mirroring {}", source_url);
            return Err(Error::RemoteSentinel);
        }

        let uri = force_https(&body);
        info!("Mirrored {} to {}", source_url, uri);
        Ok(uri)
    }
}

#[async_trait]
impl StorageStrategy for RelayClient {
    fn name(&self) -> &'static str {
        "cdn"
    }

    async fn store(&self, name: &str, content: Bytes) -> Result<UploadResult> {
        let file_type = file_extension(name).to_uppercase();
        let size = content.len();

        let response = match self
            .client
            .post(self.endpoint())
            .header(FILE_TYPE_HEADER, file_type)
            .body(Body::from(content))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to send {} to relay: {}", name, e);
                return Ok(UploadResult::failed(Some(format!(
                    "remote server request failed, {}",
                    e
                ))));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            warn!("Relay upload of {} failed (status {})", name, status);
            return Ok(UploadResult::failed(Some(format!(
                "remote server request failed, {}",
                status
            ))));
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read relay response for {}: {}", name, e);
                return Ok(UploadResult::failed(Some(format!(
                    "remote server request failed, {}",
                    e
                ))));
            }
        };

        if is_sentinel(&body) {
            warn!("Relay reported an error storing {}", name);
            return Ok(UploadResult::failed(Some(REMOTE_SERVER_ERROR.to_string())));
        }

        let uri = force_https(&body);
        info!("Relayed {} ({} bytes) to {}", name, size, uri);
        Ok(UploadResult::succeeded(uri))
    }
}

fn is_sentinel(body: &str) -> bool {
    body.eq_ignore_ascii_case(SENTINEL_BODY)
}

fn force_https(body: &str) -> String {
    body.replace("http:", "https:")
}
