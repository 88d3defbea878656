use super::StorageStrategy;
use crate::models::UploadResult;
use crate::{Error, Result};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use aws_sdk_s3::{config::Region, Client as S3Client};
use bytes::Bytes;
use std::fmt;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Every upload gets its own container named with this prefix and a fresh UUID.
pub const CONTAINER_PREFIX: &str = "uploadblob";

const DEFAULT_REGION: &str = "us-east-1";

/// Parsed `Key=Value;Key=Value` storage connection string.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub account_name: String,
    pub account_key: String,
    pub endpoint: String,
    pub region: String,
}

impl ConnectionString {
    pub fn parse(input: &str) -> Result<Self> {
        let mut account_name = None;
        let mut account_key = None;
        let mut blob_endpoint = None;
        let mut protocol = None;
        let mut suffix = None;
        let mut region = None;

        for segment in input.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = segment.split_once('=').ok_or_else(|| {
                Error::Config(format!("Malformed connection string segment '{}'", segment))
            })?;
            let key = key.trim();
            let value = value.trim().to_string();
            if key.is_empty() {
                return Err(Error::Config(
                    "Connection string segment has an empty key".to_string(),
                ));
            }

            match key.to_ascii_lowercase().as_str() {
                "accountname" => account_name = Some(value),
                "accountkey" => account_key = Some(value),
                "blobendpoint" => blob_endpoint = Some(value),
                "defaultendpointsprotocol" => protocol = Some(value),
                "endpointsuffix" => suffix = Some(value),
                "region" => region = Some(value),
                _ => debug!("Ignoring connection string key '{}'", key),
            }
        }

        let account_name = account_name
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Config("AccountName missing".to_string()))?;
        let account_key = account_key
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Config("AccountKey missing".to_string()))?;

        let endpoint = match (blob_endpoint, protocol, suffix) {
            (Some(endpoint), _, _) => endpoint,
            (None, Some(protocol), Some(suffix)) => {
                format!("{}://{}.blob.{}", protocol, account_name, suffix)
            }
            _ => {
                return Err(Error::Config(
                    "BlobEndpoint or DefaultEndpointsProtocol with EndpointSuffix required"
                        .to_string(),
                ))
            }
        };
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(Error::Config(format!(
                "Endpoint '{}' is not an http(s) URL",
                endpoint
            )));
        }

        Ok(Self {
            account_name,
            account_key,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            region: region
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
        })
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("account_name", &self.account_name)
            .field("account_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .finish()
    }
}

/// Content to upload; a blob is written from exactly one of these.
pub enum BlobPayload {
    Buffer(Bytes),
    Stream(ByteStream),
}

impl BlobPayload {
    fn into_byte_stream(self) -> ByteStream {
        match self {
            Self::Buffer(bytes) => ByteStream::from(bytes),
            Self::Stream(stream) => stream,
        }
    }
}

/// S3-compatible blob storage backend.
///
/// Containers created per upload are left in place after the upload.
pub struct CloudBlobStore {
    connection_string: String,
}

impl CloudBlobStore {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
        }
    }

    async fn connect(connection: &ConnectionString) -> S3Client {
        let credentials = aws_sdk_s3::config::Credentials::new(
            connection.account_name.clone(),
            connection.account_key.clone(),
            None,
            None,
            "storage-connection-string",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(connection.region.clone()))
            .endpoint_url(connection.endpoint.clone())
            .retry_config(RetryConfig::disabled())
            .load()
            .await;

        let config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        S3Client::from_conf(config)
    }

    /// Store a payload, reporting a bare failure when the connection string is
    /// unusable or the backend rejects any step.
    pub async fn store_payload(&self, name: &str, payload: BlobPayload) -> UploadResult {
        let connection = match ConnectionString::parse(&self.connection_string) {
            Ok(connection) => connection,
            Err(e) => {
                warn!("Blob storage connection string rejected: {}", e);
                return UploadResult::failed(None);
            }
        };

        let client = Self::connect(&connection).await;

        match Self::upload(&client, &connection, name, payload).await {
            Ok(uri) => {
                info!("Uploaded {} to blob storage at {}", name, uri);
                UploadResult::succeeded(uri)
            }
            Err(e) => {
                warn!("Blob upload of {} failed: {}", name, e);
                UploadResult::failed(None)
            }
        }
    }

    async fn upload(
        client: &S3Client,
        connection: &ConnectionString,
        name: &str,
        payload: BlobPayload,
    ) -> Result<String> {
        let container = format!("{}{}", CONTAINER_PREFIX, Uuid::new_v4());

        let mut create = client.create_bucket().bucket(&container);
        if connection.region != DEFAULT_REGION {
            create = create.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(
                        connection.region.as_str(),
                    ))
                    .build(),
            );
        }
        create.send().await.map_err(|e| {
            Error::Storage(format!(
                "Failed to create container {}: {}",
                container,
                DisplayErrorContext(&e)
            ))
        })?;
        debug!("Created container {}", container);

        client
            .put_bucket_policy()
            .bucket(&container)
            .policy(public_read_policy(&container).to_string())
            .send()
            .await
            .map_err(|e| {
                Error::Storage(format!(
                    "Failed to set permissions on {}: {}",
                    container,
                    DisplayErrorContext(&e)
                ))
            })?;

        client
            .put_object()
            .bucket(&container)
            .key(name)
            .body(payload.into_byte_stream())
            .send()
            .await
            .map_err(|e| {
                Error::Storage(format!(
                    "Failed to upload blob {}: {}",
                    name,
                    DisplayErrorContext(&e)
                ))
            })?;

        blob_uri(&connection.endpoint, &container, name)
    }
}

/// Public URI of a blob. Each `/`-separated part of `name` is percent-encoded
/// as its own path segment.
fn blob_uri(endpoint: &str, container: &str, name: &str) -> Result<String> {
    let mut uri = reqwest::Url::parse(endpoint)
        .map_err(|e| Error::Storage(format!("Invalid blob endpoint {}: {}", endpoint, e)))?;
    uri.path_segments_mut()
        .map_err(|_| Error::Storage(format!("Blob endpoint {} cannot hold a path", endpoint)))?
        .pop_if_empty()
        .push(container)
        .extend(name.split('/'));
    Ok(uri.into())
}

/// Anonymous read access to objects, without bucket listing.
fn public_read_policy(container: &str) -> serde_json::Value {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Sid": "PublicBlobRead",
            "Effect": "Allow",
            "Principal": "*",
            "Action": "s3:GetObject",
            "Resource": format!("arn:aws:s3:::{}/*", container),
        }]
    })
}

#[async_trait]
impl StorageStrategy for CloudBlobStore {
    fn name(&self) -> &'static str {
        "blob"
    }

    async fn store(&self, name: &str, content: Bytes) -> Result<UploadResult> {
        Ok(self.store_payload(name, BlobPayload::Buffer(content)).await)
    }
}
