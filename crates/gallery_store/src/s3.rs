//! S3 backend built on aws-sdk-s3.
//!
//! Works against AWS proper and S3-compatible services (MinIO and
//! friends) via an explicit endpoint plus path-style addressing.

use crate::client::{ObjectStore, RawListing, RawObject};
use crate::{Result, StoreError};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use bytes::Bytes;
use std::time::Duration;

/// Connection settings for [`S3Store`].
///
/// Credentials are explicit and mandatory; absence must fail loudly at
/// construction, never at the first request.
#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Explicit endpoint for S3-compatible services. `None` means AWS.
    pub endpoint: Option<String>,
    /// Path-style URLs (`endpoint/bucket/key`). Required for MinIO.
    pub force_path_style: bool,
}

/// Object store backed by an S3 bucket.
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl std::fmt::Debug for S3Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Store")
            .field("bucket", &self.bucket)
            .finish_non_exhaustive()
    }
}

impl S3Store {
    pub fn new(config: S3Config) -> Result<Self> {
        let mut missing = Vec::new();
        if config.bucket.is_empty() {
            missing.push("bucket");
        }
        if config.region.is_empty() {
            missing.push("region");
        }
        if config.access_key_id.is_empty() {
            missing.push("access key id");
        }
        if config.secret_access_key.is_empty() {
            missing.push("secret access key");
        }
        if !missing.is_empty() {
            return Err(StoreError::Config(format!(
                "missing S3 settings: {}",
                missing.join(", ")
            )));
        }

        let credentials = aws_sdk_s3::config::Credentials::new(
            config.access_key_id,
            config.secret_access_key,
            None,
            None,
            "bucket-gallery",
        );

        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region))
            .credentials_provider(credentials);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(normalize_endpoint(endpoint));
        }
        if config.force_path_style {
            builder = builder.force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket,
        })
    }

    /// Map an SDK failure onto the store taxonomy by HTTP status.
    fn map_sdk_error<E>(err: SdkError<E>, what: &str) -> StoreError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        match &err {
            SdkError::ServiceError(service_err) => {
                match service_err.raw().status().as_u16() {
                    403 => StoreError::AccessDenied(what.to_string()),
                    404 => StoreError::NotFound(what.to_string()),
                    _ => StoreError::Backend(format!("{what}: {err}")),
                }
            }
            SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
                StoreError::Network(format!("{what}: {err}"))
            }
            _ => StoreError::Backend(format!("{what}: {err}")),
        }
    }
}

/// Handle bare `host:port` endpoints by assuming plain HTTP.
fn normalize_endpoint(endpoint: &str) -> String {
    let lower = endpoint.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        endpoint.to_string()
    } else {
        format!("http://{endpoint}")
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn list(&self, prefix: &str) -> Result<RawListing> {
        let mut listing = RawListing {
            prefix: prefix.to_string(),
            ..Default::default()
        };
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .delimiter("/");
            if let Some(token) = continuation_token.take() {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| Self::map_sdk_error(e, prefix))?;

            for cp in response.common_prefixes() {
                if let Some(p) = cp.prefix() {
                    listing.common_prefixes.push(p.to_string());
                }
            }
            for obj in response.contents() {
                let Some(key) = obj.key() else { continue };
                listing.objects.push(RawObject {
                    key: key.to_string(),
                    size: obj.size(),
                    last_modified: obj.last_modified().map(|d| d.secs()),
                    etag: obj.e_tag().map(|e| e.trim_matches('"').to_string()),
                });
            }

            match response.next_continuation_token() {
                Some(token) if response.is_truncated().unwrap_or(false) => {
                    continuation_token = Some(token.to_string());
                }
                _ => break,
            }
        }

        tracing::debug!(
            prefix = %prefix,
            folders = listing.common_prefixes.len(),
            objects = listing.objects.len(),
            "listed prefix"
        );
        Ok(listing)
    }

    async fn put(&self, key: &str, body: Bytes, content_type: Option<&str>) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body.into())
            .set_content_type(content_type.map(String::from))
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(e, key))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        // S3 acknowledges deletes of missing keys.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(e, key))?;
        Ok(())
    }

    async fn signed_url(&self, key: &str, expiry: Duration) -> Result<String> {
        let presigning = PresigningConfig::expires_in(expiry)
            .map_err(|e| StoreError::Config(format!("invalid signed URL expiry: {e}")))?;
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| Self::map_sdk_error(e, key))?;
        Ok(presigned.uri().to_string())
    }
}
