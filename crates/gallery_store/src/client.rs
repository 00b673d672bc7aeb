//! The object-store seam between the gallery and its backends.
//!
//! Backends are handed to callers by injection (`Arc<dyn ObjectStore>`)
//! so tests can substitute [`crate::MemoryStore`] for the real bucket.

use crate::{Result, StoreError};
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// Default lifetime of a generated signed URL (one hour).
/// Consumers must not cache URLs beyond their expiry.
pub const DEFAULT_URL_TTL: Duration = Duration::from_secs(60 * 60);

/// A single content item from a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawObject {
    /// Full key from the bucket root.
    pub key: String,
    pub size: Option<i64>,
    /// Unix timestamp in seconds.
    pub last_modified: Option<i64>,
    pub etag: Option<String>,
}

/// A delimiter listing of one prefix level, drained across all
/// continuation pages.
#[derive(Debug, Clone, Default)]
pub struct RawListing {
    /// The prefix that was queried.
    pub prefix: String,
    /// "Folder" groupings the store reports under the `/` delimiter,
    /// each ending with `/`.
    pub common_prefixes: Vec<String>,
    /// Objects directly under the prefix. May include the prefix's own
    /// zero-byte marker object.
    pub objects: Vec<RawObject>,
}

/// Async operations every storage backend provides.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// List one prefix level using `/` as the delimiter.
    async fn list(&self, prefix: &str) -> Result<RawListing>;

    /// Write an object.
    async fn put(&self, key: &str, body: Bytes, content_type: Option<&str>) -> Result<()>;

    /// Delete an object. Deleting a missing key is acknowledged, not an
    /// error; the bucket is a shared resource and last delete wins.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Generate a time-limited, pre-authorized direct-access URL.
    async fn signed_url(&self, key: &str, expiry: Duration) -> Result<String>;

    /// Create a folder by writing its marker object.
    ///
    /// A folder is purely a convention of the flat store: a zero-byte
    /// object whose key ends in `/`. Listings report it back as a common
    /// prefix.
    async fn create_folder(&self, key: &str) -> Result<()> {
        if !key.ends_with('/') {
            return Err(StoreError::InvalidKey(format!(
                "folder marker must end with '/': {key}"
            )));
        }
        self.put(key, Bytes::new(), None).await
    }
}
