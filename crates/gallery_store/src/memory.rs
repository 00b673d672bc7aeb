//! In-memory object store backend.
//!
//! Implements the same delimiter/common-prefix listing semantics as S3 so
//! the gallery logic can be exercised without a bucket. Failures can be
//! injected per key or per prefix to test partial-batch reporting and
//! blocked listings.

use crate::client::{ObjectStore, RawListing, RawObject};
use crate::{Result, StoreError};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

struct StoredObject {
    body: Bytes,
    content_type: Option<String>,
    last_modified: i64,
}

/// Object store backed by a sorted in-process map.
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<BTreeMap<String, StoredObject>>,
    fail_keys: RwLock<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent put/delete under `key`, and any listing of
    /// it, fail with a backend error. `key` is matched as a prefix, so an
    /// exact object key blocks just that object while a folder prefix
    /// blocks the whole subtree.
    pub fn inject_failure(&self, key: &str) {
        self.fail_keys.write().insert(key.to_string());
    }

    /// Number of stored objects, markers included.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.read().contains_key(key)
    }

    /// Stored content type of an object, if any.
    pub fn content_type_of(&self, key: &str) -> Option<String> {
        self.objects.read().get(key).and_then(|o| o.content_type.clone())
    }

    fn check_injected(&self, key: &str) -> Result<()> {
        if self.fail_keys.read().iter().any(|f| key.starts_with(f)) {
            return Err(StoreError::Backend(format!("injected failure: {key}")));
        }
        Ok(())
    }

    fn now_secs() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list(&self, prefix: &str) -> Result<RawListing> {
        self.check_injected(prefix)?;
        let objects = self.objects.read();
        let mut common_prefixes = BTreeSet::new();
        let mut contents = Vec::new();

        for (key, stored) in objects.range(prefix.to_string()..) {
            let Some(remainder) = key.strip_prefix(prefix) else {
                break;
            };
            match remainder.find('/') {
                // Anything below the next delimiter rolls up into a common
                // prefix. This swallows subfolder marker objects, exactly
                // as S3 does.
                Some(pos) => {
                    common_prefixes.insert(format!("{prefix}{}", &remainder[..=pos]));
                }
                None => {
                    contents.push(RawObject {
                        key: key.clone(),
                        size: Some(stored.body.len() as i64),
                        last_modified: Some(stored.last_modified),
                        etag: None,
                    });
                }
            }
        }

        // The queried prefix's own marker lands in contents (empty
        // remainder), matching what S3 returns for a marker-backed folder.
        Ok(RawListing {
            prefix: prefix.to_string(),
            common_prefixes: common_prefixes.into_iter().collect(),
            objects: contents,
        })
    }

    async fn put(&self, key: &str, body: Bytes, content_type: Option<&str>) -> Result<()> {
        self.check_injected(key)?;
        self.objects.write().insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.map(String::from),
                last_modified: Self::now_secs(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check_injected(key)?;
        // Missing keys are acknowledged, same as S3.
        self.objects.write().remove(key);
        Ok(())
    }

    async fn signed_url(&self, key: &str, expiry: Duration) -> Result<String> {
        if !self.objects.read().contains_key(key) {
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(format!("memory://{key}?expires={}", expiry.as_secs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.create_folder("images/").await.unwrap();
        store
            .put("images/cat.jpg", Bytes::from_static(b"cat"), Some("image/jpeg"))
            .await
            .unwrap();
        store
            .put("images/deep/dog.png", Bytes::from_static(b"dog"), None)
            .await
            .unwrap();
        store
            .put("readme.txt", Bytes::from_static(b"hello, world"), Some("text/plain"))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn root_listing_splits_folders_and_files() {
        let store = seeded().await;
        let listing = store.list("").await.unwrap();

        assert_eq!(listing.common_prefixes, vec!["images/".to_string()]);
        let keys: Vec<_> = listing.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["readme.txt"]);
        assert_eq!(listing.objects[0].size, Some(12));
        assert_eq!(
            store.content_type_of("readme.txt").as_deref(),
            Some("text/plain")
        );
    }

    #[tokio::test]
    async fn nested_listing_includes_own_marker_in_contents() {
        let store = seeded().await;
        let listing = store.list("images/").await.unwrap();

        assert_eq!(listing.common_prefixes, vec!["images/deep/".to_string()]);
        let keys: Vec<_> = listing.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, vec!["images/", "images/cat.jpg"]);
    }

    #[tokio::test]
    async fn create_folder_rejects_non_marker_key() {
        let store = MemoryStore::new();
        let err = store.create_folder("no-slash").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidKey(_)));
    }

    #[tokio::test]
    async fn delete_of_missing_key_is_acknowledged() {
        let store = MemoryStore::new();
        store.delete("ghost.txt").await.unwrap();
    }

    #[tokio::test]
    async fn injected_failure_errors_put_and_delete() {
        let store = seeded().await;
        store.inject_failure("images/cat.jpg");

        assert!(store.delete("images/cat.jpg").await.is_err());
        assert!(store
            .put("images/cat.jpg", Bytes::new(), None)
            .await
            .is_err());
        assert!(store.contains("images/cat.jpg"));
    }

    #[tokio::test]
    async fn injected_prefix_fails_listing_and_writes_beneath_it() {
        let store = seeded().await;
        store.inject_failure("images/");

        assert!(store.list("images/").await.is_err());
        assert!(store
            .put("images/new.png", Bytes::new(), None)
            .await
            .is_err());
        // Other prefixes are untouched.
        assert!(store.list("").await.is_ok());
        store.put("other.txt", Bytes::new(), None).await.unwrap();
    }

    #[tokio::test]
    async fn signed_url_requires_existing_object() {
        let store = seeded().await;
        let url = store
            .signed_url("readme.txt", Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(url, "memory://readme.txt?expires=3600");

        let err = store
            .signed_url("ghost.txt", Duration::from_secs(3600))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
