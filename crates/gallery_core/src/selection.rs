//! Selection set and bulk actions.
//!
//! A selection is scoped to one folder view; the orchestrator clears it
//! on every navigation. Bulk operations are fans of independent remote
//! calls, so they attempt every key and aggregate failures instead of
//! aborting on the first one.

use gallery_store::{ObjectStore, StoreError};
use std::collections::BTreeSet;
use std::time::Duration;

/// Keys selected in the current folder view.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    active: bool,
    keys: BTreeSet<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether multi-select mode is on.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Enter multi-select mode with an empty selection.
    pub fn begin(&mut self) {
        self.active = true;
        self.keys.clear();
    }

    /// Leave multi-select mode and drop the selection.
    pub fn done(&mut self) {
        self.active = false;
        self.keys.clear();
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Toggle one key; returns whether it is now selected.
    pub fn toggle(&mut self, key: &str) -> bool {
        self.active = true;
        if self.keys.remove(key) {
            false
        } else {
            self.keys.insert(key.to_string());
            true
        }
    }

    /// Select every visible key.
    pub fn select_all<'a>(&mut self, visible: impl IntoIterator<Item = &'a str>) {
        self.active = true;
        self.keys.extend(visible.into_iter().map(String::from));
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Snapshot of the selected keys in stable (sorted) order.
    pub fn keys(&self) -> Vec<String> {
        self.keys.iter().cloned().collect()
    }
}

/// Result of a bulk operation where every key was attempted.
#[derive(Debug, Default)]
pub struct BulkOutcome {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, StoreError)>,
}

impl BulkOutcome {
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }

    /// "N succeeded, M failed" for notifications.
    pub fn summary(&self) -> String {
        format!(
            "{} succeeded, {} failed",
            self.succeeded.len(),
            self.failed.len()
        )
    }
}

/// Delete every key, never stopping at a failure.
///
/// The deletes are independent remote calls and are issued together;
/// outcomes are collected in the input key order.
pub async fn bulk_delete(store: &dyn ObjectStore, keys: &[String]) -> BulkOutcome {
    let results = futures::future::join_all(keys.iter().map(|key| async move {
        (key.clone(), store.delete(key).await)
    }))
    .await;

    let mut outcome = BulkOutcome::default();
    for (key, result) in results {
        match result {
            Ok(()) => outcome.succeeded.push(key),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "bulk delete item failed");
                outcome.failed.push((key, e));
            }
        }
    }

    tracing::info!(
        succeeded = outcome.succeeded.len(),
        failed = outcome.failed.len(),
        "bulk delete finished"
    );
    outcome
}

/// Signed download URLs for selected files, in selection order.
#[derive(Debug, Default)]
pub struct DownloadUrls {
    /// `(key, url)` per file.
    pub urls: Vec<(String, String)>,
    pub failed: Vec<(String, StoreError)>,
}

/// Resolve a download URL per selected file. Folder keys are skipped
/// (there is nothing to download for a marker). Resolution is serial so
/// callers can stagger the resulting navigations.
pub async fn bulk_download_urls(
    store: &dyn ObjectStore,
    keys: &[String],
    expiry: Duration,
) -> DownloadUrls {
    let mut out = DownloadUrls::default();

    for key in keys {
        if key.ends_with('/') {
            continue;
        }
        match store.signed_url(key, expiry).await {
            Ok(url) => out.urls.push((key.clone(), url)),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "download url failed");
                out.failed.push((key.clone(), e));
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use gallery_store::MemoryStore;

    #[test]
    fn toggle_and_select_all() {
        let mut selection = SelectionState::new();
        assert!(selection.toggle("a.txt"));
        assert!(selection.is_active());
        assert!(selection.is_selected("a.txt"));
        assert!(!selection.toggle("a.txt"));
        assert!(selection.is_empty());

        selection.select_all(["a.txt", "b.txt"]);
        assert_eq!(selection.len(), 2);

        selection.done();
        assert!(!selection.is_active());
        assert!(selection.is_empty());
    }

    #[tokio::test]
    async fn bulk_delete_attempts_every_key_and_counts() {
        let store = MemoryStore::new();
        for key in ["a.txt", "b.txt", "c.txt"] {
            store.put(key, Bytes::from_static(b"x"), None).await.unwrap();
        }
        store.inject_failure("b.txt");

        let keys: Vec<String> =
            ["a.txt", "b.txt", "c.txt"].iter().map(|k| k.to_string()).collect();
        let outcome = bulk_delete(&store, &keys).await;

        assert_eq!(outcome.succeeded, vec!["a.txt", "c.txt"]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].0, "b.txt");
        assert_eq!(outcome.summary(), "2 succeeded, 1 failed");

        // The survivors are gone from the next listing.
        let listing = store.list("").await.unwrap();
        let remaining: Vec<_> = listing.objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(remaining, vec!["b.txt"]);
    }

    #[tokio::test]
    async fn download_urls_skip_folders_and_aggregate_failures() {
        let store = MemoryStore::new();
        store.create_folder("img/").await.unwrap();
        store.put("a.txt", Bytes::from_static(b"x"), None).await.unwrap();

        let keys: Vec<String> = ["img/", "a.txt", "missing.txt"]
            .iter()
            .map(|k| k.to_string())
            .collect();
        let out = bulk_download_urls(&store, &keys, Duration::from_secs(60)).await;

        assert_eq!(out.urls.len(), 1);
        assert_eq!(out.urls[0].0, "a.txt");
        assert_eq!(out.failed.len(), 1);
        assert_eq!(out.failed[0].0, "missing.txt");
    }
}
