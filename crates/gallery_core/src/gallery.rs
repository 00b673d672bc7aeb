//! The gallery orchestrator: one injected store client plus the view
//! state that feeds it.
//!
//! All state is scoped to a single browsing session; nothing is
//! persisted. The bucket is a shared resource, so any listing can go
//! stale underneath us; `refresh` is the explicit (and only) retry path.

use crate::entry::{normalize_listing, Entry};
use crate::error::{GalleryError, Result};
use crate::filter::ListQuery;
use crate::navigation::{Breadcrumb, NavigationState};
use crate::selection::{
    bulk_delete, bulk_download_urls, BulkOutcome, DownloadUrls, SelectionState,
};
use crate::upload::{UploadCoordinator, UploadFile, UploadProgress};
use gallery_store::{ObjectStore, DEFAULT_URL_TTL};
use std::sync::Arc;
use std::time::Duration;

/// Folder-browsing facade over an injected object store.
pub struct Gallery {
    store: Arc<dyn ObjectStore>,
    navigation: NavigationState,
    selection: SelectionState,
    query: ListQuery,
    url_ttl: Duration,
}

impl Gallery {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            navigation: NavigationState::new(),
            selection: SelectionState::new(),
            query: ListQuery::default(),
            url_ttl: DEFAULT_URL_TTL,
        }
    }

    pub fn with_url_ttl(mut self, ttl: Duration) -> Self {
        self.url_ttl = ttl;
        self
    }

    pub fn current_prefix(&self) -> &str {
        self.navigation.current_prefix()
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        self.navigation.breadcrumbs()
    }

    pub fn can_go_back(&self) -> bool {
        self.navigation.can_go_back()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut ListQuery {
        &mut self.query
    }

    /// List, normalize, and filter/sort the current prefix.
    ///
    /// On failure the view gets the error and an implicitly empty entry
    /// set; a listing failure blocks primary content, so callers show it
    /// inline rather than as a passing notification.
    pub async fn load(&self) -> Result<Vec<Entry>> {
        let prefix = self.navigation.current_prefix();
        let listing = self.store.list(prefix).await.map_err(|e| {
            tracing::error!(prefix = %prefix, error = %e, "listing failed");
            e
        })?;
        let entries = normalize_listing(prefix, &listing);
        Ok(self.query.apply(&entries))
    }

    /// Re-fetch the current prefix. Retry is always user-triggered;
    /// there is no automatic backoff.
    pub async fn refresh(&self) -> Result<Vec<Entry>> {
        self.load().await
    }

    /// Descend into a folder. Selection is scoped to one folder view and
    /// is dropped as a side effect.
    pub async fn enter_folder(&mut self, key: &str) -> Result<Vec<Entry>> {
        self.navigation.enter_folder(key);
        self.selection.done();
        self.load().await
    }

    /// Return to the previous prefix; `None` when there is no history.
    pub async fn go_back(&mut self) -> Result<Option<Vec<Entry>>> {
        if !self.navigation.go_back() {
            return Ok(None);
        }
        self.selection.done();
        self.load().await.map(Some)
    }

    /// Jump straight to a breadcrumb's prefix.
    pub async fn jump_to(&mut self, key: &str) -> Result<Vec<Entry>> {
        self.navigation.jump_to(key);
        self.selection.done();
        self.load().await
    }

    /// Create a folder under the current prefix by writing its marker
    /// object. Returns the new folder key.
    pub async fn create_folder(&self, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() || name.contains('/') {
            return Err(GalleryError::InvalidName(name.to_string()));
        }

        let key = format!("{}{}/", self.navigation.current_prefix(), name);
        self.store.create_folder(&key).await?;
        tracing::info!(key = %key, "folder created");
        Ok(key)
    }

    /// Delete a single entry (file or folder marker).
    pub async fn delete_entry(&self, key: &str) -> Result<()> {
        self.store.delete(key).await?;
        tracing::info!(key = %key, "deleted");
        Ok(())
    }

    /// Delete everything selected. Every key is attempted; the outcome
    /// carries succeeded/failed counts. The selection is consumed.
    pub async fn delete_selected(&mut self) -> BulkOutcome {
        let keys = self.selection.keys();
        let outcome = bulk_delete(self.store.as_ref(), &keys).await;
        self.selection.done();
        outcome
    }

    /// Signed download URLs for the selected files, folders skipped.
    pub async fn download_urls_selected(&self) -> DownloadUrls {
        let keys = self.selection.keys();
        bulk_download_urls(self.store.as_ref(), &keys, self.url_ttl).await
    }

    /// Signed direct-access URL for one file (one hour by default).
    pub async fn file_url(&self, key: &str) -> Result<String> {
        Ok(self.store.signed_url(key, self.url_ttl).await?)
    }

    /// Coordinator for uploads sharing this gallery's store.
    pub fn uploader(&self) -> UploadCoordinator {
        UploadCoordinator::new(Arc::clone(&self.store))
    }

    /// Upload a batch into the current prefix. A partial failure surfaces
    /// as [`GalleryError::Upload`] with its N-of-M detail intact.
    pub async fn upload_here<F>(&self, files: Vec<UploadFile>, on_progress: F) -> Result<Vec<String>>
    where
        F: FnMut(UploadProgress),
    {
        let urls = self
            .uploader()
            .upload_batch(self.navigation.current_prefix(), files, on_progress)
            .await?;
        Ok(urls)
    }
}
