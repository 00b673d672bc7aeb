//! Upload coordination: sequential batches with aggregated progress.
//!
//! Files in a batch upload one at a time so the aggregate percentage
//! stays simple and predictable; the batch aborts on the first failure
//! and already-uploaded files are not rolled back.

use bytes::Bytes;
use gallery_store::{join_prefix, sanitize_file_name, ObjectStore, StoreError, DEFAULT_URL_TTL};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// How destination keys are derived from file names.
///
/// One policy applies to an entire coordinator; mixing policies within a
/// batch is deliberately impossible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyPolicy {
    /// `<prefix><epoch-millis>-<name>`: collision-avoiding default,
    /// matching the upload convention of the hosted gallery.
    #[default]
    TimestampPrefixed,
    /// `<prefix><name>`: stable keys; re-uploading overwrites.
    Raw,
}

/// One file queued for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Progress snapshot delivered to the batch observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub total_files: usize,
    pub completed_files: usize,
    /// Percent of the file currently in flight. The one-shot put seam
    /// reports 0 while a file is uploading and 100 once it lands.
    pub current_file_percent: u32,
    /// Aggregate percentage. Monotonically non-decreasing across the
    /// batch; exactly 100 on success.
    pub percent: u32,
}

/// A batch that stopped partway: `uploaded.len()` of the original files
/// made it before `failed_index` errored. Nothing is rolled back.
#[derive(Debug, thiserror::Error)]
#[error("batch upload failed at file {failed_index}: {source} ({} of {total} uploaded)", uploaded.len())]
pub struct BatchUploadError {
    /// Signed URLs of the files that uploaded before the failure.
    pub uploaded: Vec<String>,
    /// Zero-based index of the file that failed.
    pub failed_index: usize,
    pub total: usize,
    #[source]
    pub source: StoreError,
}

/// Sequences uploads against an injected store.
pub struct UploadCoordinator {
    store: Arc<dyn ObjectStore>,
    policy: KeyPolicy,
}

impl UploadCoordinator {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            policy: KeyPolicy::default(),
        }
    }

    pub fn with_policy(store: Arc<dyn ObjectStore>, policy: KeyPolicy) -> Self {
        Self { store, policy }
    }

    /// Destination key for a file landing under `prefix`.
    pub fn destination_key(&self, prefix: &str, name: &str) -> String {
        let name = sanitize_file_name(name);
        match self.policy {
            KeyPolicy::TimestampPrefixed => {
                let millis = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_millis())
                    .unwrap_or(0);
                join_prefix(prefix, &format!("{millis}-{name}"))
            }
            KeyPolicy::Raw => join_prefix(prefix, &name),
        }
    }

    /// Upload `files` into `prefix` one at a time, invoking `on_progress`
    /// after every state change.
    ///
    /// Returns one signed access URL per file, in input order. The first
    /// failure aborts the batch with N-of-M semantics; earlier files stay
    /// in the bucket.
    pub async fn upload_batch<F>(
        &self,
        prefix: &str,
        files: Vec<UploadFile>,
        mut on_progress: F,
    ) -> std::result::Result<Vec<String>, BatchUploadError>
    where
        F: FnMut(UploadProgress),
    {
        let total = files.len();
        let mut urls = Vec::with_capacity(total);
        let mut last_percent = 0u32;

        let mut emit = |completed: usize, current: u32, last: &mut u32| {
            let mut percent = aggregate_percent(completed, current, total);
            // Clamp monotone; rounding must never walk backwards.
            if percent < *last {
                percent = *last;
            }
            *last = percent;
            on_progress(UploadProgress {
                total_files: total,
                completed_files: completed,
                current_file_percent: current,
                percent,
            });
        };

        emit(0, 0, &mut last_percent);

        for (index, file) in files.into_iter().enumerate() {
            let key = self.destination_key(prefix, &file.name);
            tracing::debug!(key = %key, size = file.body.len(), "uploading");

            let fail = |source: StoreError, uploaded: Vec<String>| BatchUploadError {
                uploaded,
                failed_index: index,
                total,
                source,
            };

            if let Err(source) = self
                .store
                .put(&key, file.body, file.content_type.as_deref())
                .await
            {
                tracing::warn!(key = %key, error = %source, "upload failed, aborting batch");
                return Err(fail(source, urls));
            }

            let url = match self.store.signed_url(&key, DEFAULT_URL_TTL).await {
                Ok(url) => url,
                Err(source) => return Err(fail(source, urls)),
            };
            urls.push(url);

            // The landed file reaches 100, then the window advances to the
            // next file at 0. Both snapshots compute the same aggregate.
            emit(index, 100, &mut last_percent);
            emit(index + 1, 0, &mut last_percent);
        }

        Ok(urls)
    }
}

/// `round((completed * 100 + current_file_percent) / total)`.
/// An empty batch is already complete.
fn aggregate_percent(completed: usize, current_file_percent: u32, total: usize) -> u32 {
    if total == 0 {
        return 100;
    }
    let raw = (completed as f64 * 100.0 + f64::from(current_file_percent)) / total as f64;
    raw.round().min(100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_store::MemoryStore;

    fn file(name: &str, body: &'static [u8]) -> UploadFile {
        UploadFile {
            name: name.to_string(),
            content_type: Some("application/octet-stream".to_string()),
            body: Bytes::from_static(body),
        }
    }

    fn raw_coordinator(store: &Arc<MemoryStore>) -> UploadCoordinator {
        let store: Arc<dyn ObjectStore> = Arc::clone(store) as _;
        UploadCoordinator::with_policy(store, KeyPolicy::Raw)
    }

    #[tokio::test]
    async fn batch_uploads_sequentially_and_returns_urls_in_order() {
        let store = Arc::new(MemoryStore::new());
        let coordinator = raw_coordinator(&store);

        let urls = coordinator
            .upload_batch(
                "photos/",
                vec![file("a.jpg", b"aa"), file("b.jpg", b"bb")],
                |_| {},
            )
            .await
            .unwrap();

        assert_eq!(urls.len(), 2);
        assert!(urls[0].contains("photos/a.jpg"));
        assert!(urls[1].contains("photos/b.jpg"));
        assert!(store.contains("photos/a.jpg"));
        assert!(store.contains("photos/b.jpg"));
    }

    #[tokio::test]
    async fn progress_is_monotone_and_hits_a_third_after_first_of_three() {
        let store = Arc::new(MemoryStore::new());
        let coordinator = raw_coordinator(&store);

        let mut reports = Vec::new();
        coordinator
            .upload_batch(
                "",
                vec![file("1.bin", b"x"), file("2.bin", b"x"), file("3.bin", b"x")],
                |p| reports.push(p),
            )
            .await
            .unwrap();

        let percents: Vec<_> = reports.iter().map(|p| p.percent).collect();
        assert_eq!(percents, vec![0, 33, 33, 67, 67, 100, 100]);
        assert!(percents.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(reports.last().map(|p| p.completed_files), Some(3));

        // After the first file lands, the batch reports a third, not 100.
        let after_first = reports.iter().find(|p| p.completed_files == 1).unwrap();
        assert_eq!(after_first.percent, 33);
    }

    #[tokio::test]
    async fn empty_batch_completes_at_one_hundred() {
        let store = Arc::new(MemoryStore::new());
        let coordinator = raw_coordinator(&store);

        let mut reports = Vec::new();
        let urls = coordinator
            .upload_batch("", vec![], |p| reports.push(p))
            .await
            .unwrap();

        assert!(urls.is_empty());
        assert_eq!(reports.last().map(|p| p.percent), Some(100));
    }

    #[tokio::test]
    async fn failure_aborts_with_n_of_m_semantics() {
        let store = Arc::new(MemoryStore::new());
        store.inject_failure("b.jpg");
        let coordinator = raw_coordinator(&store);

        let err = coordinator
            .upload_batch(
                "",
                vec![file("a.jpg", b"a"), file("b.jpg", b"b"), file("c.jpg", b"c")],
                |_| {},
            )
            .await
            .unwrap_err();

        assert_eq!(err.uploaded.len(), 1);
        assert_eq!(err.failed_index, 1);
        assert_eq!(err.total, 3);
        // No rollback of the file that made it, none written after.
        assert!(store.contains("a.jpg"));
        assert!(!store.contains("c.jpg"));
    }

    #[tokio::test]
    async fn timestamped_keys_keep_prefix_and_name() {
        let store: Arc<dyn ObjectStore> = Arc::new(MemoryStore::new());
        let coordinator = UploadCoordinator::new(store);

        let key = coordinator.destination_key("photos/", "cat photo.jpg");
        assert!(key.starts_with("photos/"));
        assert!(key.ends_with("-cat photo.jpg"));

        // Sanitization keeps names inside the destination prefix.
        let key = coordinator.destination_key("photos/", "../escape.jpg");
        assert!(key.starts_with("photos/"));
        assert!(!key["photos/".len()..].contains('/'));
    }
}
