//! Gallery error types.

use gallery_store::StoreError;
use thiserror::Error;

/// Errors surfaced to the browsing layer.
#[derive(Error, Debug)]
pub enum GalleryError {
    // ===== Recoverable (notify, keep browsing) =====
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    #[error(transparent)]
    Upload(#[from] crate::upload::BatchUploadError),

    // ===== Fatal (nothing works without it) =====
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GalleryError {
    /// Recoverable errors are shown as a transient notification; fatal
    /// ones block the whole session.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            GalleryError::Config(_) | GalleryError::Store(StoreError::Config(_))
        )
    }

    /// Message fit for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            GalleryError::Store(StoreError::AccessDenied(_)) => {
                "Access denied. Check your bucket permissions.".to_string()
            }
            GalleryError::Store(StoreError::NotFound(what)) => {
                format!("Not found: {what}. Check the bucket name and key.")
            }
            GalleryError::Store(StoreError::Network(_)) => {
                "Network error. Refresh to retry.".to_string()
            }
            GalleryError::InvalidName(name) => {
                format!("Invalid folder name: {name:?}")
            }
            GalleryError::Upload(batch) => format!(
                "Upload failed: {} of {} files uploaded.",
                batch.uploaded.len(),
                batch.total
            ),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GalleryError>;
