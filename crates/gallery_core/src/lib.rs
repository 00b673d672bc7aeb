//! BucketGallery Core Domain Logic
//!
//! This crate contains:
//! - Listing normalization (flat delimiter listings -> folder/file entries)
//! - Navigation state and breadcrumbs
//! - Filter/sort engine
//! - Upload coordination with aggregate progress
//! - Selection and bulk actions
//! - The Gallery orchestrator
//! - Configuration and error types

pub mod config;
pub mod entry;
pub mod error;
pub mod filter;
pub mod gallery;
pub mod navigation;
pub mod selection;
pub mod upload;

pub use config::{GalleryConfig, Preferences, ViewMode};
pub use entry::{normalize_listing, Entry};
pub use error::{GalleryError, Result};
pub use filter::{available_extensions, ListQuery, SortBy, SortDirection};
pub use gallery::Gallery;
pub use navigation::{Breadcrumb, NavigationState};
pub use selection::{
    bulk_delete, bulk_download_urls, BulkOutcome, DownloadUrls, SelectionState,
};
pub use upload::{
    BatchUploadError, KeyPolicy, UploadCoordinator, UploadFile, UploadProgress,
};
