//! BucketGallery Object Store Layer
//!
//! Provides a uniform interface over S3-compatible buckets, including:
//! - ObjectStore: the async trait every backend implements
//! - S3Store: aws-sdk-s3 backed implementation
//! - MemoryStore: in-memory backend for tests and dependency-injected fakes
//! - Object-key helpers (display names, extensions, sanitization)

mod client;
mod key;
mod memory;
mod s3;

pub use client::{ObjectStore, RawListing, RawObject, DEFAULT_URL_TTL};
pub use key::{extension_of, file_name_of, join_prefix, sanitize_file_name};
pub use memory::MemoryStore;
pub use s3::{S3Config, S3Store};

use thiserror::Error;

/// Object-store errors, bucketed by how callers should react.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store configuration error: {0}")]
    Config(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
