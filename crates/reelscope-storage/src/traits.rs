//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.
//! One `Storage` value is bound to one bucket.

use async_trait::async_trait;
use reelscope_core::AppError;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Listing failed: {0}")]
    ListFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Presigning failed: {0}")]
    PresignFailed(String),

    #[error("Invalid document at {key}: {reason}")]
    InvalidDocument { key: String, reason: String },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    /// Missing object or missing bucket
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_) | StorageError::BucketNotFound(_))
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) | StorageError::BucketNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            StorageError::InvalidKey(_) => AppError::InvalidInput(err.to_string()),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::S3 => f.write_str("s3"),
            StorageBackend::Memory => f.write_str("memory"),
        }
    }
}

/// Storage abstraction trait
///
/// Backends implement plain object operations; CorrelationId-aware logic lives
/// in [`crate::ArtifactStore`] and [`crate::JobRecordStore`].
#[async_trait]
pub trait Storage: Send + Sync {
    /// Bucket this storage is bound to
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Write an object, replacing any previous version
    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> StorageResult<()>;

    /// Read a whole object
    async fn get_object(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// List the keys directly under `prefix`, treating `/` as a delimiter
    ///
    /// Keys nested deeper are not returned. A folder marker equal to `prefix`
    /// is returned like any other object. All result pages are read.
    async fn list_folder(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Generate a presigned PUT URL for direct uploads
    ///
    /// The client must send the same `Content-Type` with its PUT.
    async fn presigned_put_url(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;
}

/// Hands out a [`Storage`] bound to a named bucket
///
/// Handlers touch up to three buckets (input, transcript, output) whose names
/// come from configuration, so backends are resolved by name at call time.
pub trait StorageProvider: Send + Sync {
    fn bucket(&self, name: &str) -> Arc<dyn Storage>;
}
