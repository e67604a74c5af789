//! Reelscope Storage Library
//!
//! Object storage for the pipeline: the [`Storage`] trait with S3 and in-memory
//! backends, plus the typed stores handlers use on top of it.
//!
//! # Key layout
//!
//! All keys of one upload live under its CorrelationId folder in the output
//! bucket:
//!
//! - `{id}/` - empty folder marker
//! - `{id}/{kind}.json` - result artifacts (`name`, `transcribe`, `comprehend`,
//!   `rekognition`, `status`)
//! - `{id}/jobs/{kind}.json` - job records, one level deeper so a delimited
//!   listing of `{id}/` does not return them
//!
//! Key generation is centralized in the `keys` module.

pub mod artifacts;
pub mod jobs;
pub mod keys;
#[cfg(feature = "storage-memory")]
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use artifacts::ArtifactStore;
pub use jobs::{JobRecordStore, JobTransition};
#[cfg(feature = "storage-memory")]
pub use memory::{MemoryBuckets, MemoryStorage};
#[cfg(feature = "storage-s3")]
pub use s3::{S3Storage, S3StorageProvider};
pub use traits::{Storage, StorageBackend, StorageError, StorageProvider, StorageResult};
