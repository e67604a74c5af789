//! In-memory storage backend
//!
//! Keeps objects in a sorted map so listings come back in key order like S3.
//! Used by tests and local runs; failures can be injected per operation kind.

use crate::keys::validate_key;
use crate::traits::{Storage, StorageBackend, StorageError, StorageProvider, StorageResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: Option<String>,
}

#[derive(Debug, Default)]
struct Failures {
    writes: Option<String>,
    reads: Option<String>,
    lists: Option<String>,
}

#[derive(Debug)]
struct Inner {
    objects: BTreeMap<String, StoredObject>,
    bucket_exists: bool,
    failures: Failures,
    put_count: usize,
}

/// Storage implementation that keeps objects in memory
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    bucket: String,
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStorage {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            inner: Arc::new(Mutex::new(Inner {
                objects: BTreeMap::new(),
                bucket_exists: true,
                failures: Failures::default(),
                put_count: 0,
            })),
        }
    }

    /// A storage whose bucket does not exist; every call fails with `BucketNotFound`
    pub fn missing_bucket(bucket: impl Into<String>) -> Self {
        let storage = Self::new(bucket);
        storage.lock().bucket_exists = false;
        storage
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_bucket(&self, inner: &Inner) -> StorageResult<()> {
        if inner.bucket_exists {
            Ok(())
        } else {
            Err(StorageError::BucketNotFound(self.bucket.clone()))
        }
    }

    /// Set an object directly (test setup)
    pub fn set_object(&self, key: &str, data: impl Into<Vec<u8>>) {
        self.lock().objects.insert(
            key.to_string(),
            StoredObject {
                data: data.into(),
                content_type: None,
            },
        );
    }

    /// Delete an object directly (test setup)
    pub fn remove_object(&self, key: &str) {
        self.lock().objects.remove(key);
    }

    /// Check if an object exists
    pub fn has_object(&self, key: &str) -> bool {
        self.lock().objects.contains_key(key)
    }

    /// Get object data (for test assertions)
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().objects.get(key).map(|o| o.data.clone())
    }

    /// Parse an object as JSON (for test assertions)
    pub fn object_json(&self, key: &str) -> Option<serde_json::Value> {
        self.object(key)
            .and_then(|data| serde_json::from_slice(&data).ok())
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.lock()
            .objects
            .get(key)
            .and_then(|o| o.content_type.clone())
    }

    pub fn keys(&self) -> Vec<String> {
        self.lock().objects.keys().cloned().collect()
    }

    /// Number of successful writes so far
    pub fn put_count(&self) -> usize {
        self.lock().put_count
    }

    pub fn fail_writes(&self, message: impl Into<String>) {
        self.lock().failures.writes = Some(message.into());
    }

    pub fn fail_reads(&self, message: impl Into<String>) {
        self.lock().failures.reads = Some(message.into());
    }

    pub fn fail_lists(&self, message: impl Into<String>) {
        self.lock().failures.lists = Some(message.into());
    }
}

/// In-memory buckets by name, created on first use
#[derive(Debug, Clone, Default)]
pub struct MemoryBuckets {
    buckets: Arc<Mutex<BTreeMap<String, MemoryStorage>>>,
}

impl MemoryBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// The bucket called `name`; clones share contents
    pub fn get(&self, name: &str) -> MemoryStorage {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_insert_with(|| MemoryStorage::new(name))
            .clone()
    }

    /// Replace `name` with a bucket that reports `BucketNotFound` on every call
    pub fn delete_bucket(&self, name: &str) {
        self.buckets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), MemoryStorage::missing_bucket(name));
    }
}

impl StorageProvider for MemoryBuckets {
    fn bucket(&self, name: &str) -> Arc<dyn Storage> {
        Arc::new(self.get(name))
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }

    async fn put_object(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: Option<&str>,
    ) -> StorageResult<()> {
        validate_key(key)?;
        let mut inner = self.lock();
        self.check_bucket(&inner)?;
        if let Some(message) = &inner.failures.writes {
            return Err(StorageError::UploadFailed(message.clone()));
        }
        inner.objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.map(str::to_owned),
            },
        );
        inner.put_count += 1;
        Ok(())
    }

    async fn get_object(&self, key: &str) -> StorageResult<Vec<u8>> {
        let inner = self.lock();
        self.check_bucket(&inner)?;
        if let Some(message) = &inner.failures.reads {
            return Err(StorageError::DownloadFailed(message.clone()));
        }
        inner
            .objects
            .get(key)
            .map(|o| o.data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn list_folder(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let inner = self.lock();
        self.check_bucket(&inner)?;
        if let Some(message) = &inner.failures.lists {
            return Err(StorageError::ListFailed(message.clone()));
        }
        Ok(inner
            .objects
            .keys()
            .filter(|key| {
                key.strip_prefix(prefix)
                    .map(|rest| !rest.contains('/') || rest.is_empty())
                    .unwrap_or(false)
            })
            .cloned()
            .collect())
    }

    async fn presigned_put_url(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        validate_key(key)?;
        let inner = self.lock();
        self.check_bucket(&inner)?;
        Ok(format!(
            "memory://{}/{}?content-type={}&expires-in={}",
            self.bucket,
            key,
            content_type,
            expires_in.as_secs()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let storage = MemoryStorage::new("out");
        storage
            .put_object("movie1/name.json", b"\"Movie\"".to_vec(), Some("application/json"))
            .await
            .unwrap();
        assert_eq!(storage.get_object("movie1/name.json").await.unwrap(), b"\"Movie\"");
        assert_eq!(
            storage.content_type("movie1/name.json").as_deref(),
            Some("application/json")
        );
        assert_eq!(storage.put_count(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let storage = MemoryStorage::new("out");
        let err = storage.get_object("nope.json").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_folder_is_delimited() {
        let storage = MemoryStorage::new("out");
        storage.set_object("movie1/", Vec::new());
        storage.set_object("movie1/name.json", "\"a\"");
        storage.set_object("movie1/jobs/transcription.json", "{}");
        storage.set_object("movie10/name.json", "\"b\"");
        storage.set_object("movie1.json", "{}");

        let keys = storage.list_folder("movie1/").await.unwrap();
        assert_eq!(keys, vec!["movie1/".to_string(), "movie1/name.json".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_bucket() {
        let storage = MemoryStorage::missing_bucket("gone");
        assert!(matches!(
            storage.list_folder("movie1/").await,
            Err(StorageError::BucketNotFound(_))
        ));
        assert!(matches!(
            storage.put_object("a.json", Vec::new(), None).await,
            Err(StorageError::BucketNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let storage = MemoryStorage::new("out");
        storage.set_object("a.json", "{}");
        storage.fail_reads("throttled");
        assert!(matches!(
            storage.get_object("a.json").await,
            Err(StorageError::DownloadFailed(_))
        ));
        storage.fail_writes("denied");
        assert!(matches!(
            storage.put_object("b.json", Vec::new(), None).await,
            Err(StorageError::UploadFailed(_))
        ));
        assert_eq!(storage.put_count(), 0);
    }

    #[tokio::test]
    async fn test_buckets_share_contents_by_name() {
        let buckets = MemoryBuckets::new();
        buckets
            .bucket("out")
            .put_object("a.json", b"{}".to_vec(), None)
            .await
            .unwrap();
        assert!(buckets.get("out").has_object("a.json"));
        assert!(!buckets.get("in").has_object("a.json"));

        buckets.delete_bucket("out");
        assert!(matches!(
            buckets.bucket("out").get_object("a.json").await,
            Err(StorageError::BucketNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_invalid_keys() {
        let storage = MemoryStorage::new("out");
        assert!(matches!(
            storage.put_object("../escape", Vec::new(), None).await,
            Err(StorageError::InvalidKey(_))
        ));
    }
}
