//! Artifact persistence on top of [`Storage`]
//!
//! Handlers go through [`ArtifactStore`] instead of building keys themselves, so
//! every artifact of an upload lands in `{id}/` no matter which handler wrote it.

use chrono::{DateTime, Utc};
use reelscope_core::models::{ArtifactKind, Envelope, StatusArtifact};
use reelscope_core::{Clock, CorrelationId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::jobs::JobRecordStore;
use crate::keys::{artifact_key, folder_marker, json_stem};
use crate::traits::{Storage, StorageError, StorageResult};

const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Clone)]
pub struct ArtifactStore {
    storage: Arc<dyn Storage>,
    jobs: JobRecordStore,
    clock: Arc<dyn Clock>,
}

impl ArtifactStore {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            jobs: JobRecordStore::new(storage.clone()),
            storage,
            clock,
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn jobs(&self) -> &JobRecordStore {
        &self.jobs
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Write the empty `{id}/` marker object
    pub async fn create_folder(&self, id: &CorrelationId) -> StorageResult<()> {
        self.storage
            .put_object(&folder_marker(id), Vec::new(), None)
            .await
    }

    /// Write `value` as compact JSON to `{id}/{kind}.json`, returning the key
    pub async fn write<T>(&self, id: &CorrelationId, kind: ArtifactKind, value: &T) -> StorageResult<String>
    where
        T: Serialize + Sync + ?Sized,
    {
        let body = serde_json::to_vec(value)?;
        self.put(id, kind, body).await
    }

    /// Like [`ArtifactStore::write`], indented for human readers
    pub async fn write_pretty<T>(
        &self,
        id: &CorrelationId,
        kind: ArtifactKind,
        value: &T,
    ) -> StorageResult<String>
    where
        T: Serialize + Sync + ?Sized,
    {
        let body = serde_json::to_vec_pretty(value)?;
        self.put(id, kind, body).await
    }

    /// Write the `{exists: false}` sentinel
    pub async fn write_absent(&self, id: &CorrelationId, kind: ArtifactKind) -> StorageResult<String> {
        self.write(id, kind, &Envelope::<()>::absent()).await
    }

    async fn put(&self, id: &CorrelationId, kind: ArtifactKind, body: Vec<u8>) -> StorageResult<String> {
        let key = artifact_key(id, kind);
        self.storage
            .put_object(&key, body, Some(JSON_CONTENT_TYPE))
            .await?;
        tracing::info!(
            correlation_id = %id,
            artifact = kind.as_str(),
            key = %key,
            "Artifact written"
        );
        Ok(key)
    }

    pub async fn read<T: DeserializeOwned>(&self, id: &CorrelationId, kind: ArtifactKind) -> StorageResult<T> {
        self.read_key(&artifact_key(id, kind)).await
    }

    /// Read and parse any JSON object in the bucket
    pub async fn read_key<T: DeserializeOwned>(&self, key: &str) -> StorageResult<T> {
        let bytes = self.storage.get_object(key).await?;
        serde_json::from_slice(&bytes).map_err(|e| StorageError::InvalidDocument {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }

    /// Keys directly under `{id}/`, including the folder marker
    pub async fn listing(&self, id: &CorrelationId) -> StorageResult<Vec<String>> {
        self.storage.list_folder(&id.folder()).await
    }

    /// Summarize readiness from a listing already in hand
    pub async fn status_from_listing(
        &self,
        id: &CorrelationId,
        keys: &[String],
    ) -> StorageResult<StatusArtifact> {
        let folder = id.folder();
        let present: BTreeSet<ArtifactKind> = keys
            .iter()
            .filter_map(|key| json_stem(&folder, key))
            .filter_map(ArtifactKind::from_stem)
            .collect();
        let jobs = self.jobs.list(id).await?;
        Ok(StatusArtifact::summarize(id.clone(), &present, &jobs, self.now()))
    }

    pub async fn status(&self, id: &CorrelationId) -> StorageResult<StatusArtifact> {
        let keys = self.listing(id).await?;
        self.status_from_listing(id, &keys).await
    }

    /// Recompute `status.json` from a fresh listing and write it
    pub async fn refresh_status(&self, id: &CorrelationId) -> StorageResult<StatusArtifact> {
        let status = self.status(id).await?;
        self.write(id, ArtifactKind::Status, &status).await?;
        Ok(status)
    }
}
