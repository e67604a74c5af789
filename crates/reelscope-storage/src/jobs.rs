//! Job record persistence
//!
//! One record per job kind per upload, at `{id}/jobs/{kind}.json`. The launcher
//! creates records; completion handlers move them to a terminal state.

use chrono::{DateTime, Utc};
use reelscope_core::models::{JobKind, JobRecord, JobState};
use reelscope_core::CorrelationId;
use std::sync::Arc;

use crate::keys::{job_record_key, jobs_folder, json_stem};
use crate::traits::{Storage, StorageError, StorageResult};

#[derive(Clone)]
pub struct JobRecordStore {
    storage: Arc<dyn Storage>,
}

/// State change reported by a completion handler
#[derive(Debug, Clone)]
pub struct JobTransition<'a> {
    pub kind: JobKind,
    pub state: JobState,
    /// Used when no record exists yet, e.g. for jobs launched by an older deployment
    pub job_name: &'a str,
    pub job_id: Option<&'a str>,
    pub error: Option<String>,
}

impl JobRecordStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn put(&self, record: &JobRecord) -> StorageResult<()> {
        let key = job_record_key(&record.correlation_id, record.kind);
        let body = serde_json::to_vec(record)?;
        self.storage
            .put_object(&key, body, Some("application/json"))
            .await?;

        tracing::debug!(
            correlation_id = %record.correlation_id,
            kind = record.kind.as_str(),
            state = ?record.state,
            "Job record written"
        );
        Ok(())
    }

    pub async fn get(&self, id: &CorrelationId, kind: JobKind) -> StorageResult<Option<JobRecord>> {
        let key = job_record_key(id, kind);
        match self.storage.get_object(&key).await {
            Ok(bytes) => parse_record(&key, &bytes).map(Some),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Every record stored for `id`, in job-kind order
    pub async fn list(&self, id: &CorrelationId) -> StorageResult<Vec<JobRecord>> {
        let folder = jobs_folder(id);
        let mut records = Vec::new();
        for key in self.storage.list_folder(&folder).await? {
            if json_stem(&folder, &key).and_then(JobKind::from_stem).is_none() {
                continue;
            }
            let bytes = self.storage.get_object(&key).await?;
            records.push(parse_record(&key, &bytes)?);
        }
        records.sort_by_key(|record| record.kind);
        Ok(records)
    }

    /// Apply a transition, creating the record if the launcher never wrote one
    pub async fn transition(
        &self,
        id: &CorrelationId,
        transition: JobTransition<'_>,
        now: DateTime<Utc>,
    ) -> StorageResult<JobRecord> {
        let mut record = match self.get(id, transition.kind).await? {
            Some(existing) => existing,
            None => JobRecord::new(
                id.clone(),
                transition.kind,
                transition.job_name,
                transition.state,
                now,
            ),
        };

        record.state = transition.state;
        record.updated_at = now;
        record.error = transition.error;
        if let Some(job_id) = transition.job_id {
            record.job_id = Some(job_id.to_string());
        }

        self.put(&record).await?;
        Ok(record)
    }
}

fn parse_record(key: &str, bytes: &[u8]) -> StorageResult<JobRecord> {
    serde_json::from_slice(bytes).map_err(|e| StorageError::InvalidDocument {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
