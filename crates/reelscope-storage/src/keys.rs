//! Shared key generation for artifacts and job records.

use reelscope_core::models::{ArtifactKind, JobKind};
use reelscope_core::CorrelationId;

use crate::traits::{StorageError, StorageResult};

const JOBS_FOLDER: &str = "jobs";

/// `{id}/`
pub fn folder_marker(id: &CorrelationId) -> String {
    id.folder()
}

/// `{id}/{kind}.json`
pub fn artifact_key(id: &CorrelationId, kind: ArtifactKind) -> String {
    format!("{}{}", id.folder(), kind.file_name())
}

/// `{id}/jobs/`
pub fn jobs_folder(id: &CorrelationId) -> String {
    format!("{}{}/", id.folder(), JOBS_FOLDER)
}

/// `{id}/jobs/{kind}.json`
pub fn job_record_key(id: &CorrelationId, kind: JobKind) -> String {
    format!("{}{}.json", jobs_folder(id), kind.as_str())
}

/// `{id}.json`, where Transcribe is told to write its raw output
pub fn transcript_source_key(id: &CorrelationId) -> String {
    format!("{}.json", id)
}

/// File stem of a `.json` object directly inside `folder`
///
/// Returns `None` for the folder marker, non-JSON objects and nested keys.
pub fn json_stem<'a>(folder: &str, key: &'a str) -> Option<&'a str> {
    let file = key.strip_prefix(folder)?;
    if file.is_empty() || file.contains('/') {
        return None;
    }
    file.strip_suffix(".json").filter(|stem| !stem.is_empty())
}

/// Reject keys that are empty, absolute, or escape their folder
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("key must not be empty".to_string()));
    }
    if key.starts_with('/') {
        return Err(StorageError::InvalidKey(format!(
            "key must not start with '/': {}",
            key
        )));
    }
    if key.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(format!(
            "key must not contain '..': {}",
            key
        )));
    }
    Ok(())
}
