//! CorrelationId and job-name derivation.
//!
//! Every artifact, job and job record of one upload is keyed by a
//! [`CorrelationId`]. All handlers derive it here and nowhere else:
//!
//! - from an object key: everything before the first `.` (`movie1.mp4` -> `movie1`)
//! - from a job name: everything before the last `_` (`movie1_<uuid>` -> `movie1`)
//! - from an artifact key: the folder segment (`movie1/transcribe.json` -> `movie1`)
//!
//! [`JobName::generate`] is the only producer of job names. Its suffix is a
//! hyphenated UUID and never contains [`JOB_NAME_DELIMITER`], so the object-key
//! and job-name derivations agree for the same upload.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::AppError;

/// Separates the correlation id from the uniqueness suffix in a job name
pub const JOB_NAME_DELIMITER: char = '_';

/// Transcribe rejects job names longer than this
pub const MAX_JOB_NAME_LEN: usize = 200;

/// Identifier grouping every artifact and job that belongs to one upload
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Derive from an uploaded object key by truncating at the first `.`
    pub fn from_object_key(key: &str) -> Result<Self, AppError> {
        let stem = key.split('.').next().unwrap_or_default();
        if stem.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "cannot derive a correlation id from object key '{}'",
                key
            )));
        }
        Ok(Self(stem.to_string()))
    }

    /// Recover from a job name by removing the uniqueness suffix after the last `_`
    pub fn from_job_name(job_name: &str) -> Result<Self, AppError> {
        let index = job_name.rfind(JOB_NAME_DELIMITER).ok_or_else(|| {
            AppError::InvalidInput(format!(
                "job name '{}' has no uniqueness suffix",
                job_name
            ))
        })?;
        let stem = &job_name[..index];
        if stem.is_empty() {
            return Err(AppError::InvalidInput(format!(
                "job name '{}' has an empty correlation id",
                job_name
            )));
        }
        Ok(Self(stem.to_string()))
    }

    /// Derive from an artifact key such as `movie1/transcribe.json`
    pub fn from_artifact_key(key: &str) -> Result<Self, AppError> {
        match key.rsplit_once('/') {
            Some((folder, file)) if !folder.is_empty() && !file.is_empty() => {
                Ok(Self(folder.to_string()))
            }
            _ => Err(AppError::InvalidInput(format!(
                "'{}' is not an artifact key",
                key
            ))),
        }
    }

    /// Accept an id supplied directly, e.g. as an API path parameter
    pub fn parse(value: &str) -> Result<Self, AppError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AppError::InvalidInput(
                "correlation id must not be empty".to_string(),
            ));
        }
        if value.contains("..") || value.starts_with('/') || value.ends_with('/') {
            return Err(AppError::InvalidInput(format!(
                "invalid correlation id '{}'",
                value
            )));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Folder prefix holding every artifact of this upload, with trailing `/`
    pub fn folder(&self) -> String {
        format!("{}/", self.0)
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Name shared by the transcription job and the label-detection job tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobName(String);

impl JobName {
    /// Build `{id}_{uuid}` with a fresh v4 UUID suffix
    pub fn generate(id: &CorrelationId) -> Result<Self, AppError> {
        Self::with_suffix(id, &Uuid::new_v4().to_string())
    }

    pub fn with_suffix(id: &CorrelationId, suffix: &str) -> Result<Self, AppError> {
        if suffix.is_empty() || suffix.contains(JOB_NAME_DELIMITER) {
            return Err(AppError::InvalidInput(format!(
                "uniqueness suffix '{}' must be non-empty and free of '{}'",
                suffix, JOB_NAME_DELIMITER
            )));
        }

        let name = format!("{}{}{}", id, JOB_NAME_DELIMITER, suffix);
        if name.len() > MAX_JOB_NAME_LEN {
            return Err(AppError::InvalidInput(format!(
                "job name for '{}' exceeds {} characters",
                id, MAX_JOB_NAME_LEN
            )));
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')))
        {
            return Err(AppError::InvalidInput(format!(
                "correlation id '{}' contains '{}', which is not allowed in job names",
                id, bad
            )));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn correlation_id(&self) -> Result<CorrelationId, AppError> {
        CorrelationId::from_job_name(&self.0)
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decode an object key as delivered in S3 event notifications
///
/// Keys arrive form-encoded: `+` stands for a space and other bytes are
/// percent-escaped.
pub fn decode_object_key(raw: &str) -> Result<String, AppError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| AppError::InvalidInput(format!("object key '{}' is not valid UTF-8: {}", raw, e)))
}
