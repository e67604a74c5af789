use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::correlation::CorrelationId;
use crate::models::artifact::ArtifactKind;

/// Background job started for every upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobKind {
    Transcription,
    LabelDetection,
}

impl JobKind {
    pub const ALL: [JobKind; 2] = [JobKind::Transcription, JobKind::LabelDetection];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Transcription => "transcription",
            JobKind::LabelDetection => "labelDetection",
        }
    }

    pub fn from_stem(stem: &str) -> Option<Self> {
        match stem {
            "transcription" => Some(JobKind::Transcription),
            "labelDetection" => Some(JobKind::LabelDetection),
            _ => None,
        }
    }

    /// Artifacts that cannot appear unless this job succeeds
    pub fn artifacts(&self) -> &'static [ArtifactKind] {
        match self {
            JobKind::Transcription => &[ArtifactKind::Transcribe, ArtifactKind::Comprehend],
            JobKind::LabelDetection => &[ArtifactKind::Rekognition],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Launched,
    Completed,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// Persisted state of one job kind for one upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub correlation_id: CorrelationId,
    pub kind: JobKind,
    pub job_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    pub state: JobState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn new(
        correlation_id: CorrelationId,
        kind: JobKind,
        job_name: impl Into<String>,
        state: JobState,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            correlation_id,
            kind,
            job_name: job_name.into(),
            job_id: None,
            state,
            error: None,
            updated_at,
        }
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_job_record_serialization() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let record = JobRecord::new(
            CorrelationId::parse("movie1").unwrap(),
            JobKind::LabelDetection,
            "movie1_abc",
            JobState::Launched,
            at,
        )
        .with_job_id("job-42");

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "correlationId": "movie1",
                "kind": "labelDetection",
                "jobName": "movie1_abc",
                "jobId": "job-42",
                "state": "LAUNCHED",
                "updatedAt": "2024-05-01T12:00:00Z"
            })
        );
    }

    #[test]
    fn test_job_kind_names_round_trip() {
        for kind in JobKind::ALL {
            assert_eq!(JobKind::from_stem(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(!JobState::Launched.is_terminal());
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Failed.is_terminal());
    }
}
