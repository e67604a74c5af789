use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::correlation::CorrelationId;
use crate::models::artifact::ArtifactKind;
use crate::models::job::{JobKind, JobRecord, JobState};

/// `status.json`: which expected artifacts exist for one upload
///
/// Callers poll this instead of guessing completeness from the key listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusArtifact {
    pub correlation_id: CorrelationId,
    pub complete: bool,
    pub present: Vec<ArtifactKind>,
    pub pending: Vec<ArtifactKind>,
    pub jobs: BTreeMap<JobKind, JobState>,
    /// One job failed while another was started or finished
    pub partial_failure: bool,
    pub updated_at: DateTime<Utc>,
}

impl StatusArtifact {
    pub fn summarize(
        correlation_id: CorrelationId,
        present: &BTreeSet<ArtifactKind>,
        jobs: &[JobRecord],
        updated_at: DateTime<Utc>,
    ) -> Self {
        let (present_kinds, pending): (Vec<ArtifactKind>, Vec<ArtifactKind>) = ArtifactKind::EXPECTED
            .iter()
            .partition(|kind| present.contains(*kind));

        let jobs: BTreeMap<JobKind, JobState> =
            jobs.iter().map(|record| (record.kind, record.state)).collect();

        let any_failed = jobs.values().any(|state| *state == JobState::Failed);
        let any_alive = jobs.values().any(|state| *state != JobState::Failed);

        Self {
            correlation_id,
            complete: pending.is_empty(),
            present: present_kinds,
            pending,
            jobs,
            partial_failure: any_failed && any_alive,
            updated_at,
        }
    }
}
