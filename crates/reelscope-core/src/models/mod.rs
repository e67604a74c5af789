//! Artifact, job-record and status models

pub mod artifact;
pub mod job;
pub mod status;

pub use artifact::{
    group_labels, ArtifactKind, DetectedLabel, Envelope, LabelDetectionArtifact, LabelGroup,
    LabelInfo, SentimentAnalysis, SentimentArtifact, SentimentScore, TranscriptArtifact,
    VideoMetadata,
};
pub use job::{JobKind, JobRecord, JobState};
pub use status::StatusArtifact;
