use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of result document stored under `{CorrelationId}/{kind}.json`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Name,
    Transcribe,
    Comprehend,
    Rekognition,
    Status,
}

impl ArtifactKind {
    /// Kinds a finished pipeline run produces
    pub const EXPECTED: [ArtifactKind; 4] = [
        ArtifactKind::Name,
        ArtifactKind::Transcribe,
        ArtifactKind::Comprehend,
        ArtifactKind::Rekognition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Name => "name",
            ArtifactKind::Transcribe => "transcribe",
            ArtifactKind::Comprehend => "comprehend",
            ArtifactKind::Rekognition => "rekognition",
            ArtifactKind::Status => "status",
        }
    }

    pub fn from_stem(stem: &str) -> Option<Self> {
        match stem {
            "name" => Some(ArtifactKind::Name),
            "transcribe" => Some(ArtifactKind::Transcribe),
            "comprehend" => Some(ArtifactKind::Comprehend),
            "rekognition" => Some(ArtifactKind::Rekognition),
            "status" => Some(ArtifactKind::Status),
            _ => None,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.as_str())
    }
}

/// Uniform `{exists, data?}` wrapper around a handler result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn present(data: T) -> Self {
        Self {
            exists: true,
            data: Some(data),
        }
    }

    /// The `{exists: false}` sentinel
    pub fn absent() -> Self {
        Self {
            exists: false,
            data: None,
        }
    }

    /// Payload, if the envelope claims it exists and carries one
    pub fn into_data(self) -> Option<T> {
        if self.exists {
            self.data
        } else {
            None
        }
    }
}

/// `transcribe.json`
pub type TranscriptArtifact = Envelope<String>;

/// `comprehend.json`
pub type SentimentArtifact = Envelope<SentimentAnalysis>;

/// Sentiment result, keyed the way the sentiment service names its fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SentimentAnalysis {
    pub sentiment: String,
    pub sentiment_score: SentimentScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SentimentScore {
    pub positive: f32,
    pub negative: f32,
    pub neutral: f32,
    pub mixed: f32,
}

/// `rekognition.json`
///
/// A successful run carries `videoMetadata`, `analysisTimestamp` and `labels`;
/// the failure sentinel carries `status` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDetectionArtifact {
    pub exists: bool,
    pub job_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_metadata: Option<VideoMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<LabelGroup>>,
}

impl LabelDetectionArtifact {
    pub fn succeeded(
        job_id: impl Into<String>,
        video_metadata: Option<VideoMetadata>,
        analysis_timestamp: impl Into<String>,
        labels: Vec<LabelGroup>,
    ) -> Self {
        Self {
            exists: true,
            job_id: job_id.into(),
            status: None,
            video_metadata,
            analysis_timestamp: Some(analysis_timestamp.into()),
            labels: Some(labels),
        }
    }

    pub fn failed(job_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            exists: false,
            job_id: job_id.into(),
            status: Some(status.into()),
            video_metadata: None,
            analysis_timestamp: None,
            labels: None,
        }
    }

    pub fn label_count(&self) -> usize {
        self.labels
            .iter()
            .flatten()
            .map(|group| group.detected_labels.len())
            .sum()
    }
}

/// Video properties reported alongside label-detection results
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VideoMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codec: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_millis: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_height: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_width: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_range: Option<String>,
}

/// All labels seen at one millisecond offset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelGroup {
    pub timestamp: i64,
    pub timestamp_seconds: f64,
    pub detected_labels: Vec<LabelInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelInfo {
    pub name: String,
    pub confidence: f32,
    pub parents: Vec<String>,
}

/// One label occurrence as returned by a label-detection results page
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedLabel {
    pub timestamp_ms: i64,
    pub label: LabelInfo,
}

/// Group detections by timestamp, ascending
///
/// Labels sharing a timestamp keep the order in which they were detected.
pub fn group_labels(detections: impl IntoIterator<Item = DetectedLabel>) -> Vec<LabelGroup> {
    let mut groups: BTreeMap<i64, Vec<LabelInfo>> = BTreeMap::new();
    for detection in detections {
        groups
            .entry(detection.timestamp_ms)
            .or_default()
            .push(detection.label);
    }

    groups
        .into_iter()
        .map(|(timestamp, detected_labels)| LabelGroup {
            timestamp,
            timestamp_seconds: timestamp as f64 / 1000.0,
            detected_labels,
        })
        .collect()
}
