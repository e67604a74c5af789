#![allow(dead_code)]

pub mod events;

use chrono::{TimeZone, Utc};
use reelscope_core::{FixedClock, PipelineConfig};
use reelscope_pipeline::PipelineContext;
use reelscope_services::mock::{
    MockLabelDetectionService, MockSentimentService, MockTranscriptionService,
};
use reelscope_storage::{MemoryBuckets, MemoryStorage};
use std::collections::HashMap;
use std::sync::Arc;

pub const INPUT_BUCKET: &str = "media-input";
pub const OUTPUT_BUCKET: &str = "media-output";
pub const TRANSCRIPT_BUCKET: &str = "media-transcripts";

/// Test pipeline wired to in-memory buckets and mock services
pub struct TestPipeline {
    pub ctx: PipelineContext,
    pub buckets: MemoryBuckets,
    pub transcription: MockTranscriptionService,
    pub labels: MockLabelDetectionService,
    pub sentiment: MockSentimentService,
}

impl TestPipeline {
    pub fn output(&self) -> MemoryStorage {
        self.buckets.get(OUTPUT_BUCKET)
    }

    pub fn transcripts(&self) -> MemoryStorage {
        self.buckets.get(TRANSCRIPT_BUCKET)
    }

    /// Every object under `{id}/` in the output bucket, with its bytes
    pub fn snapshot(&self, id: &str) -> Vec<(String, Vec<u8>)> {
        let output = self.output();
        let prefix = format!("{}/", id);
        output
            .keys()
            .into_iter()
            .filter(|key| key.starts_with(&prefix))
            .filter_map(|key| output.object(&key).map(|data| (key, data)))
            .collect()
    }
}

/// Pipeline with the standard test configuration
pub fn setup_pipeline() -> TestPipeline {
    setup_pipeline_with(&[])
}

/// Pipeline whose environment overrides the standard one with `overrides`
pub fn setup_pipeline_with(overrides: &[(&str, &str)]) -> TestPipeline {
    let mut env: HashMap<String, String> = HashMap::from([
        ("INPUT_BUCKET".to_string(), INPUT_BUCKET.to_string()),
        ("OUTPUT_BUCKET".to_string(), OUTPUT_BUCKET.to_string()),
        ("TRANSCRIBE_OUTPUT_BUCKET".to_string(), TRANSCRIPT_BUCKET.to_string()),
        (
            "SNS_TOPIC_ARN".to_string(),
            "arn:aws:sns:us-east-1:123456789012:labels".to_string(),
        ),
        (
            "REKOGNITION_ROLE_ARN".to_string(),
            "arn:aws:iam::123456789012:role/rekognition".to_string(),
        ),
    ]);
    for (name, value) in overrides {
        env.insert(name.to_string(), value.to_string());
    }
    let config = PipelineConfig::from_source(|name| env.get(name).cloned())
        .expect("test configuration is valid");

    let buckets = MemoryBuckets::new();
    let transcription = MockTranscriptionService::new();
    let labels = MockLabelDetectionService::new();
    let sentiment = MockSentimentService::new();
    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());

    let ctx = PipelineContext::new(
        Arc::new(config),
        Arc::new(buckets.clone()),
        Arc::new(clock),
        Arc::new(transcription.clone()),
        Arc::new(labels.clone()),
        Arc::new(sentiment.clone()),
    );

    TestPipeline {
        ctx,
        buckets,
        transcription,
        labels,
        sentiment,
    }
}
