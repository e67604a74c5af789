use reelscope_core::{AppError, Clock, PipelineConfig};
use reelscope_services::{LabelDetectionService, SentimentService, TranscriptionService};
use reelscope_storage::{ArtifactStore, Storage, StorageProvider};
use std::sync::Arc;

/// Everything a handler needs, built once per process and shared
#[derive(Clone)]
pub struct PipelineContext {
    pub config: Arc<PipelineConfig>,
    pub buckets: Arc<dyn StorageProvider>,
    /// Output bucket, where artifacts and job records live
    pub artifacts: ArtifactStore,
    pub transcription: Arc<dyn TranscriptionService>,
    pub labels: Arc<dyn LabelDetectionService>,
    pub sentiment: Arc<dyn SentimentService>,
}

impl PipelineContext {
    pub fn new(
        config: Arc<PipelineConfig>,
        buckets: Arc<dyn StorageProvider>,
        clock: Arc<dyn Clock>,
        transcription: Arc<dyn TranscriptionService>,
        labels: Arc<dyn LabelDetectionService>,
        sentiment: Arc<dyn SentimentService>,
    ) -> Self {
        let artifacts = ArtifactStore::new(buckets.bucket(&config.output_bucket), clock);
        Self {
            config,
            buckets,
            artifacts,
            transcription,
            labels,
            sentiment,
        }
    }

    /// Bucket clients upload media into
    pub fn input_storage(&self) -> Result<Arc<dyn Storage>, AppError> {
        Ok(self.buckets.bucket(self.config.require_input_bucket()?))
    }

    /// Bucket Transcribe writes its raw output documents to
    pub fn transcript_storage(&self) -> Result<Arc<dyn Storage>, AppError> {
        Ok(self.buckets.bucket(self.config.transcript_bucket()?))
    }
}
