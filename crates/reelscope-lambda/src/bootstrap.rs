//! Cold-start wiring: configuration, AWS clients, [`PipelineContext`]

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use reelscope_core::{PipelineConfig, SystemClock};
use reelscope_pipeline::PipelineContext;
use reelscope_services::{AwsLabelDetectionService, AwsSentimentService, AwsTranscriptionService};
use reelscope_storage::S3StorageProvider;
use std::sync::Arc;

/// Build the shared context from the process environment
pub async fn build_context() -> Result<PipelineContext> {
    let config = PipelineConfig::from_env().context("Failed to load pipeline configuration")?;

    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = config.aws_region.clone() {
        loader = loader.region(Region::new(region));
    }
    let sdk_config = loader.load().await;

    tracing::info!(
        output_bucket = %config.output_bucket,
        input_bucket = config.input_bucket.as_deref().unwrap_or("<unset>"),
        region = sdk_config.region().map(|r| r.as_ref()).unwrap_or("<default>"),
        chain_sentiment = config.chain_sentiment,
        "Configuration loaded"
    );

    let buckets = S3StorageProvider::new(aws_sdk_s3::Client::new(&sdk_config));
    let transcription = AwsTranscriptionService::new(aws_sdk_transcribe::Client::new(&sdk_config));
    let labels = AwsLabelDetectionService::new(aws_sdk_rekognition::Client::new(&sdk_config));
    let sentiment = AwsSentimentService::new(aws_sdk_comprehend::Client::new(&sdk_config));

    Ok(PipelineContext::new(
        Arc::new(config),
        Arc::new(buckets),
        Arc::new(SystemClock),
        Arc::new(transcription),
        Arc::new(labels),
        Arc::new(sentiment),
    ))
}
