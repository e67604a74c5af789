//! Sentiment-Handler: score a finished transcript

use aws_lambda_events::event::s3::S3Event;
use reelscope_core::models::{ArtifactKind, SentimentAnalysis, SentimentArtifact, TranscriptArtifact};
use reelscope_core::{decode_object_key, AppError, CorrelationId};
use reelscope_services::{truncate_to_limit, MAX_SENTIMENT_TEXT_BYTES};
use reelscope_storage::keys::artifact_key;
use serde_json::{json, Value};

use super::refresh_status;
use crate::{HandlerResponse, PipelineContext};

pub const RETRIEVE_FAILED: &str = "Failed to retrieve transcript";
pub const ANALYZE_FAILED: &str = "Failed to analyze sentiment";

#[derive(Debug, Clone, PartialEq)]
pub enum SentimentOutcome {
    /// No usable transcript; the `{exists: false}` sentinel was written
    Skipped,
    Analyzed(SentimentAnalysis),
}

#[tracing::instrument(skip(ctx, event), fields(records = event.records.len(), operation = "analyze_sentiment"))]
pub async fn handle_transcript_created(ctx: &PipelineContext, event: S3Event) -> HandlerResponse {
    let mut processed: Vec<Value> = Vec::new();

    for record in event.records {
        let raw_key = record.s3.object.key.unwrap_or_default();
        let id = match transcript_id(&raw_key) {
            Ok(Some(id)) => id,
            Ok(None) => {
                tracing::debug!(key = %raw_key, "Ignoring object that is not a transcript artifact");
                continue;
            }
            Err(e) => return HandlerResponse::failure(500, RETRIEVE_FAILED, &e),
        };

        let transcript: TranscriptArtifact = match ctx.artifacts.read(&id, ArtifactKind::Transcribe).await {
            Ok(transcript) => transcript,
            Err(e) => return HandlerResponse::failure(500, RETRIEVE_FAILED, &AppError::from(e)),
        };

        match analyze_transcript(ctx, &id, transcript).await {
            Ok(outcome) => processed.push(json!({
                "correlationId": id,
                "analyzed": matches!(outcome, SentimentOutcome::Analyzed(_)),
            })),
            Err(e) => return HandlerResponse::failure(500, ANALYZE_FAILED, &e),
        }
    }

    HandlerResponse::json_string(
        200,
        json!({
            "message": "Comprehend analysis success",
            "processed": processed,
        }),
    )
}

/// Run sentiment over a transcript artifact and persist `comprehend.json`
///
/// Missing or whitespace-only transcripts short-circuit to the sentinel
/// without calling the sentiment service.
pub async fn analyze_transcript(
    ctx: &PipelineContext,
    id: &CorrelationId,
    transcript: TranscriptArtifact,
) -> Result<SentimentOutcome, AppError> {
    let text = match transcript.into_data() {
        Some(text) if !text.trim().is_empty() => text,
        _ => {
            tracing::info!(correlation_id = %id, "No transcript text, skipping sentiment analysis");
            ctx.artifacts.write_absent(id, ArtifactKind::Comprehend).await?;
            refresh_status(ctx, id).await;
            return Ok(SentimentOutcome::Skipped);
        }
    };

    let text = truncate_to_limit(&text, MAX_SENTIMENT_TEXT_BYTES);
    let analysis = ctx
        .sentiment
        .detect_sentiment(text, &ctx.config.sentiment_language_code)
        .await?;

    ctx.artifacts
        .write(id, ArtifactKind::Comprehend, &SentimentArtifact::present(analysis.clone()))
        .await?;
    refresh_status(ctx, id).await;

    tracing::info!(correlation_id = %id, sentiment = %analysis.sentiment, "Sentiment analysis saved");
    Ok(SentimentOutcome::Analyzed(analysis))
}

/// CorrelationId of a `{id}/transcribe.json` key; `None` for any other object
fn transcript_id(raw_key: &str) -> Result<Option<CorrelationId>, AppError> {
    let key = decode_object_key(raw_key)?;
    let Ok(id) = CorrelationId::from_artifact_key(&key) else {
        return Ok(None);
    };
    if key == artifact_key(&id, ArtifactKind::Transcribe) {
        Ok(Some(id))
    } else {
        Ok(None)
    }
}
