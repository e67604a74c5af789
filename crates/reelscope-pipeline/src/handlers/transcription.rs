//! Transcription-Completion-Handler

use reelscope_core::models::{ArtifactKind, JobKind, JobState, TranscriptArtifact};
use reelscope_core::{AppError, CorrelationId};
use reelscope_storage::keys::transcript_source_key;
use reelscope_storage::JobTransition;
use serde_json::json;

use super::refresh_status;
use super::sentiment::{analyze_transcript, SentimentOutcome};
use crate::events::{TranscribeOutput, TranscriptionJobDetail, TranscriptionJobEvent};
use crate::{HandlerResponse, PipelineContext};

#[tracing::instrument(
    skip(ctx, event),
    fields(
        job_name = %event.detail.transcription_job_name,
        status = %event.detail.transcription_job_status,
        operation = "process_transcription"
    )
)]
pub async fn handle_transcription_event(ctx: &PipelineContext, event: TranscriptionJobEvent) -> HandlerResponse {
    let detail = event.detail;
    match process(ctx, &detail).await {
        Ok(sentiment) => {
            let mut body = json!({
                "message": format!("Successfully processed transcribe job {}", detail.transcription_job_name),
                "status": detail.transcription_job_status,
            });
            if let Some(outcome) = sentiment {
                body["sentiment"] = json!(match outcome {
                    SentimentOutcome::Skipped => "SKIPPED",
                    SentimentOutcome::Analyzed(_) => "ANALYZED",
                });
            }
            HandlerResponse::json_string(200, body)
        }
        Err(e) => HandlerResponse::failure(500, "Error processing transcribe job", &e),
    }
}

/// Returns the chained sentiment outcome when sentiment ran inline
async fn process(
    ctx: &PipelineContext,
    detail: &TranscriptionJobDetail,
) -> Result<Option<SentimentOutcome>, AppError> {
    let job_name = detail.transcription_job_name.as_str();
    let id = CorrelationId::from_job_name(job_name)?;

    let transition = match detail.transcription_job_status.as_str() {
        "COMPLETED" => {
            let transcript = fetch_transcript(ctx, &id).await?;
            let artifact = TranscriptArtifact::present(transcript);
            ctx.artifacts.write(&id, ArtifactKind::Transcribe, &artifact).await?;
            mark(ctx, &id, job_name, JobState::Completed, None).await?;

            if ctx.config.chain_sentiment {
                // analyze_transcript refreshes the status itself
                return analyze_transcript(ctx, &id, artifact).await.map(Some);
            }
            JobState::Completed
        }
        "FAILED" => {
            for kind in JobKind::Transcription.artifacts() {
                ctx.artifacts.write_absent(&id, *kind).await?;
            }
            let reason = detail
                .failure_reason
                .clone()
                .unwrap_or_else(|| "Transcription job failed".to_string());
            mark(ctx, &id, job_name, JobState::Failed, Some(reason)).await?;
            JobState::Failed
        }
        other => {
            tracing::debug!(correlation_id = %id, status = %other, "Ignoring non-terminal transcription status");
            return Ok(None);
        }
    };

    refresh_status(ctx, &id).await;
    tracing::info!(correlation_id = %id, state = ?transition, "Transcription job processed");
    Ok(None)
}

async fn fetch_transcript(ctx: &PipelineContext, id: &CorrelationId) -> Result<String, AppError> {
    let bytes = ctx
        .transcript_storage()?
        .get_object(&transcript_source_key(id))
        .await?;
    let output: TranscribeOutput = serde_json::from_slice(&bytes)?;
    Ok(output.into_transcript())
}

async fn mark(
    ctx: &PipelineContext,
    id: &CorrelationId,
    job_name: &str,
    state: JobState,
    error: Option<String>,
) -> Result<(), AppError> {
    ctx.artifacts
        .jobs()
        .transition(
            id,
            JobTransition {
                kind: JobKind::Transcription,
                state,
                job_name,
                job_id: None,
                error,
            },
            ctx.artifacts.now(),
        )
        .await?;
    Ok(())
}
