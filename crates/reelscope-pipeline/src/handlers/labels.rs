//! Label-Detection-Completion-Handler

use aws_lambda_events::event::sns::SnsEvent;
use chrono::SecondsFormat;
use reelscope_core::models::{group_labels, ArtifactKind, JobKind, JobState, LabelDetectionArtifact};
use reelscope_core::{AppError, CorrelationId};
use reelscope_services::{collect_results, MAX_RESULT_PAGES};
use reelscope_storage::JobTransition;
use serde_json::json;

use super::refresh_status;
use crate::events::LabelDetectionMessage;
use crate::{HandlerResponse, PipelineContext};

const SUCCEEDED: &str = "SUCCEEDED";

#[tracing::instrument(skip(ctx, event), fields(records = event.records.len(), operation = "process_labels"))]
pub async fn handle_label_detection(ctx: &PipelineContext, event: SnsEvent) -> HandlerResponse {
    let mut last = HandlerResponse::json_string(200, json!({ "status": "SUCCESS", "processed": 0 }));

    for record in event.records {
        let message: LabelDetectionMessage = match serde_json::from_str(&record.sns.message) {
            Ok(message) => message,
            Err(e) => {
                return HandlerResponse::failure(
                    500,
                    "Invalid label detection notification",
                    &AppError::from(e),
                )
            }
        };
        let response = process_notification(ctx, message).await;
        if !response.is_success() {
            return response;
        }
        last = response;
    }
    last
}

/// Handle one decoded completion message
pub async fn process_notification(ctx: &PipelineContext, message: LabelDetectionMessage) -> HandlerResponse {
    let id = match CorrelationId::from_object_key(&message.video.s3_object_name) {
        Ok(id) => id,
        Err(e) => return HandlerResponse::failure(500, "Invalid label detection notification", &e),
    };
    check_job_tag(&id, message.job_tag.as_deref());

    if message.status != SUCCEEDED {
        let error = format!("Rekognition job failed with status: {}", message.status);
        tracing::warn!(correlation_id = %id, job_id = %message.job_id, "{}", error);
        if let Err(e) = record_failure(ctx, &id, &message, &error).await {
            tracing::error!(error = %e, correlation_id = %id, "Failed to record label detection failure");
        }
        refresh_status(ctx, &id).await;
        return HandlerResponse::json_string(500, json!({ "status": "FAILED", "error": error }));
    }

    match store_results(ctx, &id, &message).await {
        Ok((key, label_count)) => HandlerResponse::json_string(
            200,
            json!({
                "status": "SUCCESS",
                "outputFile": key,
                "labelCount": label_count,
            }),
        ),
        Err(e) => HandlerResponse::failure(500, "Failed to process label detection results", &e),
    }
}

async fn store_results(
    ctx: &PipelineContext,
    id: &CorrelationId,
    message: &LabelDetectionMessage,
) -> Result<(String, usize), AppError> {
    let results = collect_results(ctx.labels.as_ref(), &message.job_id, MAX_RESULT_PAGES).await?;
    let label_count = results.labels.len();

    let artifact = LabelDetectionArtifact::succeeded(
        message.job_id.clone(),
        results.video_metadata,
        ctx.artifacts.now().to_rfc3339_opts(SecondsFormat::Millis, true),
        group_labels(results.labels),
    );
    let key = ctx
        .artifacts
        .write_pretty(id, ArtifactKind::Rekognition, &artifact)
        .await?;
    mark(ctx, id, message, JobState::Completed, None).await?;
    refresh_status(ctx, id).await;

    tracing::info!(
        correlation_id = %id,
        job_id = %message.job_id,
        pages = results.pages,
        label_count,
        "Label detection results saved"
    );
    Ok((key, label_count))
}

async fn record_failure(
    ctx: &PipelineContext,
    id: &CorrelationId,
    message: &LabelDetectionMessage,
    error: &str,
) -> Result<(), AppError> {
    let sentinel = LabelDetectionArtifact::failed(message.job_id.clone(), message.status.clone());
    ctx.artifacts
        .write_pretty(id, ArtifactKind::Rekognition, &sentinel)
        .await?;
    mark(ctx, id, message, JobState::Failed, Some(error.to_string())).await
}

async fn mark(
    ctx: &PipelineContext,
    id: &CorrelationId,
    message: &LabelDetectionMessage,
    state: JobState,
    error: Option<String>,
) -> Result<(), AppError> {
    ctx.artifacts
        .jobs()
        .transition(
            id,
            JobTransition {
                kind: JobKind::LabelDetection,
                state,
                job_name: message.job_tag.as_deref().unwrap_or(&message.job_id),
                job_id: Some(&message.job_id),
                error,
            },
            ctx.artifacts.now(),
        )
        .await?;
    Ok(())
}

/// The job tag carries the job name; both derivations must agree
fn check_job_tag(id: &CorrelationId, job_tag: Option<&str>) {
    let Some(tag) = job_tag else { return };
    match CorrelationId::from_job_name(tag) {
        Ok(from_tag) if &from_tag == id => {}
        Ok(from_tag) => tracing::warn!(
            correlation_id = %id,
            job_tag = %tag,
            tag_correlation_id = %from_tag,
            "Job tag does not match the video's correlation id"
        ),
        Err(e) => tracing::warn!(job_tag = %tag, error = %e, "Unparseable job tag"),
    }
}
