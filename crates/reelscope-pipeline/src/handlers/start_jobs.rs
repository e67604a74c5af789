//! Job-Launcher: start transcription and label detection for an upload

use aws_lambda_events::event::s3::S3Event;
use reelscope_core::models::{JobKind, JobRecord, JobState};
use reelscope_core::{decode_object_key, AppError, CorrelationId, JobName};
use reelscope_services::{LabelDetectionJobRequest, ServiceError, TranscriptionJobRequest};
use reelscope_storage::keys::transcript_source_key;
use serde_json::{json, Value};

use super::refresh_status;
use crate::{HandlerResponse, PipelineContext};

/// Result of launching both jobs for one uploaded object
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchOutcome {
    pub correlation_id: CorrelationId,
    pub job_name: JobName,
    /// Kinds whose start call failed, with the service error
    pub failed: Vec<(JobKind, String)>,
}

#[tracing::instrument(skip(ctx, event), fields(records = event.records.len(), operation = "start_jobs"))]
pub async fn handle_upload_created(ctx: &PipelineContext, event: S3Event) -> HandlerResponse {
    let mut launched: Vec<Value> = Vec::new();
    let mut errors: Vec<Value> = Vec::new();

    for record in event.records {
        let raw_key = record.s3.object.key.unwrap_or_default();
        if let Some(bucket) = record.s3.bucket.name.as_deref() {
            if ctx.config.input_bucket.as_deref() != Some(bucket) {
                tracing::warn!(event_bucket = %bucket, "Upload event is not from the configured input bucket");
            }
        }

        match launch_jobs(ctx, &raw_key).await {
            Ok(outcome) if outcome.failed.is_empty() => launched.push(json!({
                "correlationId": outcome.correlation_id,
                "jobName": outcome.job_name,
            })),
            Ok(outcome) => {
                for (kind, error) in outcome.failed {
                    tracing::error!(
                        correlation_id = %outcome.correlation_id,
                        job_name = %outcome.job_name,
                        kind = kind.as_str(),
                        error = %error,
                        "Failed to start job"
                    );
                    errors.push(json!({ "key": raw_key, "kind": kind, "error": error }));
                }
            }
            Err(e) => {
                tracing::error!(key = %raw_key, error = %e, "Failed to launch jobs");
                errors.push(json!({ "key": raw_key, "error": e.to_string() }));
            }
        }
    }

    if errors.is_empty() {
        HandlerResponse::json_string(
            200,
            json!({
                "message": "Transcribe + Rekognition job success",
                "jobs": launched,
            }),
        )
    } else {
        let error = errors
            .iter()
            .filter_map(|e| e["error"].as_str())
            .collect::<Vec<_>>()
            .join("; ");
        HandlerResponse::json_string(
            500,
            json!({
                "message": "Failed to start Transcribe + Rekognition job",
                "error": error,
                "failures": errors,
                "jobs": launched,
            }),
        )
    }
}

/// Requests for both jobs of one upload, sharing a freshly generated job name
struct LaunchPlan {
    job_name: JobName,
    transcription: TranscriptionJobRequest,
    labels: LabelDetectionJobRequest,
}

/// Start both jobs for one (still URL-encoded) object key
///
/// The two start calls run concurrently and independently; a failure of one
/// is recorded and does not cancel or roll back the other. `Err` is returned
/// when nothing could be attempted or the records could not be written. Once a
/// CorrelationId is known, every failure leaves FAILED records behind.
pub async fn launch_jobs(ctx: &PipelineContext, raw_key: &str) -> Result<LaunchOutcome, AppError> {
    let key = decode_object_key(raw_key)?;
    let id = CorrelationId::from_object_key(&key)?;

    let plan = match plan_launch(ctx, &id, &key) {
        Ok(plan) => plan,
        Err(e) => {
            record_launch_failure(ctx, &id, &e).await;
            return Err(e);
        }
    };

    tracing::info!(correlation_id = %id, job_name = %plan.job_name, "Starting jobs");
    let (transcription, labels) = tokio::join!(
        ctx.transcription.start_job(&plan.transcription),
        ctx.labels.start_job(&plan.labels),
    );

    let job_name = plan.job_name;
    let now = ctx.artifacts.now();
    let mut failed = Vec::new();
    let records = [
        launch_record(
            &id,
            JobKind::Transcription,
            &job_name,
            transcription.map(|()| None),
            now,
            &mut failed,
        ),
        launch_record(&id, JobKind::LabelDetection, &job_name, labels.map(Some), now, &mut failed),
    ];

    for record in &records {
        ctx.artifacts.jobs().put(record).await?;
    }
    for (kind, _) in &failed {
        for artifact in kind.artifacts() {
            ctx.artifacts.write_absent(&id, *artifact).await?;
        }
    }
    refresh_status(ctx, &id).await;

    Ok(LaunchOutcome {
        correlation_id: id,
        job_name,
        failed,
    })
}

fn plan_launch(ctx: &PipelineContext, id: &CorrelationId, key: &str) -> Result<LaunchPlan, AppError> {
    let job_name = JobName::generate(id)?;
    let input_bucket = ctx.config.require_input_bucket()?;

    let transcription = TranscriptionJobRequest {
        job_name: job_name.clone(),
        media_uri: format!("s3://{}/{}", input_bucket, key),
        media_format: ctx.config.media_format.clone(),
        language_code: ctx.config.transcribe_language_code.clone(),
        output_bucket: ctx.config.transcript_bucket()?.to_string(),
        output_key: transcript_source_key(id),
    };
    let labels = LabelDetectionJobRequest {
        bucket: input_bucket.to_string(),
        object_name: key.to_string(),
        job_tag: job_name.clone(),
        channel: ctx.config.require_notification_channel()?,
    };

    Ok(LaunchPlan {
        job_name,
        transcription,
        labels,
    })
}

/// Mark both jobs FAILED and write every sentinel when neither could be started
///
/// Writes are best effort; the launch error is what the caller reports.
async fn record_launch_failure(ctx: &PipelineContext, id: &CorrelationId, error: &AppError) {
    let now = ctx.artifacts.now();
    for kind in JobKind::ALL {
        // No job name exists when generating it was the failure
        let record = JobRecord::new(id.clone(), kind, "", JobState::Failed, now)
            .with_error(error.to_string());
        if let Err(e) = ctx.artifacts.jobs().put(&record).await {
            tracing::warn!(
                error = %e,
                correlation_id = %id,
                kind = kind.as_str(),
                "Failed to record launch failure"
            );
        }
        for artifact in kind.artifacts() {
            if let Err(e) = ctx.artifacts.write_absent(id, *artifact).await {
                tracing::warn!(
                    error = %e,
                    correlation_id = %id,
                    artifact = artifact.as_str(),
                    "Failed to write sentinel"
                );
            }
        }
    }
    refresh_status(ctx, id).await;
}

fn launch_record(
    id: &CorrelationId,
    kind: JobKind,
    job_name: &JobName,
    result: Result<Option<String>, ServiceError>,
    now: chrono::DateTime<chrono::Utc>,
    failed: &mut Vec<(JobKind, String)>,
) -> JobRecord {
    match result {
        Ok(job_id) => {
            let record = JobRecord::new(id.clone(), kind, job_name.as_str(), JobState::Launched, now);
            match job_id {
                Some(job_id) => record.with_job_id(job_id),
                None => record,
            }
        }
        Err(e) => {
            let error = e.to_string();
            failed.push((kind, error.clone()));
            JobRecord::new(id.clone(), kind, job_name.as_str(), JobState::Failed, now).with_error(error)
        }
    }
}
