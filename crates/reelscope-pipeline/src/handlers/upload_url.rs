use reelscope_core::models::ArtifactKind;
use reelscope_core::{AppError, CorrelationId, ErrorMetadata, JobName};
use reelscope_storage::keys::validate_key;
use serde_json::json;

use super::refresh_status;
use crate::events::UploadUrlRequest;
use crate::{HandlerResponse, PipelineContext};

/// Issue a presigned upload URL and pre-create the result folder
#[tracing::instrument(skip(ctx, request), fields(key = %request.key, operation = "upload_url"))]
pub async fn handle_upload_url(ctx: &PipelineContext, request: UploadUrlRequest) -> HandlerResponse {
    match issue_upload_url(ctx, &request).await {
        Ok(url) => HandlerResponse::new(200, json!({ "url": url })),
        Err(e) => HandlerResponse::failure(e.http_status_code(), "Failed to issue upload URL", &e),
    }
}

async fn issue_upload_url(ctx: &PipelineContext, request: &UploadUrlRequest) -> Result<String, AppError> {
    let key = request.key.as_str();
    validate_key(key)?;
    let id = CorrelationId::from_object_key(key)?;
    // The launcher names both jobs after the id; refuse uploads it could not start
    JobName::generate(&id)?;

    let url = ctx
        .input_storage()?
        .presigned_put_url(key, &ctx.config.upload_content_type, ctx.config.presign_expiry)
        .await?;

    ctx.artifacts.create_folder(&id).await?;
    let name = request.name.as_deref().unwrap_or(key);
    ctx.artifacts.write(&id, ArtifactKind::Name, name).await?;
    refresh_status(ctx, &id).await;

    tracing::info!(correlation_id = %id, "Issued upload URL");
    Ok(url)
}
