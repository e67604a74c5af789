//! Result-Aggregator: merge every artifact of one upload into one object

use reelscope_core::models::ArtifactKind;
use reelscope_core::CorrelationId;
use reelscope_storage::keys::json_stem;
use reelscope_storage::StorageError;
use serde_json::{json, Map, Value};

use crate::events::OutputRequest;
use crate::{HandlerResponse, PipelineContext};

#[tracing::instrument(skip(ctx, request), fields(name = ?request.name(), operation = "get_output"))]
pub async fn handle_get_output(ctx: &PipelineContext, request: OutputRequest) -> HandlerResponse {
    let origin = ctx.config.cors_allow_origin.as_str();
    let message = |status: u16, message: String| {
        HandlerResponse::json_string(status, json!({ "message": message })).with_cors(origin)
    };

    let Some(name) = request.name() else {
        return message(400, "Missing path parameter 'name'".to_string());
    };
    let id = match CorrelationId::parse(name) {
        Ok(id) => id,
        Err(e) => return message(400, e.to_string()),
    };

    match collect_output(ctx, &id).await {
        Ok(Some(result)) => HandlerResponse::json_string(200, Value::Object(result))
            .with_header("Content-Type", "application/json")
            .with_cors(origin),
        Ok(None) => message(404, format!("Folder {} not found", id)),
        Err(StorageError::BucketNotFound(bucket)) => {
            tracing::warn!(bucket = %bucket, "Output bucket does not exist");
            message(404, "Specified bucket does not exist".to_string())
        }
        Err(e) => {
            tracing::error!(error = %e, correlation_id = %id, "Failed to read output");
            message(500, "Internal server error".to_string())
        }
    }
}

/// Every `.json` artifact directly under `{id}/`, keyed by file stem
///
/// `None` when the folder holds no objects at all.
async fn collect_output(
    ctx: &PipelineContext,
    id: &CorrelationId,
) -> Result<Option<Map<String, Value>>, StorageError> {
    let keys = ctx.artifacts.listing(id).await?;
    if keys.is_empty() {
        return Ok(None);
    }
    collect_output_from(ctx, id, &keys).await.map(Some)
}

/// Read the artifacts named by `keys`
///
/// Keys deleted after the listing are left out. A stored status entry is
/// replaced by one computed from the keys that were actually read.
async fn collect_output_from(
    ctx: &PipelineContext,
    id: &CorrelationId,
    keys: &[String],
) -> Result<Map<String, Value>, StorageError> {
    let folder = id.folder();
    let mut result = Map::new();
    let mut read_keys = Vec::with_capacity(keys.len());
    let mut has_status = false;
    for key in keys {
        let Some(stem) = json_stem(&folder, key) else {
            continue;
        };
        if stem == ArtifactKind::Status.as_str() {
            has_status = true;
            continue;
        }
        match ctx.artifacts.read_key::<Value>(key).await {
            Ok(value) => {
                result.insert(stem.to_string(), value);
                read_keys.push(key.clone());
            }
            Err(StorageError::NotFound(_)) => {
                tracing::debug!(key = %key, "Artifact removed after listing");
            }
            Err(e) => return Err(e),
        }
    }

    if has_status {
        let status = ctx.artifacts.status_from_listing(id, &read_keys).await?;
        result.insert(ArtifactKind::Status.as_str().to_string(), serde_json::to_value(status)?);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::Harness;
    use std::collections::HashMap;

    fn request(name: &str) -> OutputRequest {
        OutputRequest {
            path_parameters: Some(HashMap::from([("name".to_string(), name.to_string())])),
        }
    }

    #[tokio::test]
    async fn test_merges_artifacts_by_stem() {
        let harness = Harness::new();
        let output = harness.output();
        output.set_object("movie1/", Vec::new());
        output.set_object("movie1/name.json", r#""My Movie""#);
        output.set_object("movie1/transcribe.json", r#"{"exists":true,"data":"hi"}"#);
        output.set_object("movie1/poster.png", "binary");
        output.set_object("movie1/jobs/transcription.json", "{}");

        let response = handle_get_output(&harness.ctx, request("movie1")).await;
        assert_eq!(response.status_code, 200);
        assert!(response.body.is_string());
        assert_eq!(
            response.body_json(),
            json!({"name": "My Movie", "transcribe": {"exists": true, "data": "hi"}})
        );
        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(response.headers["Content-Type"], "application/json");
    }

    #[tokio::test]
    async fn test_empty_folder_is_404() {
        let harness = Harness::new();
        let response = handle_get_output(&harness.ctx, request("movie1")).await;
        assert_eq!(response.status_code, 404);
        assert_eq!(response.body_json(), json!({"message": "Folder movie1 not found"}));
        assert_eq!(response.headers["Access-Control-Allow-Methods"], "GET,OPTIONS");
    }

    #[tokio::test]
    async fn test_missing_bucket_is_404() {
        let harness = Harness::new();
        harness.buckets.delete_bucket("output");
        // The context still holds the original handle; rebuild it on the missing bucket
        let ctx = crate::PipelineContext::new(
            harness.ctx.config.clone(),
            harness.ctx.buckets.clone(),
            std::sync::Arc::new(reelscope_core::SystemClock),
            harness.ctx.transcription.clone(),
            harness.ctx.labels.clone(),
            harness.ctx.sentiment.clone(),
        );
        let response = handle_get_output(&ctx, request("movie1")).await;
        assert_eq!(response.status_code, 404);
        assert_eq!(response.body_json()["message"], "Specified bucket does not exist");
    }

    #[tokio::test]
    async fn test_other_storage_errors_are_500() {
        let harness = Harness::new();
        harness.output().fail_lists("SlowDown");
        let response = handle_get_output(&harness.ctx, request("movie1")).await;
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body_json()["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_artifact_removed_after_listing_is_skipped() {
        let harness = Harness::new();
        let output = harness.output();
        output.set_object("movie1/name.json", r#""n""#);
        output.set_object("movie1/transcribe.json", r#"{"exists":true,"data":"hi"}"#);

        let id = CorrelationId::parse("movie1").unwrap();
        let keys = harness.ctx.artifacts.listing(&id).await.unwrap();
        output.remove_object("movie1/transcribe.json");

        let result = collect_output_from(&harness.ctx, &id, &keys).await.unwrap();
        assert_eq!(Value::Object(result), json!({"name": "n"}));
    }

    #[tokio::test]
    async fn test_stored_status_is_recomputed() {
        let harness = Harness::new();
        let output = harness.output();
        output.set_object("movie1/name.json", r#""n""#);
        output.set_object("movie1/status.json", r#"{"stale":true}"#);

        let response = handle_get_output(&harness.ctx, request("movie1")).await;
        let body = response.body_json();
        assert_eq!(body["status"]["present"], json!(["name"]));
        assert!(body["status"].get("stale").is_none());
    }

    #[tokio::test]
    async fn test_missing_name_is_400() {
        let harness = Harness::new();
        let response = handle_get_output(&harness.ctx, OutputRequest::default()).await;
        assert_eq!(response.status_code, 400);
    }
}
