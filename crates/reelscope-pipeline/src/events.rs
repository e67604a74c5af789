//! Payloads handlers receive that `aws_lambda_events` does not model
//!
//! Storage and notification triggers use the library's `S3Event` and
//! `SnsEvent`; the types here cover the direct-invoke request, the EventBridge
//! detail, the SNS message body and the raw transcript document.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Upload URL request, sent by direct invoke or as an API body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadUrlRequest {
    #[serde(default)]
    pub key: String,
    /// Display name; the key is used when absent
    #[serde(default)]
    pub name: Option<String>,
}

/// EventBridge "Transcribe Job State Change" event
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TranscriptionJobEvent {
    pub detail: TranscriptionJobDetail,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TranscriptionJobDetail {
    pub transcription_job_name: String,
    pub transcription_job_status: String,
    #[serde(default)]
    pub failure_reason: Option<String>,
}

/// Body of the SNS message Rekognition publishes when a video job ends
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LabelDetectionMessage {
    pub job_id: String,
    pub status: String,
    #[serde(default)]
    pub job_tag: Option<String>,
    #[serde(default, rename = "API")]
    pub api: Option<String>,
    pub video: VideoReference,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VideoReference {
    pub s3_object_name: String,
    #[serde(default)]
    pub s3_bucket: Option<String>,
}

/// API Gateway proxy request; only the path parameters are read
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputRequest {
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
}

impl OutputRequest {
    pub fn name(&self) -> Option<&str> {
        self.path_parameters
            .as_ref()
            .and_then(|params| params.get("name"))
            .map(String::as_str)
    }
}

/// Raw document Transcribe writes to its output bucket
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TranscribeOutput {
    #[serde(default)]
    pub results: TranscribeResults,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TranscribeResults {
    #[serde(default)]
    pub transcripts: Vec<TranscriptText>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct TranscriptText {
    #[serde(default)]
    pub transcript: String,
}

impl TranscribeOutput {
    /// First transcript alternative, empty when there is none
    pub fn into_transcript(self) -> String {
        self.results
            .transcripts
            .into_iter()
            .next()
            .map(|t| t.transcript)
            .unwrap_or_default()
    }
}
