use aws_lambda_events::event::s3::S3Event;
use aws_lambda_events::event::sns::SnsEvent;
use reelscope_core::models::{DetectedLabel, LabelInfo};
use reelscope_pipeline::events::{OutputRequest, TranscriptionJobEvent, UploadUrlRequest};
use serde_json::{json, Value};
use std::collections::HashMap;

const S3_OBJECT_CREATED: &str = include_str!("../fixtures/s3-object-created.json");
const SNS_LABEL_DETECTION: &str = include_str!("../fixtures/sns-label-detection.json");
const TRANSCRIBE_JOB_STATE_CHANGE: &str = include_str!("../fixtures/transcribe-job-state-change.json");

fn fixture(raw: &str) -> Value {
    serde_json::from_str(raw).expect("fixture is valid JSON")
}

pub fn upload_url_request(key: &str, name: Option<&str>) -> UploadUrlRequest {
    UploadUrlRequest {
        key: key.to_string(),
        name: name.map(str::to_string),
    }
}

/// Object-created notification for `key` in `bucket`
pub fn object_created(bucket: &str, key: &str) -> S3Event {
    let mut event = fixture(S3_OBJECT_CREATED);
    event["Records"][0]["s3"]["bucket"]["name"] = json!(bucket);
    event["Records"][0]["s3"]["bucket"]["arn"] = json!(format!("arn:aws:s3:::{}", bucket));
    event["Records"][0]["s3"]["object"]["key"] = json!(key);
    serde_json::from_value(event).expect("S3 event fixture deserializes")
}

pub fn transcription_state_change(job_name: &str, status: &str) -> TranscriptionJobEvent {
    let mut event = fixture(TRANSCRIBE_JOB_STATE_CHANGE);
    event["detail"]["TranscriptionJobName"] = json!(job_name);
    event["detail"]["TranscriptionJobStatus"] = json!(status);
    serde_json::from_value(event).expect("Transcribe event fixture deserializes")
}

/// Rekognition completion notification delivered through SNS
pub fn label_detection_completed(job_id: &str, status: &str, job_tag: &str, object: &str) -> SnsEvent {
    let message = json!({
        "JobId": job_id,
        "Status": status,
        "API": "StartLabelDetection",
        "JobTag": job_tag,
        "Timestamp": 1714565100000i64,
        "Video": {"S3ObjectName": object, "S3Bucket": super::INPUT_BUCKET}
    });
    let mut event = fixture(SNS_LABEL_DETECTION);
    event["Records"][0]["Sns"]["Message"] = json!(message.to_string());
    serde_json::from_value(event).expect("SNS event fixture deserializes")
}

pub fn output_request(name: &str) -> OutputRequest {
    OutputRequest {
        path_parameters: Some(HashMap::from([("name".to_string(), name.to_string())])),
    }
}

/// Raw Transcribe output document
pub fn transcribe_output(text: &str) -> String {
    json!({
        "jobName": "ignored",
        "accountId": "123456789012",
        "results": {"transcripts": [{"transcript": text}], "items": []},
        "status": "COMPLETED"
    })
    .to_string()
}

pub fn detection(timestamp_ms: i64, name: &str, confidence: f32, parents: &[&str]) -> DetectedLabel {
    DetectedLabel {
        timestamp_ms,
        label: LabelInfo {
            name: name.to_string(),
            confidence,
            parents: parents.iter().map(|p| p.to_string()).collect(),
        },
    }
}
