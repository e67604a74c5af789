//! Configuration module
//!
//! Every handler binary builds one [`PipelineConfig`] at process start and shares
//! it with the handler through `Arc`. Buckets and ARNs that only some handlers
//! need are optional here and checked by the `require_*` accessors.

use std::env;
use std::time::Duration;

use crate::error::AppError;

const TRANSCRIBE_LANGUAGE_CODE: &str = "en-US";
const MEDIA_FORMAT: &str = "mp4";
const SENTIMENT_LANGUAGE_CODE: &str = "en";
const UPLOAD_CONTENT_TYPE: &str = "video/mp4";
const PRESIGN_EXPIRY_SECS: u64 = 3600;
const CORS_ALLOW_ORIGIN: &str = "*";

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub input_bucket: Option<String>,
    pub output_bucket: String,
    /// Where Transcribe writes its raw `{id}.json`; falls back to the input bucket
    pub transcribe_output_bucket: Option<String>,
    pub sns_topic_arn: Option<String>,
    pub rekognition_role_arn: Option<String>,
    pub aws_region: Option<String>,
    pub transcribe_language_code: String,
    pub media_format: String,
    pub sentiment_language_code: String,
    pub upload_content_type: String,
    pub presign_expiry: Duration,
    /// Run sentiment analysis inside the transcription completion handler
    pub chain_sentiment: bool,
    pub cors_allow_origin: String,
}

/// SNS topic and IAM role Rekognition publishes job completion through
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationChannel {
    pub sns_topic_arn: String,
    pub role_arn: String,
}

impl PipelineConfig {
    /// Load from the process environment, honoring a `.env` file if present
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_source(|name| env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup
    pub fn from_source<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let output_bucket = var("OUTPUT_BUCKET")
            .ok_or_else(|| AppError::Config("OUTPUT_BUCKET must be set".to_string()))?;

        let presign_expiry_secs = match var("PRESIGN_EXPIRY_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| {
                AppError::Config(format!(
                    "PRESIGN_EXPIRY_SECS must be a positive number of seconds, got '{}'",
                    raw
                ))
            })?,
            None => PRESIGN_EXPIRY_SECS,
        };
        if presign_expiry_secs == 0 {
            return Err(AppError::Config(
                "PRESIGN_EXPIRY_SECS must be greater than zero".to_string(),
            ));
        }

        let chain_sentiment = var("CHAIN_SENTIMENT")
            .map(|raw| matches!(raw.to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            input_bucket: var("INPUT_BUCKET"),
            output_bucket,
            transcribe_output_bucket: var("TRANSCRIBE_OUTPUT_BUCKET"),
            sns_topic_arn: var("SNS_TOPIC_ARN"),
            rekognition_role_arn: var("REKOGNITION_ROLE_ARN"),
            aws_region: var("AWS_REGION"),
            transcribe_language_code: var("TRANSCRIBE_LANGUAGE_CODE")
                .unwrap_or_else(|| TRANSCRIBE_LANGUAGE_CODE.to_string()),
            media_format: var("MEDIA_FORMAT").unwrap_or_else(|| MEDIA_FORMAT.to_string()),
            sentiment_language_code: var("SENTIMENT_LANGUAGE_CODE")
                .unwrap_or_else(|| SENTIMENT_LANGUAGE_CODE.to_string()),
            upload_content_type: var("UPLOAD_CONTENT_TYPE")
                .unwrap_or_else(|| UPLOAD_CONTENT_TYPE.to_string()),
            presign_expiry: Duration::from_secs(presign_expiry_secs),
            chain_sentiment,
            cors_allow_origin: var("CORS_ALLOW_ORIGIN")
                .unwrap_or_else(|| CORS_ALLOW_ORIGIN.to_string()),
        })
    }

    pub fn require_input_bucket(&self) -> Result<&str, AppError> {
        self.input_bucket
            .as_deref()
            .ok_or_else(|| AppError::Config("INPUT_BUCKET must be set".to_string()))
    }

    /// Bucket holding Transcribe's raw output documents
    pub fn transcript_bucket(&self) -> Result<&str, AppError> {
        match self.transcribe_output_bucket.as_deref() {
            Some(bucket) => Ok(bucket),
            None => self.input_bucket.as_deref().ok_or_else(|| {
                AppError::Config(
                    "TRANSCRIBE_OUTPUT_BUCKET or INPUT_BUCKET must be set".to_string(),
                )
            }),
        }
    }

    pub fn require_notification_channel(&self) -> Result<NotificationChannel, AppError> {
        let sns_topic_arn = self
            .sns_topic_arn
            .clone()
            .ok_or_else(|| AppError::Config("SNS_TOPIC_ARN must be set".to_string()))?;
        let role_arn = self
            .rekognition_role_arn
            .clone()
            .ok_or_else(|| AppError::Config("REKOGNITION_ROLE_ARN must be set".to_string()))?;
        Ok(NotificationChannel {
            sns_topic_arn,
            role_arn,
        })
    }
}
