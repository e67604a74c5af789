//! Handler response envelope
//!
//! Every handler answers with `{statusCode, headers?, body}`. Handled failures
//! are responses too, so the invocation itself only fails on events that cannot
//! be deserialized.

use reelscope_core::{AppError, ErrorMetadata, LogLevel};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub const CORS_ALLOW_HEADERS: &str =
    "Content-Type,X-Amz-Date,Authorization,X-Api-Key,X-Amz-Security-Token";
pub const CORS_ALLOW_METHODS: &str = "GET,OPTIONS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

impl HandlerResponse {
    /// Response whose body is the JSON value itself
    pub fn new(status_code: u16, body: Value) -> Self {
        Self {
            status_code,
            headers: BTreeMap::new(),
            body,
        }
    }

    /// Response whose body is `body` serialized to a string, as proxy
    /// integrations expect
    pub fn json_string(status_code: u16, body: Value) -> Self {
        Self::new(status_code, Value::String(body.to_string()))
    }

    /// A handled failure: logged at the error's level, answered with
    /// `{message, error}`
    pub fn failure(status_code: u16, message: &str, error: &AppError) -> Self {
        log_error(message, error);
        Self::json_string(
            status_code,
            json!({
                "message": message,
                "error": error.to_string(),
            }),
        )
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_cors(self, allow_origin: &str) -> Self {
        self.with_header("Access-Control-Allow-Origin", allow_origin)
            .with_header("Access-Control-Allow-Headers", CORS_ALLOW_HEADERS)
            .with_header("Access-Control-Allow-Methods", CORS_ALLOW_METHODS)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// The body as JSON, parsing it first when it was sent as a string
    pub fn body_json(&self) -> Value {
        match &self.body {
            Value::String(text) => serde_json::from_str(text).unwrap_or_else(|_| self.body.clone()),
            other => other.clone(),
        }
    }
}

fn log_error(message: &str, error: &AppError) {
    let error_code = error.error_code();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_code = error_code, "{}", message);
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_code = error_code, "{}", message);
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_code = error_code, "{}", message);
        }
    }
}
