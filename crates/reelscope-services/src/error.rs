use reelscope_core::AppError;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failures reported by the managed analysis services
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Transcription service error: {0}")]
    Transcription(String),

    #[error("Label detection service error: {0}")]
    LabelDetection(String),

    #[error("Sentiment service error: {0}")]
    Sentiment(String),

    #[error("Invalid service request: {0}")]
    InvalidRequest(String),

    #[error("Unexpected service response: {0}")]
    UnexpectedResponse(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidRequest(message) => AppError::InvalidInput(message),
            other => AppError::Service(other.to_string()),
        }
    }
}
