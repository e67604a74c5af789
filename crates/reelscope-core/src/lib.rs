//! Reelscope Core Library
//!
//! Domain pieces shared by every reelscope handler: the CorrelationId and
//! job-name derivation rules, artifact and job-record models, pipeline
//! configuration, error types and the clock used to stamp artifacts.

pub mod clock;
pub mod config;
pub mod correlation;
pub mod error;
pub mod models;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{NotificationChannel, PipelineConfig};
pub use correlation::{decode_object_key, CorrelationId, JobName};
pub use error::{AppError, ErrorMetadata, LogLevel};
