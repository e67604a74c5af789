//! Reelscope Pipeline Library
//!
//! The handler logic of the media-analysis pipeline, independent of the Lambda
//! runtime. Every handler takes a [`PipelineContext`] plus its decoded trigger
//! payload and answers with a [`HandlerResponse`]:
//!
//! - [`handle_upload_url`] issues a presigned upload URL and records the display name
//! - [`handle_upload_created`] starts transcription and label detection for a new upload
//! - [`handle_transcription_event`] stores the transcript once Transcribe finishes
//! - [`handle_transcript_created`] runs sentiment analysis on a stored transcript
//! - [`handle_label_detection`] collects and groups label detection results
//! - [`handle_get_output`] merges all artifacts of one upload
//!
//! Service clients and buckets sit behind traits, so the whole pipeline runs
//! against in-memory storage and mock services in tests.

pub mod context;
pub mod events;
pub mod handlers;
pub mod response;

pub use context::PipelineContext;
pub use handlers::{
    analyze_transcript, handle_get_output, handle_label_detection, handle_transcript_created,
    handle_transcription_event, handle_upload_created, handle_upload_url,
};
pub use response::HandlerResponse;
