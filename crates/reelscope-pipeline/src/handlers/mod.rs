//! The six pipeline handlers
//!
//! Each handler takes the shared [`PipelineContext`](crate::PipelineContext)
//! and its trigger payload, and always answers with a
//! [`HandlerResponse`](crate::HandlerResponse).

pub mod labels;
pub mod output;
pub mod sentiment;
pub mod start_jobs;
pub mod transcription;
pub mod upload_url;

pub use labels::handle_label_detection;
pub use output::handle_get_output;
pub use sentiment::{analyze_transcript, handle_transcript_created};
pub use start_jobs::handle_upload_created;
pub use transcription::handle_transcription_event;
pub use upload_url::handle_upload_url;

use crate::PipelineContext;
use reelscope_core::CorrelationId;

/// Rewrite `status.json` after a handler's own writes
///
/// The status artifact is advisory, so a failure here is logged but does not
/// fail the handler.
pub(crate) async fn refresh_status(ctx: &PipelineContext, id: &CorrelationId) {
    match ctx.artifacts.refresh_status(id).await {
        Ok(status) => tracing::debug!(
            correlation_id = %id,
            complete = status.complete,
            partial_failure = status.partial_failure,
            "Status refreshed"
        ),
        Err(e) => tracing::warn!(error = %e, correlation_id = %id, "Failed to refresh status"),
    }
}
