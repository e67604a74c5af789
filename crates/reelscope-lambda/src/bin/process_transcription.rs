//! Transcription-Completion-Handler, triggered by the Transcribe job state change rule

use lambda_runtime::Error;
use reelscope_pipeline::events::TranscriptionJobEvent;
use reelscope_pipeline::handle_transcription_event;

#[tokio::main]
async fn main() -> Result<(), Error> {
    reelscope_lambda::serve(|ctx, event: TranscriptionJobEvent| async move {
        handle_transcription_event(&ctx, event).await
    })
    .await
}
