//! Sentiment-Handler, triggered by `transcribe.json` landing in the output bucket

use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::Error;
use reelscope_pipeline::handle_transcript_created;

#[tokio::main]
async fn main() -> Result<(), Error> {
    reelscope_lambda::serve(|ctx, event: S3Event| async move {
        handle_transcript_created(&ctx, event).await
    })
    .await
}
