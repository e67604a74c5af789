//! Job-Launcher, triggered by object creation in the input bucket

use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::Error;
use reelscope_pipeline::handle_upload_created;

#[tokio::main]
async fn main() -> Result<(), Error> {
    reelscope_lambda::serve(|ctx, event: S3Event| async move {
        handle_upload_created(&ctx, event).await
    })
    .await
}
