//! Ingest/URL-Issuer: presigned upload URL for a new media object

use lambda_runtime::Error;
use reelscope_pipeline::events::UploadUrlRequest;
use reelscope_pipeline::handle_upload_url;

#[tokio::main]
async fn main() -> Result<(), Error> {
    reelscope_lambda::serve(|ctx, request: UploadUrlRequest| async move {
        handle_upload_url(&ctx, request).await
    })
    .await
}
