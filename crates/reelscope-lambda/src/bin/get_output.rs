//! Result-Aggregator behind `GET /output/{name}`

use lambda_runtime::Error;
use reelscope_pipeline::events::OutputRequest;
use reelscope_pipeline::handle_get_output;

#[tokio::main]
async fn main() -> Result<(), Error> {
    reelscope_lambda::serve(|ctx, request: OutputRequest| async move {
        handle_get_output(&ctx, request).await
    })
    .await
}
