//! Label-Detection-Completion-Handler, subscribed to the Rekognition SNS topic

use aws_lambda_events::event::sns::SnsEvent;
use lambda_runtime::Error;
use reelscope_pipeline::handle_label_detection;

#[tokio::main]
async fn main() -> Result<(), Error> {
    reelscope_lambda::serve(|ctx, event: SnsEvent| async move {
        handle_label_detection(&ctx, event).await
    })
    .await
}
