//! Lambda entry points for the reelscope pipeline
//!
//! Each binary in `src/bin` wires one pipeline handler to the Lambda runtime
//! through [`serve`]. Cold start loads configuration, builds the AWS clients
//! once and shares them across invocations.

pub mod bootstrap;
pub mod telemetry;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use reelscope_pipeline::{HandlerResponse, PipelineContext};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;

/// Initialize logging and the pipeline, then serve `handler` until shutdown
///
/// Handler failures are reported in the returned [`HandlerResponse`], so the
/// invocation itself only errors when the runtime does.
pub async fn serve<E, F, Fut>(handler: F) -> Result<(), Error>
where
    E: DeserializeOwned + Send + 'static,
    F: Fn(Arc<PipelineContext>, E) -> Fut,
    Fut: Future<Output = HandlerResponse>,
{
    telemetry::init();
    let ctx = Arc::new(bootstrap::build_context().await?);
    tracing::info!(
        function = %std::env::var("AWS_LAMBDA_FUNCTION_NAME").unwrap_or_default(),
        "Pipeline initialized"
    );

    lambda_runtime::run(service_fn(move |event: LambdaEvent<E>| {
        tracing::debug!(request_id = %event.context.request_id, "Invocation received");
        let response = handler(ctx.clone(), event.payload);
        async move { Ok::<HandlerResponse, Error>(response.await) }
    }))
    .await
}
