use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tracing::info;

mod processor;

use processor::ExpiryProcessor;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    info!("Game expiry scheduler starting");

    let config = aws_config::load_from_env().await;
    let processor = ExpiryProcessor::from_env(&config)?;

    // The schedule rule payload carries nothing we need.
    run(service_fn(move |_event: LambdaEvent<serde_json::Value>| {
        let processor = processor.clone();
        async move { processor.process_tick().await }
    }))
    .await
}
