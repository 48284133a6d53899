use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_lambda_events::alb::AlbTargetGroupRequest;
use handler::{TimestampHandler, handler_fn};
use lambda_runtime::{LambdaEvent, service_fn, tracing};
use model::{Error, HandlerConfig, SystemClock};
use state_dynamodb::DynamoDbRecordStore;
use std::sync::Arc;

async fn dynamodb_client(config: &HandlerConfig) -> aws_sdk_dynamodb::Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()));

    if let Some(endpoint_url) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }

    let sdk_config: SdkConfig = loader.load().await;

    aws_sdk_dynamodb::Client::new(&sdk_config)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    let config: HandlerConfig = HandlerConfig::from_env()?;

    tracing::info!(
        table = config.table_name.as_str(),
        region = config.region.as_str(),
        "Starting timestamp writer"
    );

    let store: DynamoDbRecordStore =
        DynamoDbRecordStore::new(dynamodb_client(&config).await, config.table_name.clone())
            .with_consistent_read(config.consistent_read);

    let handler: TimestampHandler = TimestampHandler::new(Arc::new(store), Arc::new(SystemClock));

    lambda_runtime::run(service_fn(
        |event: LambdaEvent<AlbTargetGroupRequest>| handler_fn(&handler, event),
    ))
    .await
}
