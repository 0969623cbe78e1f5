//! Lambda glue for the `start-instances` and `stop-instances` functions.

use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::debug;

use crate::aws::configure_aws;
use crate::config::SchedulerConfig;
use crate::ec2::{ComputeApi, Ec2Compute};
use crate::model::Direction;
use crate::scheduler::Scheduler;
use crate::sns::{NotificationApi, SnsNotifier};

/// Handles one scheduled trigger. The event payload is not inspected.
pub async fn handle_event<C, N>(
    scheduler: &Scheduler<C, N>,
    direction: Direction,
    event: LambdaEvent<Value>,
) -> Result<Value, Error>
where
    C: ComputeApi,
    N: NotificationApi,
{
    debug!(request_id = %event.context.request_id, "invocation received");

    let result = scheduler.run(direction).await?;
    Ok(serde_json::to_value(result)?)
}

pub async fn build_scheduler(
    config: &SchedulerConfig,
) -> Scheduler<Ec2Compute, SnsNotifier> {
    let sdk_config = configure_aws(config).await;

    Scheduler::new(
        Ec2Compute::new(aws_sdk_ec2::Client::new(&sdk_config)),
        SnsNotifier::new(aws_sdk_sns::Client::new(&sdk_config)),
        config.topic_arn.clone(),
        config.tag.clone(),
    )
}

/// Entry point for the Lambda binaries; clients are built once per cold start.
pub async fn run_lambda(direction: Direction) -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_target(false)
        .without_time()
        .init();

    let config = SchedulerConfig::from_env()?;
    debug!(?config, %direction, "loaded configuration");

    let scheduler = build_scheduler(&config).await;
    let scheduler = &scheduler;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_event(scheduler, direction, event).await
    }))
    .await
}
