use async_trait::async_trait;
use aws_sdk_sns::error::DisplayErrorContext;
use aws_sdk_sns::Client as SnsClient;
use tracing::{debug, error};

use crate::error::AwsErrorKind;

#[async_trait]
pub trait NotificationApi: Send + Sync {
    /// Publishes one message to a topic, returning the SNS message id if any.
    async fn publish(
        &self,
        topic_arn: &str,
        subject: &str,
        body: &str,
    ) -> Result<Option<String>, AwsErrorKind>;
}

pub struct SnsNotifier {
    client: SnsClient,
}

impl SnsNotifier {
    pub fn new(client: SnsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationApi for SnsNotifier {
    async fn publish(
        &self,
        topic_arn: &str,
        subject: &str,
        body: &str,
    ) -> Result<Option<String>, AwsErrorKind> {
        debug!(topic_arn = %topic_arn, "publishing to SNS topic");

        let result = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .subject(subject)
            .message(body)
            .send()
            .await
            .map_err(|e| {
                let err_str = DisplayErrorContext(&e).to_string();
                error!(error = %err_str, "SNS publish failed");
                AwsErrorKind::classify(&err_str)
            })?;

        Ok(result.message_id().map(str::to_owned))
    }
}
