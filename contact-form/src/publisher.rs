use crate::message::OutboundMessage;
use async_once_cell::OnceCell;
use async_trait::async_trait;
use aws_config::{retry::RetryConfig, BehaviorVersion};
use aws_sdk_sns::error::DisplayErrorContext;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error publishing message to {destination}: {description}")]
pub struct PublishError {
    pub destination: String,
    pub description: String,
}

#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, message: &OutboundMessage) -> Result<(), PublishError>;
}

/// Publishes to an SNS topic. The client is created on first use.
pub struct SnsPublisher {
    topic_arn: String,
    client: OnceCell<aws_sdk_sns::Client>,
}

impl SnsPublisher {
    pub fn new(topic_arn: impl Into<String>) -> Self {
        Self {
            topic_arn: topic_arn.into(),
            client: Default::default(),
        }
    }

    async fn initialise_client() -> aws_sdk_sns::Client {
        // A failed publish surfaces to the submitter instead of being retried.
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).retry_config(RetryConfig::disabled());
        if let Ok(url) = std::env::var("AWS_ENDPOINT_URL") {
            info!("initialise_client: Using endpoint {url}");
            loader = loader.endpoint_url(url);
        }
        let config = loader.load().await;
        aws_sdk_sns::Client::new(&config)
    }
}

#[async_trait]
impl Publisher for SnsPublisher {
    async fn publish(&self, message: &OutboundMessage) -> Result<(), PublishError> {
        let client = self.client.get_or_init(Self::initialise_client()).await;
        let output = client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(&message.subject)
            .message(&message.body)
            .send()
            .await
            .map_err(|error| PublishError {
                destination: self.topic_arn.clone(),
                description: DisplayErrorContext(&error).to_string(),
            })?;
        info!(
            message_id = output.message_id().unwrap_or_default(),
            "Published message to {}", self.topic_arn
        );
        Ok(())
    }
}
