//! Redis pub/sub transport.

use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{info, warn};

use super::{EventBus, MessageStream};
use crate::error::{CrewError, CrewResult, ErrorContext};
use crate::events::EventEnvelope;

/// Event bus backed by a Redis channel.
///
/// Publishing shares one multiplexed connection; every subscriber opens its
/// own pub/sub connection since Redis dedicates a subscribed connection to
/// receiving.
#[derive(Clone)]
pub struct RedisBus {
    client: redis::Client,
    connection: MultiplexedConnection,
    channel: String,
}

impl RedisBus {
    /// Open a client for `url` and establish the publishing connection.
    pub async fn connect(url: &str, channel: impl Into<String>) -> CrewResult<Self> {
        let channel = channel.into();
        let client = redis::Client::open(url).map_err(|e| {
            CrewError::configuration(format!("invalid Redis URL '{}': {}", url, e))
        })?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                CrewError::from(e).with_context(
                    ErrorContext::new("connect")
                        .with_entity("channel")
                        .with_entity_id(&channel),
                )
            })?;
        info!(channel = %channel, "Connected to Redis bus");
        Ok(Self {
            client,
            connection,
            channel,
        })
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }
}

#[async_trait]
impl EventBus for RedisBus {
    async fn publish(&self, envelope: &EventEnvelope) -> CrewResult<()> {
        let message = envelope.to_json()?;
        let mut connection = self.connection.clone();
        let _receivers: i64 = connection
            .publish(&self.channel, message)
            .await
            .map_err(|e| {
                CrewError::from(e).with_context(
                    ErrorContext::new("publish")
                        .with_entity("event")
                        .with_entity_id(envelope.event_type()),
                )
            })?;
        Ok(())
    }

    async fn subscribe(&self) -> CrewResult<MessageStream> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(&self.channel).await?;
        info!(channel = %self.channel, "Subscribed to Redis channel");

        let stream = pubsub
            .into_on_message()
            .filter_map(|msg| async move {
                match msg.get_payload::<String>() {
                    Ok(payload) => Some(payload),
                    Err(e) => {
                        warn!(error = %e, "Dropping non-text Redis message");
                        None
                    }
                }
            });
        Ok(Box::pin(stream))
    }

    fn describe(&self) -> String {
        format!("redis (channel {})", self.channel)
    }
}
