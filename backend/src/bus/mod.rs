//! Publish/subscribe transport for the shared event channel.
//!
//! All agents talk to each other through one named channel carrying JSON
//! event envelopes. The [`EventBus`] trait abstracts the transport so the same
//! agents run against Redis in production and an in-process broadcast channel
//! in tests and local development.
//!
//! # Delivery
//! Delivery is best-effort and at-most-once. A message published while no
//! subscriber is attached is lost, and a subscriber that falls behind skips
//! what it missed. Nothing here retries.
//!
//! # Backends
//! - `local`: [`LocalBus`], in-process `tokio::sync::broadcast`
//! - `redis`: [`RedisBus`], Redis `PUBLISH`/`SUBSCRIBE` (feature `redis-bus`)
//! - `factory`: [`BusFactory`], picks a backend from the configured URL

pub mod factory;
pub mod local;
#[cfg(feature = "redis-bus")]
pub mod redis;

use async_trait::async_trait;
use futures::stream::BoxStream;
use tracing::{error, info};

use crate::error::CrewResult;
use crate::events::EventEnvelope;

pub use factory::{BusFactory, BusKind};
pub use local::LocalBus;
#[cfg(feature = "redis-bus")]
pub use self::redis::RedisBus;

/// Stream of raw UTF-8 messages received from the channel.
pub type MessageStream = BoxStream<'static, String>;

/// Transport for the shared event channel.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish one envelope on the channel.
    async fn publish(&self, envelope: &EventEnvelope) -> CrewResult<()>;

    /// Attach a new subscriber. Only messages published after this call are
    /// delivered.
    async fn subscribe(&self) -> CrewResult<MessageStream>;

    /// Short human-readable description of the transport, for logs and
    /// health checks.
    fn describe(&self) -> String;
}

/// Publish `envelope`, logging the outcome instead of propagating it.
///
/// Returns whether the publish succeeded. Agents use this so a transport
/// failure never aborts the handling of the message that triggered them.
pub async fn publish_event(bus: &dyn EventBus, envelope: &EventEnvelope) -> bool {
    match bus.publish(envelope).await {
        Ok(()) => {
            info!(
                event_type = %envelope.event_type(),
                hospital_id = %envelope.hospital_id,
                "Published event"
            );
            true
        }
        Err(e) => {
            error!(
                event_type = %envelope.event_type(),
                hospital_id = %envelope.hospital_id,
                error = %e,
                "Failed to publish event"
            );
            false
        }
    }
}
