//! Bus factory for dependency injection.
//!
//! Picks a transport from the configured bus URL so the binary and the tests
//! build agents the same way.

use std::str::FromStr;
use std::sync::Arc;

use super::{EventBus, LocalBus};
use crate::config::BusSettings;
use crate::error::{CrewError, CrewResult};

/// Transport selected by a bus URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusKind {
    /// In-process broadcast channel
    Local,
    /// Redis pub/sub
    Redis,
}

impl FromStr for BusKind {
    type Err = String;

    /// Parse the transport from the URL scheme (`memory://`, `redis://`, `rediss://`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let scheme = s
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .unwrap_or(s)
            .to_lowercase();
        match scheme.as_str() {
            "memory" | "local" => Ok(Self::Local),
            "redis" | "rediss" => Ok(Self::Redis),
            _ => Err(format!("Unknown bus URL scheme: {}", s)),
        }
    }
}

/// Factory for event bus instances.
pub struct BusFactory;

impl BusFactory {
    /// Create the bus described by `settings`.
    ///
    /// # Errors
    /// `Configuration` when the scheme is unknown or the Redis transport is
    /// not compiled in; `Transport` when Redis is unreachable.
    pub async fn from_settings(settings: &BusSettings) -> CrewResult<Arc<dyn EventBus>> {
        let kind = BusKind::from_str(&settings.url).map_err(CrewError::configuration)?;
        match kind {
            BusKind::Local => Ok(Arc::new(Self::create_local(settings.local_capacity))),
            BusKind::Redis => {
                #[cfg(feature = "redis-bus")]
                {
                    let bus = super::RedisBus::connect(&settings.url, &settings.channel).await?;
                    Ok(Arc::new(bus) as Arc<dyn EventBus>)
                }
                #[cfg(not(feature = "redis-bus"))]
                {
                    Err(CrewError::configuration(
                        "Redis bus feature not enabled; use memory:// instead",
                    ))
                }
            }
        }
    }

    /// Create an in-process bus.
    pub fn create_local(capacity: usize) -> LocalBus {
        LocalBus::new(capacity)
    }
}
