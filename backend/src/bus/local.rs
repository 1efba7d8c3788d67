//! In-process event bus for tests and local development.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::warn;

use super::{EventBus, MessageStream};
use crate::error::CrewResult;
use crate::events::EventEnvelope;

/// Number of published messages kept for inspection.
const HISTORY_LIMIT: usize = 1024;

/// Broadcast-channel bus.
///
/// Every subscriber receives each message published after it subscribed.
/// The bus also keeps the most recent published messages so tests can assert
/// on what an agent emitted without racing a subscriber.
#[derive(Clone)]
pub struct LocalBus {
    sender: broadcast::Sender<String>,
    history: Arc<RwLock<VecDeque<String>>>,
}

impl LocalBus {
    /// Create a bus whose subscribers can lag at most `capacity` messages.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            history: Arc::new(RwLock::new(VecDeque::new())),
        }
    }

    /// Publish a raw message, bypassing envelope encoding.
    ///
    /// Used to inject external or malformed traffic.
    pub fn publish_raw(&self, message: impl Into<String>) {
        let message = message.into();
        {
            let mut history = self.history.write();
            if history.len() == HISTORY_LIMIT {
                history.pop_front();
            }
            history.push_back(message.clone());
        }
        // No subscriber attached is not an error: the message is simply lost.
        let _ = self.sender.send(message);
    }

    /// Messages published so far, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.read().iter().cloned().collect()
    }

    /// Drop the recorded history.
    pub fn clear_history(&self) {
        self.history.write().clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EventBus for LocalBus {
    async fn publish(&self, envelope: &EventEnvelope) -> CrewResult<()> {
        let message = envelope.to_json()?;
        self.publish_raw(message);
        Ok(())
    }

    async fn subscribe(&self) -> CrewResult<MessageStream> {
        let mut receiver = self.sender.subscribe();
        let stream = async_stream::stream! {
            loop {
                match receiver.recv().await {
                    Ok(message) => yield message,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Local bus subscriber lagged; messages dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        };
        Ok(Box::pin(stream))
    }

    fn describe(&self) -> String {
        "memory://".to_string()
    }
}
