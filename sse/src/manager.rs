use crate::connection::{ConnectionRegistry, Payload, Unsubscribe, UserId};
use crate::message::{Event, EventType};
use crate::session::Session;
use log::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Receiver;

const DEFAULT_CHANNEL_CAPACITY: usize = 8;
const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(25);
const MIN_HEARTBEAT: Duration = Duration::from_secs(1);

/// Application-wide entry point to the notification hub.
///
/// Request handlers open sessions through it and the domain layer pushes events to users
/// through it. Both are non-blocking and safe to call from any task.
pub struct Manager {
    registry: Arc<ConnectionRegistry>,
    heartbeat: Duration,
}

impl Manager {
    pub fn new() -> Self {
        Self::with_settings(DEFAULT_CHANNEL_CAPACITY, DEFAULT_HEARTBEAT)
    }

    /// Both settings are clamped: capacity to at least one, heartbeat to at least a second.
    pub fn with_settings(channel_capacity: usize, heartbeat: Duration) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new(channel_capacity)),
            heartbeat: heartbeat.max(MIN_HEARTBEAT),
        }
    }

    /// Register a new connection and return its queue plus release token
    pub fn subscribe(&self, user_id: UserId) -> (Receiver<Payload>, Unsubscribe) {
        self.registry.subscribe(user_id)
    }

    /// Register a new connection and wrap it in a streaming session
    pub fn open_session(&self, user_id: UserId) -> Session {
        let (receiver, unsubscribe) = self.registry.subscribe(user_id);
        info!(
            "Registered new SSE connection {} for user {}",
            unsubscribe.connection_id().as_str(),
            unsubscribe.user_id()
        );
        Session::new(receiver, unsubscribe, self.heartbeat)
    }

    /// Fan an already-serialized payload out to every connection of `user_id`.
    pub fn publish(&self, user_id: &str, payload: Payload) -> usize {
        self.registry.publish(user_id, &payload)
    }

    /// Serialize `event` once and fan it out to every connection of `user_id`.
    pub fn send_to_user(&self, user_id: &str, event: &Event) -> usize {
        let payload: Payload = match serde_json::to_string(event) {
            Ok(json) => Arc::from(json),
            Err(e) => {
                error!("Failed to serialize SSE event: {e}");
                return 0;
            }
        };

        let delivered = self.publish(user_id, payload);
        debug!(
            "Sent {} event to {delivered} connection(s) of user {user_id}",
            event.event_type()
        );
        delivered
    }

    pub fn subscriber_count(&self, user_id: &str) -> usize {
        self.registry.subscriber_count(user_id)
    }

    pub fn user_count(&self) -> usize {
        self.registry.user_count()
    }

    /// Ends every open stream and refuses new ones.
    pub fn shutdown(&self) {
        let closed = self.registry.close_all();
        info!("SSE hub shut down, closed {closed} connection(s)");
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}
