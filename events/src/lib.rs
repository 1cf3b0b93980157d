//! Event system infrastructure for the garage backend.
//!
//! Domain operations emit a [`DomainEvent`] once their change is committed; infrastructure
//! (currently the SSE notification hub) reacts to it through an [`EventHandler`]. The domain
//! layer never learns who is listening.
//!
//! This crate has no dependencies on internal crates (entity, domain, etc.),
//! avoiding circular dependencies.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// A type alias that represents any Entity's internal id field data type.
/// This matches the definition in the entity crate to maintain compatibility.
pub type Id = Uuid;

/// Business-level changes, emitted after the change has been persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainEvent {
    /// An admin moved an appointment to a new moderation status.
    AppointmentStatusChanged {
        appointment_id: Id,
        /// New status in its stored form, e.g. `"accepted"`.
        status: String,
        /// The customer who booked the appointment and should be told about it.
        owner_id: Id,
    },
}

/// Trait for handling domain events.
///
/// Handlers run on the request task that produced the event, so they must not block.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    /// Hands `event` to every registered handler. Handlers report nothing back,
    /// so publishing can never fail the operation that emitted the event.
    pub async fn publish(&self, event: DomainEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
