use crate::message::Event as SseEvent;
use crate::Manager;
use async_trait::async_trait;
use events::{DomainEvent, EventHandler};
use log::*;
use std::sync::Arc;

/// Turns domain events into SSE events addressed to the user the event names.
pub struct SseDomainEventHandler {
    sse_manager: Arc<Manager>,
}

impl SseDomainEventHandler {
    pub fn new(sse_manager: Arc<Manager>) -> Self {
        Self { sse_manager }
    }
}

#[async_trait]
impl EventHandler for SseDomainEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        match event {
            DomainEvent::AppointmentStatusChanged {
                appointment_id,
                status,
                owner_id,
            } => {
                debug!(
                    "Handling AppointmentStatusChanged event for appointment {}",
                    appointment_id
                );

                let sse_event = SseEvent::appointment_status(appointment_id.to_string(), status);
                self.sse_manager
                    .send_to_user(&owner_id.to_string(), &sse_event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use events::{EventPublisher, Id};

    #[tokio::test]
    async fn status_change_reaches_the_owner_only() {
        let manager = Arc::new(Manager::new());
        let owner_id = Id::new_v4();
        let bystander_id = Id::new_v4();
        let appointment_id = Id::new_v4();
        let (mut owner_rx, _owner_token) = manager.subscribe(owner_id.to_string());
        let (mut other_rx, _other_token) = manager.subscribe(bystander_id.to_string());

        let publisher = EventPublisher::new()
            .with_handler(Arc::new(SseDomainEventHandler::new(Arc::clone(&manager))));
        publisher
            .publish(DomainEvent::AppointmentStatusChanged {
                appointment_id,
                status: "accepted".to_string(),
                owner_id,
            })
            .await;

        let payload = owner_rx.try_recv().unwrap();
        assert_eq!(
            &*payload,
            format!(
                r#"{{"type":"appointment_status","appointment_id":"{appointment_id}","status":"accepted","message":"Your appointment status was updated"}}"#
            )
        );
        assert!(other_rx.try_recv().is_err());
    }
}
