use serde::Serialize;

/// Text carried by every appointment status notification.
pub const STATUS_UPDATED_MESSAGE: &str = "Your appointment status was updated";

/// Trait for getting the SSE event type name
pub trait EventType {
    fn event_type(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    AppointmentStatus,
}

/// JSON object written as the `data:` line of an event stream frame.
///
/// Fields serialize in declaration order and absent optional fields are omitted, so an
/// appointment status event always reads
/// `{"type":"appointment_status","appointment_id":..,"status":..,"message":..}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Event {
    pub fn appointment_status(appointment_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            kind: EventKind::AppointmentStatus,
            appointment_id: Some(appointment_id.into()),
            status: Some(status.into()),
            message: Some(STATUS_UPDATED_MESSAGE.to_string()),
        }
    }
}

impl EventType for Event {
    fn event_type(&self) -> &'static str {
        match self.kind {
            EventKind::AppointmentStatus => "appointment_status",
        }
    }
}
