use domain::appointments::Model;
use serde::Serialize;
use utoipa::ToSchema;

/// Appointment as the frontend consumes it. Nullable columns flatten to empty strings.
#[derive(Debug, Serialize, ToSchema)]
pub struct AppointmentResponse {
    pub id: String,
    pub user_id: String,
    pub datetime: String,
    pub description: String,
    pub status: String,
    pub created_at: String,
}

impl From<Model> for AppointmentResponse {
    fn from(appointment: Model) -> Self {
        Self {
            id: appointment.id.to_string(),
            user_id: appointment
                .user_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            datetime: appointment.datetime.to_rfc3339(),
            description: appointment.description.unwrap_or_default(),
            status: appointment.status.to_string(),
            created_at: appointment.created_at.to_rfc3339(),
        }
    }
}

pub(crate) fn from_models(appointments: Vec<Model>) -> Vec<AppointmentResponse> {
    appointments.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use domain::appointment_status::AppointmentStatus;
    use domain::Id;
    use serde_json::json;

    #[test]
    fn nullable_columns_serialize_as_empty_strings() {
        let at = DateTime::parse_from_rfc3339("2025-03-01T09:30:00+00:00").unwrap();
        let id = Id::new_v4();
        let appointment = Model {
            id,
            user_id: None,
            datetime: at,
            description: None,
            status: AppointmentStatus::Pending,
            created_at: at,
            updated_at: at,
        };

        let value = serde_json::to_value(AppointmentResponse::from(appointment)).unwrap();

        assert_eq!(
            value,
            json!({
                "id": id.to_string(),
                "user_id": "",
                "datetime": "2025-03-01T09:30:00+00:00",
                "description": "",
                "status": "pending",
                "created_at": "2025-03-01T09:30:00+00:00",
            })
        );
    }
}
