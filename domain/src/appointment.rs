use crate::appointment_status::AppointmentStatus;
use crate::error::Error;
use crate::Id;
use chrono::DateTime;
use entity_api::appointment as AppointmentApi;
use events::{DomainEvent, EventPublisher};
use log::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::DatabaseConnection;

pub use entity_api::appointment::{
    create, delete_by_id, find_all, find_by_id, find_by_user, find_owner_id, update,
};

/// Parses an RFC3339 timestamp as submitted by the booking form.
pub fn parse_datetime(raw: &str) -> Result<DateTimeWithTimeZone, Error> {
    DateTime::parse_from_rfc3339(raw.trim()).map_err(|_| Error::invalid("datetime must be RFC3339"))
}

pub fn parse_status(raw: &str) -> Result<AppointmentStatus, Error> {
    raw.parse::<AppointmentStatus>()
        .map_err(|_| Error::invalid("status must be pending, accepted or rejected"))
}

/// Persists a moderation decision, then tells the appointment's owner about it.
///
/// The result only reflects the write. Notifying the owner happens afterwards and its
/// failures are logged and swallowed.
pub async fn update_status(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    id: Id,
    status: AppointmentStatus,
) -> Result<(), Error> {
    AppointmentApi::update_status(db, id, status).await?;
    info!("Appointment {id} is now {status}");

    notify_owner(db, event_publisher, id, status).await;
    Ok(())
}

async fn notify_owner(
    db: &DatabaseConnection,
    event_publisher: &EventPublisher,
    appointment_id: Id,
    status: AppointmentStatus,
) {
    let owner_id = match find_owner_id(db, appointment_id).await {
        Ok(owner_id) => owner_id,
        Err(e) => {
            debug!("Not notifying about appointment {appointment_id}: owner lookup failed: {e}");
            return;
        }
    };

    event_publisher
        .publish(DomainEvent::AppointmentStatusChanged {
            appointment_id,
            status: status.to_string(),
            owner_id,
        })
        .await;
}


#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod mock_tests {
    use super::*;
    use crate::appointments;
    use crate::error::{DomainErrorKind, EntityErrorKind, InternalErrorKind};
    use async_trait::async_trait;
    use events::EventHandler;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingHandler {
        seen: Mutex<Vec<DomainEvent>>,
    }

    #[async_trait]
    impl EventHandler for RecordingHandler {
        async fn handle(&self, event: &DomainEvent) {
            self.seen.lock().unwrap().push(event.clone());
        }
    }

    fn recording_publisher() -> (EventPublisher, Arc<RecordingHandler>) {
        let handler = Arc::new(RecordingHandler::default());
        let publisher = EventPublisher::new().with_handler(handler.clone());
        (publisher, handler)
    }

    fn appointment(id: Id, user_id: Option<Id>) -> appointments::Model {
        let now = chrono::Utc::now();
        appointments::Model {
            id,
            user_id,
            datetime: now.into(),
            description: Some("Brakes squeal".to_owned()),
            status: AppointmentStatus::Accepted,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn rows(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn status_change_notifies_the_owner() -> Result<(), Error> {
        let appointment_id = Id::new_v4();
        let owner_id = Id::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([rows(1)])
            .append_query_results([[appointment(appointment_id, Some(owner_id))]])
            .into_connection();
        let (publisher, handler) = recording_publisher();

        update_status(&db, &publisher, appointment_id, AppointmentStatus::Accepted).await?;

        assert_eq!(
            *handler.seen.lock().unwrap(),
            vec![DomainEvent::AppointmentStatusChanged {
                appointment_id,
                status: "accepted".to_string(),
                owner_id,
            }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn failed_owner_lookup_still_reports_success() -> Result<(), Error> {
        let appointment_id = Id::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([rows(1)])
            .append_query_results([Vec::<appointments::Model>::new()])
            .into_connection();
        let (publisher, handler) = recording_publisher();

        update_status(&db, &publisher, appointment_id, AppointmentStatus::Rejected).await?;

        assert!(handler.seen.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn ownerless_appointment_is_not_announced() -> Result<(), Error> {
        let appointment_id = Id::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([rows(1)])
            .append_query_results([[appointment(appointment_id, None)]])
            .into_connection();
        let (publisher, handler) = recording_publisher();

        update_status(&db, &publisher, appointment_id, AppointmentStatus::Accepted).await?;

        assert!(handler.seen.lock().unwrap().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn unknown_appointment_is_not_found_and_silent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([rows(0)])
            .into_connection();
        let (publisher, handler) = recording_publisher();

        let err = update_status(&db, &publisher, Id::new_v4(), AppointmentStatus::Accepted)
            .await
            .unwrap_err();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound))
        );
        assert!(handler.seen.lock().unwrap().is_empty());
    }
}
