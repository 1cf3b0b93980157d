use crate::error::Result as WebResult;
use crate::params::appointment::UpdateStatusParams;
use crate::response::appointment as AppointmentResponses;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::appointment as AppointmentApi;
use domain::Id;
use log::*;

/// GET every appointment, for moderation
#[utoipa::path(
    get,
    path = "/api/admin/appointments",
    responses(
        (status = 200, description = "All appointments ordered by date", body = [crate::response::appointment::AppointmentResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn index(State(app_state): State<AppState>) -> WebResult<impl IntoResponse> {
    let appointments = AppointmentApi::find_all(app_state.db_conn_ref()).await?;

    Ok(Json(AppointmentResponses::from_models(appointments)))
}

/// PATCH accept or reject an appointment. The owner is notified over their event stream.
#[utoipa::path(
    patch,
    path = "/api/admin/appointments/{id}/status",
    params(
        ("id" = uuid::Uuid, Path, description = "Id of the appointment to moderate"),
    ),
    request_body = crate::params::appointment::UpdateStatusParams,
    responses(
        (status = 204, description = "Status updated"),
        (status = 400, description = "Unknown status"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Appointment not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<UpdateStatusParams>,
) -> WebResult<impl IntoResponse> {
    debug!("PATCH status of Appointment {id} to {:?}", params.status);

    let status = AppointmentApi::parse_status(&params.status)?;
    AppointmentApi::update_status(
        app_state.db_conn_ref(),
        app_state.event_publisher.as_ref(),
        id,
        status,
    )
    .await?;

    Ok(StatusCode::NO_CONTENT)
}
