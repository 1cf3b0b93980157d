use crate::error::Result as WebResult;
use crate::extractors::authenticated_user::AuthenticatedUser;
use crate::params::appointment::{CreateParams, UpdateParams};
use crate::response::appointment::{self as AppointmentResponses, AppointmentResponse};
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use domain::appointment as AppointmentApi;
use domain::Id;
use log::*;

/// GET all appointments booked by the authenticated user
#[utoipa::path(
    get,
    path = "/api/appointments",
    responses(
        (status = 200, description = "Appointments ordered by date", body = [crate::response::appointment::AppointmentResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn index(
    State(app_state): State<AppState>,
    AuthenticatedUser { id: user_id, .. }: AuthenticatedUser,
) -> WebResult<impl IntoResponse> {
    let appointments = AppointmentApi::find_by_user(app_state.db_conn_ref(), user_id).await?;

    Ok(Json(AppointmentResponses::from_models(appointments)))
}

/// POST book a new appointment
#[utoipa::path(
    post,
    path = "/api/appointments",
    request_body = crate::params::appointment::CreateParams,
    responses(
        (status = 200, description = "Successfully booked a new appointment", body = crate::response::appointment::AppointmentResponse),
        (status = 400, description = "Invalid datetime"),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Service temporarily unavailable")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    AuthenticatedUser { id: user_id, .. }: AuthenticatedUser,
    Json(params): Json<CreateParams>,
) -> WebResult<impl IntoResponse> {
    debug!("POST Create a New Appointment from: {params:?}");

    let datetime = AppointmentApi::parse_datetime(&params.datetime)?;
    let appointment =
        AppointmentApi::create(app_state.db_conn_ref(), user_id, datetime, params.description)
            .await?;

    debug!("New Appointment: {appointment:?}");

    Ok(Json(AppointmentResponse::from(appointment)))
}

/// PUT or PATCH edit an appointment of the authenticated user. The status is never changed here.
#[utoipa::path(
    put,
    path = "/api/appointments/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Id of the appointment to update"),
    ),
    request_body = crate::params::appointment::UpdateParams,
    responses(
        (status = 200, description = "Successfully updated the appointment", body = crate::response::appointment::AppointmentResponse),
        (status = 400, description = "Invalid datetime"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Appointment belongs to someone else"),
        (status = 404, description = "Appointment not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
    Json(params): Json<UpdateParams>,
) -> WebResult<impl IntoResponse> {
    debug!("Update Appointment with id: {id}");

    let datetime = params
        .datetime
        .as_deref()
        .map(AppointmentApi::parse_datetime)
        .transpose()?;
    let appointment =
        AppointmentApi::update(app_state.db_conn_ref(), id, datetime, params.description).await?;

    Ok(Json(AppointmentResponse::from(appointment)))
}

/// DELETE an appointment of the authenticated user
#[utoipa::path(
    delete,
    path = "/api/appointments/{id}",
    params(
        ("id" = uuid::Uuid, Path, description = "Id of the appointment to delete"),
    ),
    responses(
        (status = 204, description = "Successfully deleted the appointment"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Appointment belongs to someone else"),
        (status = 404, description = "Appointment not found")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete(
    State(app_state): State<AppState>,
    Path(id): Path<Id>,
) -> WebResult<impl IntoResponse> {
    debug!("DELETE Appointment by id: {id}");

    AppointmentApi::delete_by_id(app_state.db_conn_ref(), id).await?;

    Ok(StatusCode::NO_CONTENT)
}
