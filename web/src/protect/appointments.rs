use crate::{extractors::authenticated_user::AuthenticatedUser, AppState};
use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
};
use domain::appointment as AppointmentApi;
use domain::error::{DomainErrorKind, EntityErrorKind, InternalErrorKind};
use domain::Id;
use log::*;

/// Checks that the authenticated user booked the appointment specified by `id`.
/// Intended to be given to axum::middleware::from_fn_with_state in the router
pub(crate) async fn owner(
    State(app_state): State<AppState>,
    AuthenticatedUser { id: user_id, .. }: AuthenticatedUser,
    Path(id): Path<Id>,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    match AppointmentApi::find_by_id(app_state.db_conn_ref(), id).await {
        Ok(appointment) if appointment.user_id == Some(user_id) => next.run(request).await,
        Ok(_) => {
            debug!("User {user_id} does not own appointment {id}");
            (StatusCode::FORBIDDEN, "FORBIDDEN").into_response()
        }
        Err(e) => {
            let domain_error: domain::error::Error = e.into();
            match domain_error.error_kind {
                DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound)) => {
                    (StatusCode::NOT_FOUND, "NOT FOUND").into_response()
                }
                _ => {
                    error!("Failed to look up appointment {id}: {domain_error}");
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            }
        }
    }
}
