use crate::protect::{authorize, Predicate, UserIsAdmin};
use crate::{extractors::authenticated_user::AuthenticatedUser, AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};

/// Checks that the authenticated user holds the admin flag in their token.
/// Intended to be given to axum::middleware::from_fn_with_state in the router
pub(crate) async fn require_admin(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    request: Request,
    next: Next,
) -> impl IntoResponse {
    let checks = vec![Predicate::new(UserIsAdmin, vec![])];
    authorize(&app_state, user, request, next, checks).await
}
