use crate::extractors::RejectionType;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use domain::jwt::Identity;
use domain::Id;
use log::*;

/// The caller of a route behind `require_auth`.
pub(crate) struct AuthenticatedUser {
    pub id: Id,
    pub is_admin: bool,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = RejectionType;

    // Reads the identity `require_auth` verified and stored in the request extensions.
    // Tokens are only issued for user ids, so a subject that isn't one is rejected.
    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(identity) = parts.extensions.get::<Identity>() else {
            return Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()));
        };

        match identity.subject.parse::<Id>() {
            Ok(id) => Ok(AuthenticatedUser {
                id,
                is_admin: identity.is_admin,
            }),
            Err(_) => {
                warn!("Token subject is not a user id: {}", identity.subject);
                Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string()))
            }
        }
    }
}
