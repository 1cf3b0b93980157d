use serde::Serialize;
use utoipa::ToSchema;

/// Represents a JSON Web Token (JWT) issued at login.
/// Note: This struct does not have a corresponding entity in the database.
///
/// - `token`: the encoded bearer token.
/// - `sub`: the subject (user id) the token was issued for, so callers don't need to decode it.
#[derive(Serialize, Debug, Clone, ToSchema)]
#[schema(as = jwt::Jwt)] // OpenAPI schema
pub struct Jwt {
    pub token: String,
    pub sub: String,
}
