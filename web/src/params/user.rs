use serde::Deserialize;
use utoipa::ToSchema;

// Missing fields deserialize as empty strings so that the domain layer reports them as
// invalid input rather than axum rejecting the body.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct RegisterParams {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl From<RegisterParams> for domain::user::Registration {
    fn from(params: RegisterParams) -> Self {
        Self {
            name: params.name,
            email: params.email,
            phone: params.phone,
            password: params.password,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoginParams {
    pub email: String,
    pub password: String,
}
