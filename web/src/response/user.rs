use domain::users::Model;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisteredUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<Model> for RegisteredUser {
    fn from(user: Model) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name,
            email: user.email,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub is_admin: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: LoginUser,
}

impl LoginResponse {
    pub fn new(token: String, user: Model) -> Self {
        Self {
            token,
            user: LoginUser {
                name: user.name,
                email: user.email,
                phone: user.phone,
                is_admin: user.is_admin,
            },
        }
    }
}

/// Profile of the caller. `admin` reflects the claim in the presented token.
#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub id: String,
    pub admin: bool,
    pub name: String,
    pub email: String,
    pub phone: String,
}
