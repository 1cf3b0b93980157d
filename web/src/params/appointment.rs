use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateParams {
    /// RFC3339 timestamp, e.g. `2025-03-01T09:30:00Z`
    pub datetime: String,
    pub description: Option<String>,
}

/// Absent fields are left untouched. An empty description clears it.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateParams {
    pub datetime: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct UpdateStatusParams {
    /// One of `pending`, `accepted` or `rejected`
    pub status: String,
}
