use serde::Deserialize;
use utoipa::IntoParams;

/// Browsers' `EventSource` cannot send headers, so the bearer token travels in the query.
#[derive(Debug, Deserialize, IntoParams)]
pub struct StreamParams {
    pub token: Option<String>,
}
