use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

/// Moderation state of an appointment. Only admins move an appointment out of `Pending`.
#[derive(
    Debug,
    Clone,
    Copy,
    Eq,
    PartialEq,
    EnumIter,
    Deserialize,
    Default,
    Serialize,
    DeriveActiveEnum,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "appointment_status")]
pub enum AppointmentStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseAppointmentStatusError(pub String);

impl std::fmt::Display for ParseAppointmentStatusError {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "invalid appointment status: {:?}", self.0)
    }
}

impl std::error::Error for ParseAppointmentStatusError {}

impl FromStr for AppointmentStatus {
    type Err = ParseAppointmentStatusError;

    /// Accepts any casing and surrounding whitespace, e.g. `" Accepted "`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "accepted" => Ok(AppointmentStatus::Accepted),
            "rejected" => Ok(AppointmentStatus::Rejected),
            _ => Err(ParseAppointmentStatusError(value.to_string())),
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(fmt, "pending"),
            AppointmentStatus::Accepted => write!(fmt, "accepted"),
            AppointmentStatus::Rejected => write!(fmt, "rejected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_trimmed_mixed_case_values() {
        assert_eq!(
            " Accepted ".parse::<AppointmentStatus>(),
            Ok(AppointmentStatus::Accepted)
        );
        assert_eq!(
            "REJECTED".parse::<AppointmentStatus>(),
            Ok(AppointmentStatus::Rejected)
        );
        assert_eq!(
            "pending".parse::<AppointmentStatus>(),
            Ok(AppointmentStatus::Pending)
        );
    }

    #[test]
    fn rejects_unknown_values() {
        assert!("cancelled".parse::<AppointmentStatus>().is_err());
        assert!("".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn display_matches_the_stored_value() {
        assert_eq!(AppointmentStatus::Accepted.to_string(), "accepted");
        assert_eq!(
            AppointmentStatus::Rejected.to_value(),
            "rejected".to_string()
        );
    }
}
