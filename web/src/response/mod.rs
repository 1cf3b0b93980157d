pub(crate) mod appointment;
pub(crate) mod user;
