pub(crate) mod appointment;
pub(crate) mod sse;
pub(crate) mod user;
