//! Business operations of the garage backend.
//!
//! Re-exports the entity models from `entity_api` so that consumers of the `domain` crate do
//! not need to depend on `entity_api` directly.
pub use entity_api::{appointment_status, appointments, users, Id};

// The event bus types are part of this layer's public API
pub use events;

pub mod appointment;
pub mod error;
pub mod jwt;
pub mod user;
