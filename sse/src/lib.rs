//! Real-time notification hub pushed to browsers over Server-Sent Events (SSE).
//!
//! # Architecture
//!
//! - **Multiple connections per user**: every open tab or device gets its own bounded
//!   queue, and an event for a user is copied to all of them.
//! - **Per-user registry**: a `DashMap` keyed by user id. A key exists only while that
//!   user has at least one open connection.
//! - **Non-blocking fan-out**: publishing never waits on a slow reader. A full queue
//!   simply misses the event.
//! - **Ephemeral messages**: offline users miss events and see fresh data on next load.
//!
//! # Message Flow
//!
//! 1. Frontend opens `/api/events?token=...`
//! 2. The web layer verifies the token and calls [`Manager::open_session`]
//! 3. The session writes `: connected`, then heartbeats and events as they arrive
//! 4. An admin changes an appointment status; the domain layer publishes
//!    `DomainEvent::AppointmentStatusChanged` and [`SseDomainEventHandler`] forwards it
//!    to the owner through [`Manager::send_to_user`]
//! 5. When the client disconnects the session is dropped and the connection unregistered
//!
//! # Example: Sending an event
//!
//! ```rust,ignore
//! use sse::message::Event as SseEvent;
//!
//! app_state
//!     .sse_manager
//!     .send_to_user(&owner_id.to_string(), &SseEvent::appointment_status(id, "accepted"));
//! ```
//!
//! # Modules
//!
//! - `connection`: ConnectionRegistry, ConnectionId and the Unsubscribe token
//! - `manager`: application-facing publisher
//! - `message`: event payload definitions
//! - `session`: per-client frame stream with heartbeats

pub mod connection;
pub mod domain_event_handler;
pub mod manager;
pub mod message;
pub mod session;

pub use domain_event_handler::SseDomainEventHandler;
pub use manager::Manager;
pub use session::{Frame, Session};
