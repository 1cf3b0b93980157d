// Testing Tools Library
//
// This crate provides testing utilities and tools for the garage backend.
// Currently includes:
// - sse-test-client: end-to-end notification testing tool against a running server

pub mod api_client;
pub mod auth;
pub mod output;
pub mod scenarios;
pub mod sse_client;
