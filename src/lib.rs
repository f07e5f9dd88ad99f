//! TGL — lottery betting platform backend
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod store;
pub mod betting;
pub mod notify;
pub mod http;
