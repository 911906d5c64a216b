//! Integration test utilities for the bazaar server
//!
//! This crate provides helpers for running end-to-end tests against
//! the REST API and WebSocket gateway.

pub mod fixtures;
pub mod gateway;
pub mod helpers;

pub use fixtures::*;
pub use gateway::*;
pub use helpers::*;
