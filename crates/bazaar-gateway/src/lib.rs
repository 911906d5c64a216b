//! # bazaar-gateway
//!
//! WebSocket gateway for realtime room events. Each identity holds at most
//! one live session, and each session watches at most one room.

pub mod broadcast;
pub mod connection;
pub mod handlers;
pub mod protocol;
pub mod server;

pub use server::{create_app, create_gateway_state, run, GatewayState};
