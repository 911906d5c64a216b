//! Connection management
//!
//! Live WebSocket connections and the registry that owns their lifecycle.

mod connection;
mod registry;

pub use connection::{Connection, ConnectionState};
pub use registry::SessionRegistry;
