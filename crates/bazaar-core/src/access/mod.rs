//! Access Control Engine
//!
//! Pure read/post decisions over a room, the caller's membership, and the
//! caller's global role. Nothing here touches storage, so the decision can be
//! made before any transaction is opened.

mod engine;

pub use engine::{can_post, can_read, decide, AccessDecision, RoomAccess};
