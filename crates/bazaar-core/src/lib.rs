//! # bazaar-core
//!
//! Domain layer containing entities, the access control engine, repository
//! traits, and room events. This crate has zero dependencies on
//! infrastructure (database, web framework, etc.).

pub mod access;
pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use access::{can_post, can_read, decide, AccessDecision, RoomAccess};
pub use entities::{
    CartItem, CartStatus, CatalogItem, ChannelPatch, Membership, Message, Reservation, Room, RoomConfig,
    RoomKind, SystemKey, User, Visibility,
};
pub use error::DomainError;
pub use events::RoomEvent;
pub use traits::RepoResult;
pub use value_objects::{Identity, MemberRole, Role};
