//! Business logic services
//!
//! This module contains all service layer implementations that handle
//! authorization gates, orchestration of domain operations, and post-commit
//! event publication.

pub mod access;
pub mod blacklist;
pub mod cart;
pub mod catalog;
pub mod context;
pub mod error;
pub mod member;
pub mod message;
pub mod reservation;
pub mod room;
pub mod support;
pub mod system_room;
pub mod user;

// Re-export all services for convenience
pub use access::{require_staff, require_worker, AccessService, RoomGate};
pub use blacklist::BlacklistService;
pub use cart::CartService;
pub use catalog::CatalogService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use member::MemberService;
pub use message::MessageService;
pub use reservation::ReservationService;
pub use room::RoomService;
pub use support::SupportService;
pub use system_room::SystemRoomService;
pub use user::UserService;
