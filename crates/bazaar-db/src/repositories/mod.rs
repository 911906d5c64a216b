//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in bazaar-core.
//! Flows that must be atomic run inside a single transaction; any error drops
//! the transaction uncommitted, which rolls it back.

mod cart;
mod catalog;
mod error;
mod member;
mod message;
mod reservation;
mod room;
mod system_room;
mod user;

pub use cart::PgCartRepository;
pub use catalog::PgCatalogRepository;
pub use member::PgMemberRepository;
pub use message::PgMessageRepository;
pub use reservation::PgReservationRepository;
pub use room::PgRoomRepository;
pub use system_room::PgSystemRoomRepository;
pub use user::PgUserRepository;
