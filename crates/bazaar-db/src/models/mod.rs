//! Database models - SQLx-compatible structs for PostgreSQL tables

mod cart;
mod catalog;
mod member;
mod message;
mod room;
mod user;

pub use cart::{CartItemModel, CartLineModel, ReservationModel, ReservedOrderModel};
pub use catalog::{CatalogItemModel, QueueEntryModel};
pub use member::MemberModel;
pub use message::MessageModel;
pub use room::{ChannelStatsModel, RoomListingModel, RoomModel};
pub use user::UserModel;
