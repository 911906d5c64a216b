//! Entity to model mappers
//!
//! This module provides conversions between domain entities (bazaar-core) and database models.
//! - `From<Model> for Entity`: Convert database rows to domain objects
//! - `*Insert` structs: Prepare entity data for database operations

mod cart;
mod catalog;
mod member;
mod message;
mod room;
mod user;

pub use catalog::queue_entries;
pub use room::RoomInsert;
