//! Route handlers
//!
//! All HTTP request handlers organized by domain.

pub mod cart;
pub mod catalog;
pub mod channels;
pub mod health;
pub mod members;
pub mod messages;
pub mod reservations;
pub mod rooms;
pub mod support;
pub mod users;
