//! # bazaar-service
//!
//! Application layer containing authorization gates, orchestration, and DTOs.
//! Every mutating operation publishes its room events only after the
//! repository call that committed it has returned.

pub mod dto;
pub mod services;

pub use services::{
    AccessService, BlacklistService, CartService, CatalogService, MemberService, MessageService,
    ReservationService, RoomService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
    SupportService, SystemRoomService, UserService,
};
