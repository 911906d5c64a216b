//! # bazaar-db
//!
//! Database layer implementing repository traits with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides PostgreSQL implementations for all repository traits
//! defined in `bazaar-core`. It handles:
//!
//! - Connection pool management and schema migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - Repository implementations, including the transactional flows
//!   (code allocation, publishing, cart, dispatch, reconciliation)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bazaar_db::pool::{create_pool, migrate, DatabaseConfig};
//! use bazaar_db::repositories::PgRoomRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::from_env()).await?;
//!     migrate(&pool).await?;
//!     let rooms = PgRoomRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, create_pool_from_env, migrate, DatabaseConfig, PgPool};
pub use repositories::{
    PgCartRepository, PgCatalogRepository, PgMemberRepository, PgMessageRepository, PgReservationRepository,
    PgRoomRepository, PgSystemRoomRepository, PgUserRepository,
};
