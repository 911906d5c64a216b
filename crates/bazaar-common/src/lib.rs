//! # bazaar-common
//!
//! Shared utilities including configuration, error handling, identity verification, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{Claims, JwtService};
pub use config::{
    AppConfig, AppSettings, CatalogConfig, ConfigError, CorsConfig, DatabaseConfig, Environment,
    GatewayConfig, JwtConfig, RateLimitConfig, RedisConfig, ServerConfig,
};
pub use error::{domain_status, AppError, AppResult, ErrorResponse};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
