//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, CatalogConfig, ConfigError, CorsConfig, DatabaseConfig, Environment,
    GatewayConfig, JwtConfig, RateLimitConfig, RedisConfig, ServerConfig,
};
