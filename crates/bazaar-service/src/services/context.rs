//! Service context - dependency container for services
//!
//! Holds all repositories, the fanout publisher, and the token verifier.

use std::sync::Arc;

use bazaar_cache::{Publisher, RedisPool};
use bazaar_common::auth::JwtService;
use bazaar_core::entities::DEFAULT_CODE_REUSE_DAYS;
use bazaar_core::traits::{
    CartRepository, CatalogRepository, MemberRepository, MessageRepository, ReservationRepository,
    RoomRepository, SystemRoomRepository, UserRepository,
};
use bazaar_core::RoomEvent;
use bazaar_db::PgPool;
use tracing::warn;

use super::error::{ServiceError, ServiceResult};

/// Service context containing all dependencies
///
/// This is the main dependency container that gets passed to all services.
/// It provides access to:
/// - Database repositories
/// - Redis pub/sub for room events
/// - JWT service for identity verification
#[derive(Clone)]
pub struct ServiceContext {
    // Database pool
    pool: PgPool,

    // Redis pool
    redis_pool: RedisPool,

    // Repositories
    user_repo: Arc<dyn UserRepository>,
    room_repo: Arc<dyn RoomRepository>,
    member_repo: Arc<dyn MemberRepository>,
    message_repo: Arc<dyn MessageRepository>,
    catalog_repo: Arc<dyn CatalogRepository>,
    cart_repo: Arc<dyn CartRepository>,
    reservation_repo: Arc<dyn ReservationRepository>,
    system_room_repo: Arc<dyn SystemRoomRepository>,

    // Pub/Sub
    publisher: Publisher,

    // Services
    jwt_service: Arc<JwtService>,

    code_reuse_days: i64,
}

impl ServiceContext {
    /// Create a new service context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pool: PgPool,
        redis_pool: RedisPool,
        user_repo: Arc<dyn UserRepository>,
        room_repo: Arc<dyn RoomRepository>,
        member_repo: Arc<dyn MemberRepository>,
        message_repo: Arc<dyn MessageRepository>,
        catalog_repo: Arc<dyn CatalogRepository>,
        cart_repo: Arc<dyn CartRepository>,
        reservation_repo: Arc<dyn ReservationRepository>,
        system_room_repo: Arc<dyn SystemRoomRepository>,
        jwt_service: Arc<JwtService>,
        code_reuse_days: i64,
    ) -> Self {
        let publisher = Publisher::new(redis_pool.clone());

        Self {
            pool,
            redis_pool,
            user_repo,
            room_repo,
            member_repo,
            message_repo,
            catalog_repo,
            cart_repo,
            reservation_repo,
            system_room_repo,
            publisher,
            jwt_service,
            code_reuse_days,
        }
    }

    // === Pools ===

    /// Get the PostgreSQL connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Get the Redis connection pool
    pub fn redis_pool(&self) -> &RedisPool {
        &self.redis_pool
    }

    // === Repositories ===

    pub fn user_repo(&self) -> &dyn UserRepository {
        self.user_repo.as_ref()
    }

    pub fn room_repo(&self) -> &dyn RoomRepository {
        self.room_repo.as_ref()
    }

    pub fn member_repo(&self) -> &dyn MemberRepository {
        self.member_repo.as_ref()
    }

    pub fn message_repo(&self) -> &dyn MessageRepository {
        self.message_repo.as_ref()
    }

    pub fn catalog_repo(&self) -> &dyn CatalogRepository {
        self.catalog_repo.as_ref()
    }

    pub fn cart_repo(&self) -> &dyn CartRepository {
        self.cart_repo.as_ref()
    }

    pub fn reservation_repo(&self) -> &dyn ReservationRepository {
        self.reservation_repo.as_ref()
    }

    pub fn system_room_repo(&self) -> &dyn SystemRoomRepository {
        self.system_room_repo.as_ref()
    }

    // === Pub/Sub ===

    /// Get the Redis pub/sub publisher
    pub fn publisher(&self) -> &Publisher {
        &self.publisher
    }

    /// Fan out events after the originating transaction committed
    ///
    /// Failures are logged and swallowed: the write already succeeded and
    /// clients catch up on their next fetch.
    pub async fn publish(&self, events: &[RoomEvent]) {
        if events.is_empty() {
            return;
        }
        if let Err(e) = self.publisher.publish_room_events(events).await {
            warn!(error = %e, count = events.len(), "Failed to publish room events");
        }
    }

    // === Services ===

    /// Get the JWT service
    pub fn jwt_service(&self) -> &JwtService {
        self.jwt_service.as_ref()
    }

    /// Days an archived item keeps its product code
    pub fn code_reuse_days(&self) -> i64 {
        self.code_reuse_days
    }
}

impl std::fmt::Debug for ServiceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("pool", &"PgPool")
            .field("redis_pool", &"RedisPool")
            .field("repositories", &"...")
            .field("code_reuse_days", &self.code_reuse_days)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder {
    pool: Option<PgPool>,
    redis_pool: Option<RedisPool>,
    user_repo: Option<Arc<dyn UserRepository>>,
    room_repo: Option<Arc<dyn RoomRepository>>,
    member_repo: Option<Arc<dyn MemberRepository>>,
    message_repo: Option<Arc<dyn MessageRepository>>,
    catalog_repo: Option<Arc<dyn CatalogRepository>>,
    cart_repo: Option<Arc<dyn CartRepository>>,
    reservation_repo: Option<Arc<dyn ReservationRepository>>,
    system_room_repo: Option<Arc<dyn SystemRoomRepository>>,
    jwt_service: Option<Arc<JwtService>>,
    code_reuse_days: i64,
}

impl ServiceContextBuilder {
    pub fn new() -> Self {
        Self {
            pool: None,
            redis_pool: None,
            user_repo: None,
            room_repo: None,
            member_repo: None,
            message_repo: None,
            catalog_repo: None,
            cart_repo: None,
            reservation_repo: None,
            system_room_repo: None,
            jwt_service: None,
            code_reuse_days: DEFAULT_CODE_REUSE_DAYS,
        }
    }

    /// Wire every Postgres repository from one pool
    pub fn postgres(self, pool: PgPool) -> Self {
        use bazaar_db::{
            PgCartRepository, PgCatalogRepository, PgMemberRepository, PgMessageRepository,
            PgReservationRepository, PgRoomRepository, PgSystemRoomRepository, PgUserRepository,
        };

        self.user_repo(Arc::new(PgUserRepository::new(pool.clone())))
            .room_repo(Arc::new(PgRoomRepository::new(pool.clone())))
            .member_repo(Arc::new(PgMemberRepository::new(pool.clone())))
            .message_repo(Arc::new(PgMessageRepository::new(pool.clone())))
            .catalog_repo(Arc::new(PgCatalogRepository::new(pool.clone())))
            .cart_repo(Arc::new(PgCartRepository::new(pool.clone())))
            .reservation_repo(Arc::new(PgReservationRepository::new(pool.clone())))
            .system_room_repo(Arc::new(PgSystemRoomRepository::new(pool.clone())))
            .pool(pool)
    }

    pub fn pool(mut self, pool: PgPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn redis_pool(mut self, redis_pool: RedisPool) -> Self {
        self.redis_pool = Some(redis_pool);
        self
    }

    pub fn user_repo(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.user_repo = Some(repo);
        self
    }

    pub fn room_repo(mut self, repo: Arc<dyn RoomRepository>) -> Self {
        self.room_repo = Some(repo);
        self
    }

    pub fn member_repo(mut self, repo: Arc<dyn MemberRepository>) -> Self {
        self.member_repo = Some(repo);
        self
    }

    pub fn message_repo(mut self, repo: Arc<dyn MessageRepository>) -> Self {
        self.message_repo = Some(repo);
        self
    }

    pub fn catalog_repo(mut self, repo: Arc<dyn CatalogRepository>) -> Self {
        self.catalog_repo = Some(repo);
        self
    }

    pub fn cart_repo(mut self, repo: Arc<dyn CartRepository>) -> Self {
        self.cart_repo = Some(repo);
        self
    }

    pub fn reservation_repo(mut self, repo: Arc<dyn ReservationRepository>) -> Self {
        self.reservation_repo = Some(repo);
        self
    }

    pub fn system_room_repo(mut self, repo: Arc<dyn SystemRoomRepository>) -> Self {
        self.system_room_repo = Some(repo);
        self
    }

    pub fn jwt_service(mut self, service: Arc<JwtService>) -> Self {
        self.jwt_service = Some(service);
        self
    }

    pub fn code_reuse_days(mut self, days: i64) -> Self {
        self.code_reuse_days = days;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if any required dependency is missing
    pub fn build(self) -> ServiceResult<ServiceContext> {
        Ok(ServiceContext::new(
            self.pool.ok_or_else(|| ServiceError::validation("pool is required"))?,
            self.redis_pool.ok_or_else(|| ServiceError::validation("redis_pool is required"))?,
            self.user_repo.ok_or_else(|| ServiceError::validation("user_repo is required"))?,
            self.room_repo.ok_or_else(|| ServiceError::validation("room_repo is required"))?,
            self.member_repo.ok_or_else(|| ServiceError::validation("member_repo is required"))?,
            self.message_repo.ok_or_else(|| ServiceError::validation("message_repo is required"))?,
            self.catalog_repo.ok_or_else(|| ServiceError::validation("catalog_repo is required"))?,
            self.cart_repo.ok_or_else(|| ServiceError::validation("cart_repo is required"))?,
            self.reservation_repo.ok_or_else(|| ServiceError::validation("reservation_repo is required"))?,
            self.system_room_repo.ok_or_else(|| ServiceError::validation("system_room_repo is required"))?,
            self.jwt_service.ok_or_else(|| ServiceError::validation("jwt_service is required"))?,
            self.code_reuse_days,
        ))
    }
}

impl Default for ServiceContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
