//! PostgreSQL implementation of MemberRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use bazaar_core::entities::Membership;
use bazaar_core::error::DomainError;
use bazaar_core::traits::{MemberRepository, RepoResult};
use bazaar_core::value_objects::MemberRole;

use crate::models::MemberModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of MemberRepository
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    /// Create a new PgMemberRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    #[instrument(skip(self))]
    async fn find(&self, room_id: Uuid, user_id: Uuid) -> RepoResult<Option<Membership>> {
        let result = sqlx::query_as::<_, MemberModel>(
            r"
            SELECT room_id, user_id, role, joined_at
            FROM room_members
            WHERE room_id = $1 AND user_id = $2
            ",
        )
        .bind(room_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Membership::from))
    }

    #[instrument(skip(self))]
    async fn has_members(&self, room_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(SELECT 1 FROM room_members WHERE room_id = $1)
            ",
        )
        .bind(room_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn list(&self, room_id: Uuid) -> RepoResult<Vec<Membership>> {
        let rows = sqlx::query_as::<_, MemberModel>(
            r"
            SELECT room_id, user_id, role, joined_at
            FROM room_members
            WHERE room_id = $1
            ORDER BY joined_at, user_id
            ",
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Membership::from).collect())
    }

    #[instrument(skip(self))]
    async fn add(&self, membership: &Membership) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO room_members (room_id, user_id, role, joined_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(membership.room_id)
        .bind(membership.user_id)
        .bind(membership.role.as_str())
        .bind(membership.joined_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyMember))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, room_id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM room_members WHERE room_id = $1 AND user_id = $2
            ",
        )
        .bind(room_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn set_role(&self, room_id: Uuid, user_id: Uuid, role: MemberRole) -> RepoResult<bool> {
        let result = sqlx::query(
            r"
            UPDATE room_members SET role = $3
            WHERE room_id = $1 AND user_id = $2
            ",
        )
        .bind(room_id)
        .bind(user_id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
