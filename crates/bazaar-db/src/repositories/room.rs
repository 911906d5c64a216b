//! PostgreSQL implementation of RoomRepository

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;
use uuid::Uuid;

use bazaar_core::entities::{ChannelPatch, Membership, Room, SystemKey};
use bazaar_core::error::DomainError;
use bazaar_core::traits::{BlacklistChange, ChannelStats, RepoResult, RoomListing, RoomRepository};

use crate::mappers::RoomInsert;
use crate::models::{ChannelStatsModel, RoomListingModel, RoomModel};

use super::error::{map_db_error, map_unique_violation, room_not_found};

/// PostgreSQL implementation of RoomRepository
#[derive(Clone)]
pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    /// Create a new PgRoomRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Insert a room row; a second holder of a system key is rejected
pub(super) async fn insert_room(conn: &mut PgConnection, room: &Room) -> RepoResult<()> {
    let insert = RoomInsert::new(room);

    sqlx::query(
        r"
        INSERT INTO rooms (id, title, kind, created_by, settings, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ",
    )
    .bind(insert.id)
    .bind(insert.title)
    .bind(insert.kind)
    .bind(insert.created_by)
    .bind(&insert.settings)
    .bind(room.created_at)
    .bind(room.updated_at)
    .execute(conn)
    .await
    .map_err(|e| {
        map_unique_violation(e, || {
            DomainError::DuplicateSystemRoom(room.system_key().map_or("unknown", SystemKey::as_str).to_string())
        })
    })?;

    Ok(())
}

/// Lock a room row for the rest of the transaction
pub(super) async fn lock_room(conn: &mut PgConnection, id: Uuid) -> RepoResult<Option<Room>> {
    let result = sqlx::query_as::<_, RoomModel>(
        r"
        SELECT id, title, kind, created_by, settings, created_at, updated_at
        FROM rooms
        WHERE id = $1
        FOR UPDATE
        ",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)?;

    Ok(result.map(Room::from))
}

/// Persist title and settings
pub(super) async fn save_room(conn: &mut PgConnection, room: &Room) -> RepoResult<()> {
    let insert = RoomInsert::new(room);

    let result = sqlx::query(
        r"
        UPDATE rooms SET title = $2, settings = $3, updated_at = NOW()
        WHERE id = $1
        ",
    )
    .bind(insert.id)
    .bind(insert.title)
    .bind(&insert.settings)
    .execute(conn)
    .await
    .map_err(|e| {
        map_unique_violation(e, || {
            DomainError::DuplicateSystemRoom(room.system_key().map_or("unknown", SystemKey::as_str).to_string())
        })
    })?;

    if result.rows_affected() == 0 {
        return Err(room_not_found(room.id));
    }
    Ok(())
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Room>> {
        let result = sqlx::query_as::<_, RoomModel>(
            r"
            SELECT id, title, kind, created_by, settings, created_at, updated_at
            FROM rooms
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Room::from))
    }

    #[instrument(skip(self))]
    async fn list_for_viewer(&self, user_id: Uuid) -> RepoResult<Vec<RoomListing>> {
        let rows = sqlx::query_as::<_, RoomListingModel>(
            r"
            SELECT r.id, r.title, r.kind, r.created_by, r.settings, r.created_at, r.updated_at,
                   m.role AS member_role,
                   EXISTS(SELECT 1 FROM room_members x WHERE x.room_id = r.id) AS has_members
            FROM rooms r
            LEFT JOIN room_members m ON m.room_id = r.id AND m.user_id = $1
            ORDER BY r.updated_at DESC, r.id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(RoomListing::from).collect())
    }

    #[instrument(skip(self, room, members), fields(room_id = %room.id, members = members.len()))]
    async fn create(&self, room: &Room, members: &[Membership]) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        insert_room(&mut tx, room).await?;

        for member in members {
            sqlx::query(
                r"
                INSERT INTO room_members (room_id, user_id, role, joined_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (room_id, user_id) DO NOTHING
                ",
            )
            .bind(room.id)
            .bind(member.user_id)
            .bind(member.role.as_str())
            .bind(member.joined_at)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self, patch))]
    async fn update_channel(&self, room_id: Uuid, patch: &ChannelPatch) -> RepoResult<Room> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let mut room = lock_room(&mut tx, room_id).await?.ok_or_else(|| room_not_found(room_id))?;
        room.apply_patch(patch)?;

        save_room(&mut tx, &room).await?;
        tx.commit().await.map_err(map_db_error)?;

        Ok(room)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn stats(&self, id: Uuid) -> RepoResult<ChannelStats> {
        let model = sqlx::query_as::<_, ChannelStatsModel>(
            r"
            SELECT
                (SELECT COUNT(*) FROM room_members WHERE room_id = $1) AS member_count,
                (SELECT COUNT(*) FROM messages WHERE room_id = $1) AS message_count,
                (SELECT COUNT(*) FROM publish_queue WHERE room_id = $1 AND status = 'pending') AS pending_queue
            ",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(ChannelStats::from(model))
    }

    #[instrument(skip(self, change))]
    async fn update_blacklist(&self, room_id: Uuid, change: BlacklistChange) -> RepoResult<Room> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let mut room = lock_room(&mut tx, room_id).await?.ok_or_else(|| room_not_found(room_id))?;
        room.ensure_blacklist_editable()?;

        match change {
            BlacklistChange::Add(entry) => {
                let user_id = entry.user_id;
                room.config.blacklist_add(entry);

                sqlx::query("DELETE FROM room_members WHERE room_id = $1 AND user_id = $2")
                    .bind(room_id)
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_db_error)?;
            }
            BlacklistChange::Remove(user_id) => {
                room.config.blacklist_remove(user_id);
            }
        }

        save_room(&mut tx, &room).await?;
        tx.commit().await.map_err(map_db_error)?;

        Ok(room)
    }
}
