//! PostgreSQL implementation of SystemRoomRepository
//!
//! Reconciliation runs at boot, before every post or dispatch that targets a
//! system room, and whenever a staff role changes. Each key is
//! serialized with a transaction-scoped advisory lock, so concurrent
//! reconcilers for the same key converge on one room.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};
use uuid::Uuid;

use bazaar_core::entities::{
    staff_member_role, staff_roles, title_matches, Room, RoomConfig, RoomKind, SharedConfig, SystemKey,
};
use bazaar_core::traits::{Reconciled, RepoResult, SystemRoomRepository};

use crate::models::RoomModel;

use super::error::map_db_error;
use super::room::{insert_room, lock_room, save_room};

/// PostgreSQL implementation of SystemRoomRepository
#[derive(Clone)]
pub struct PgSystemRoomRepository {
    pool: PgPool,
}

impl PgSystemRoomRepository {
    /// Create a new PgSystemRoomRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn lock_key(conn: &mut PgConnection, key: SystemKey) -> RepoResult<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(format!("system_room:{}", key.as_str()))
        .execute(conn)
        .await
        .map_err(map_db_error)?;
    Ok(())
}

async fn find_locked(conn: &mut PgConnection, key: SystemKey) -> RepoResult<Option<Room>> {
    let result = sqlx::query_as::<_, RoomModel>(
        r"
        SELECT id, title, kind, created_by, settings, created_at, updated_at
        FROM rooms
        WHERE settings ->> 'system_key' = $1
        FOR UPDATE
        ",
    )
    .bind(key.as_str())
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)?;

    Ok(result.map(Room::from))
}

/// Only one channel may be the catalog post target
async fn clear_other_post_channels(conn: &mut PgConnection, main_id: Uuid) -> RepoResult<u64> {
    let result = sqlx::query(
        r"
        UPDATE rooms
        SET settings = jsonb_set(settings, '{is_post_channel}', 'false'::jsonb)
        WHERE id <> $1 AND settings -> 'is_post_channel' = 'true'::jsonb
        ",
    )
    .bind(main_id)
    .execute(conn)
    .await
    .map_err(map_db_error)?;

    Ok(result.rows_affected())
}

/// Make the room's membership exactly the qualifying staff
async fn sync_staff(conn: &mut PgConnection, room_id: Uuid, include_workers: bool) -> RepoResult<usize> {
    let roles: Vec<&str> = staff_roles(include_workers).into_iter().map(|r| r.as_str()).collect();

    let staff = sqlx::query_as::<_, (Uuid, String)>("SELECT id, role FROM users WHERE role = ANY($1)")
        .bind(&roles)
        .fetch_all(&mut *conn)
        .await
        .map_err(map_db_error)?;

    let (user_ids, member_roles): (Vec<Uuid>, Vec<&str>) = staff
        .iter()
        .filter_map(|(id, role)| {
            let role = role.parse().ok()?;
            staff_member_role(role, include_workers).map(|m| (*id, m.as_str()))
        })
        .unzip();

    sqlx::query("DELETE FROM room_members WHERE room_id = $1 AND NOT (user_id = ANY($2))")
        .bind(room_id)
        .bind(&user_ids)
        .execute(&mut *conn)
        .await
        .map_err(map_db_error)?;

    sqlx::query(
        r"
        INSERT INTO room_members (room_id, user_id, role, joined_at)
        SELECT $1, t.user_id, t.role, NOW()
        FROM UNNEST($2::uuid[], $3::text[]) AS t(user_id, role)
        ON CONFLICT (room_id, user_id) DO UPDATE SET role = EXCLUDED.role
        ",
    )
    .bind(room_id)
    .bind(&user_ids)
    .bind(&member_roles)
    .execute(&mut *conn)
    .await
    .map_err(map_db_error)?;

    Ok(user_ids.len())
}

#[async_trait]
impl SystemRoomRepository for PgSystemRoomRepository {
    #[instrument(skip(self), fields(key = key.as_str()))]
    async fn reconcile(&self, key: SystemKey) -> RepoResult<Reconciled> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        lock_key(&mut tx, key).await?;

        let existing = find_locked(&mut tx, key).await?;
        let created = existing.is_none();
        let room = match existing {
            Some(mut room) => {
                room.config = room.config.reconciled(key);
                if room.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
                    room.title = Some(key.default_title().to_string());
                }
                save_room(&mut tx, &room).await?;
                room
            }
            None => {
                let room = Room::new(
                    Uuid::new_v4(),
                    Some(key.default_title().to_string()),
                    RoomKind::Channel,
                    None,
                    RoomConfig::canonical(key, SharedConfig::default()),
                );
                insert_room(&mut tx, &room).await?;
                info!(room_id = %room.id, "Created system room");
                room
            }
        };

        if key == SystemKey::MainChannel {
            let cleared = clear_other_post_channels(&mut tx, room.id).await?;
            if cleared > 0 {
                info!(cleared, "Cleared stale post-channel flags");
            }
        }

        if key.has_staff_membership() {
            let staff = sync_staff(&mut tx, room.id, key.includes_workers()).await?;
            info!(room_id = %room.id, staff, "Synchronized staff membership");
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(Reconciled { room, created })
    }

    #[instrument(skip(self))]
    async fn backfill_keys(&self) -> RepoResult<u64> {
        let mut adopted = 0;

        for key in SystemKey::ALL {
            let mut tx = self.pool.begin().await.map_err(map_db_error)?;
            lock_key(&mut tx, key).await?;

            if find_locked(&mut tx, key).await?.is_some() {
                continue;
            }

            let candidates = sqlx::query_as::<_, RoomModel>(
                r"
                SELECT id, title, kind, created_by, settings, created_at, updated_at
                FROM rooms
                WHERE kind = 'channel' AND settings ->> 'system_key' IS NULL
                ORDER BY created_at, id
                ",
            )
            .fetch_all(&mut *tx)
            .await
            .map_err(map_db_error)?;

            // The main channel's settings kind is plain "channel", so only the title identifies it
            let legacy = candidates.into_iter().find(|model| {
                title_matches(model.title.as_deref(), key.default_title())
                    || (key != SystemKey::MainChannel
                        && model.settings.get("kind").and_then(|k| k.as_str()) == Some(key.settings_kind()))
            });

            let Some(legacy) = legacy else {
                continue;
            };

            if let Some(mut room) = lock_room(&mut tx, legacy.id).await? {
                room.config = room.config.reconciled(key);
                save_room(&mut tx, &room).await?;
                tx.commit().await.map_err(map_db_error)?;

                info!(room_id = %room.id, key = key.as_str(), "Adopted legacy system room");
                adopted += 1;
            }
        }

        Ok(adopted)
    }
}
