//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{PgConnection, PgPool};
use tracing::instrument;
use uuid::Uuid;

use bazaar_core::entities::{meta_with_edit, meta_with_hidden, Message};
use bazaar_core::traits::{MessageQuery, MessageRepository, RepoResult};

use crate::models::MessageModel;

use super::error::{map_db_error, message_not_found};

/// PostgreSQL implementation of MessageRepository
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    /// Create a new PgMessageRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ============================================================================
// Statements shared with the catalog, cart, and reservation repositories
// ============================================================================

/// Insert a message and bump the room's activity timestamp
pub(super) async fn insert_message(conn: &mut PgConnection, message: &Message) -> RepoResult<Message> {
    let model = sqlx::query_as::<_, MessageModel>(
        r"
        INSERT INTO messages (id, room_id, sender_id, text, meta, client_msg_id, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, room_id, sender_id, text, meta, client_msg_id, created_at
        ",
    )
    .bind(message.id)
    .bind(message.room_id)
    .bind(message.sender_id)
    .bind(&message.text)
    .bind(&message.meta)
    .bind(message.client_msg_id.as_deref())
    .bind(message.created_at)
    .fetch_one(&mut *conn)
    .await
    .map_err(map_db_error)?;

    touch_room(conn, message.room_id).await?;
    Ok(Message::from(model))
}

pub(super) async fn touch_room(conn: &mut PgConnection, room_id: Uuid) -> RepoResult<()> {
    sqlx::query("UPDATE rooms SET updated_at = NOW() WHERE id = $1")
        .bind(room_id)
        .execute(conn)
        .await
        .map_err(map_db_error)?;
    Ok(())
}

/// Lock a message row
pub(super) async fn lock_message(conn: &mut PgConnection, id: Uuid) -> RepoResult<Option<Message>> {
    let result = sqlx::query_as::<_, MessageModel>(
        r"
        SELECT id, room_id, sender_id, text, meta, client_msg_id, created_at
        FROM messages
        WHERE id = $1
        FOR UPDATE
        ",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)?;

    Ok(result.map(Message::from))
}

/// Replace text and metadata of a message in place
pub(super) async fn rewrite_message(conn: &mut PgConnection, id: Uuid, text: &str, meta: &Value) -> RepoResult<Message> {
    let model = sqlx::query_as::<_, MessageModel>(
        r"
        UPDATE messages SET text = $2, meta = $3
        WHERE id = $1
        RETURNING id, room_id, sender_id, text, meta, client_msg_id, created_at
        ",
    )
    .bind(id)
    .bind(text)
    .bind(meta)
    .fetch_one(conn)
    .await
    .map_err(map_db_error)?;

    Ok(Message::from(model))
}

/// Delete a message, returning it when it existed
pub(super) async fn delete_message(conn: &mut PgConnection, id: Uuid) -> RepoResult<Option<Message>> {
    let result = sqlx::query_as::<_, MessageModel>(
        r"
        DELETE FROM messages WHERE id = $1
        RETURNING id, room_id, sender_id, text, meta, client_msg_id, created_at
        ",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)?;

    Ok(result.map(Message::from))
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, room_id, sender_id, text, meta, client_msg_id, created_at
            FROM messages
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self))]
    async fn list_visible(&self, room_id: Uuid, viewer: Uuid, query: MessageQuery) -> RepoResult<Vec<Message>> {
        let limit = query.limit.clamp(1, 200);

        let mut rows = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, room_id, sender_id, text, meta, client_msg_id, created_at
            FROM messages
            WHERE room_id = $1
              AND NOT (COALESCE(meta -> 'hidden_for', '[]'::jsonb) ? $2)
              AND ($3::timestamptz IS NULL OR created_at < $3)
            ORDER BY created_at DESC, id DESC
            LIMIT $4
            ",
        )
        .bind(room_id)
        .bind(viewer.to_string())
        .bind(query.before)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.reverse();
        Ok(rows.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self, room_ids), fields(rooms = room_ids.len()))]
    async fn last_visible(&self, room_ids: &[Uuid], viewer: Uuid) -> RepoResult<Vec<Message>> {
        if room_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT DISTINCT ON (room_id) id, room_id, sender_id, text, meta, client_msg_id, created_at
            FROM messages
            WHERE room_id = ANY($1)
              AND NOT (COALESCE(meta -> 'hidden_for', '[]'::jsonb) ? $2)
            ORDER BY room_id, created_at DESC, id DESC
            ",
        )
        .bind(room_ids)
        .bind(viewer.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self, message), fields(message_id = %message.id, room_id = %message.room_id))]
    async fn create(&self, message: &Message) -> RepoResult<Message> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let inserted = sqlx::query_as::<_, MessageModel>(
            r"
            INSERT INTO messages (id, room_id, sender_id, text, meta, client_msg_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (room_id, client_msg_id) WHERE client_msg_id IS NOT NULL DO NOTHING
            RETURNING id, room_id, sender_id, text, meta, client_msg_id, created_at
            ",
        )
        .bind(message.id)
        .bind(message.room_id)
        .bind(message.sender_id)
        .bind(&message.text)
        .bind(&message.meta)
        .bind(message.client_msg_id.as_deref())
        .bind(message.created_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let stored = match inserted {
            Some(model) => {
                touch_room(&mut tx, message.room_id).await?;
                model
            }
            // Retried send: hand back what the first attempt stored
            None => sqlx::query_as::<_, MessageModel>(
                r"
                SELECT id, room_id, sender_id, text, meta, client_msg_id, created_at
                FROM messages
                WHERE room_id = $1 AND client_msg_id = $2
                ",
            )
            .bind(message.room_id)
            .bind(message.client_msg_id.as_deref())
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_error)?,
        };

        tx.commit().await.map_err(map_db_error)?;
        Ok(Message::from(stored))
    }

    #[instrument(skip(self, text))]
    async fn update_text(&self, id: Uuid, text: &str) -> RepoResult<Message> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let current = lock_message(&mut tx, id).await?.ok_or_else(|| message_not_found(id))?;
        let meta = meta_with_edit(&current.meta, Utc::now());
        let updated = rewrite_message(&mut tx, id, text, &meta).await?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn hide_for(&self, id: Uuid, user_id: Uuid) -> RepoResult<bool> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let current = lock_message(&mut tx, id).await?.ok_or_else(|| message_not_found(id))?;
        let Some(meta) = meta_with_hidden(&current.meta, user_id) else {
            return Ok(false);
        };

        sqlx::query("UPDATE messages SET meta = $2 WHERE id = $1")
            .bind(id)
            .bind(&meta)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> RepoResult<bool> {
        let mut conn = self.pool.acquire().await.map_err(map_db_error)?;
        Ok(delete_message(&mut conn, id).await?.is_some())
    }
}
