//! PostgreSQL implementation of CatalogRepository
//!
//! Code allocation and publishing take `SHARE ROW EXCLUSIVE` on
//! `catalog_items` before touching any row. The mode conflicts with itself,
//! so concurrent allocators run one after another. It also conflicts with the
//! `ROW EXCLUSIVE` lock of any row update, so a cart flow that already holds
//! an item row lock queues behind a running allocation at its stock update.
//! If that allocation then needs the same item row, Postgres reports a
//! deadlock, which surfaces as a retryable conflict.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument};
use uuid::Uuid;

use bazaar_core::entities::{code_reusable_at, CatalogItem, Message, QueueEntry, QueuePayload};
use bazaar_core::error::DomainError;
use bazaar_core::traits::{CatalogRepository, PublishSelection, PublishedEntry, RepoResult, Submission};

use crate::mappers::queue_entries;
use crate::models::{CatalogItemModel, QueueEntryModel};

use super::error::{item_not_found, map_db_error};
use super::message::insert_message;

/// PostgreSQL implementation of CatalogRepository
#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    /// Create a new PgCatalogRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn lock_catalog(conn: &mut PgConnection) -> RepoResult<()> {
    sqlx::query("LOCK TABLE catalog_items IN SHARE ROW EXCLUSIVE MODE")
        .execute(conn)
        .await
        .map_err(map_db_error)?;
    Ok(())
}

/// Next product code; the caller must hold the catalog lock
///
/// The oldest archived item whose cooldown has elapsed gives up its code.
/// Otherwise the code is one past the highest ever handed out.
async fn allocate_code(conn: &mut PgConnection) -> RepoResult<i32> {
    let reusable = sqlx::query_as::<_, (Uuid, i32)>(
        r"
        SELECT id, code
        FROM catalog_items
        WHERE status = 'archived' AND code IS NOT NULL AND reusable_at <= NOW()
        ORDER BY reusable_at, code
        LIMIT 1
        ",
    )
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_db_error)?;

    if let Some((donor_id, code)) = reusable {
        sqlx::query("UPDATE catalog_items SET code = NULL, updated_at = NOW() WHERE id = $1")
            .bind(donor_id)
            .execute(&mut *conn)
            .await
            .map_err(map_db_error)?;
        debug!(code, donor = %donor_id, "Reusing product code");
        return Ok(code);
    }

    let next = sqlx::query_scalar::<_, i32>("SELECT COALESCE(MAX(code), 0) + 1 FROM catalog_items")
        .fetch_one(conn)
        .await
        .map_err(map_db_error)?;
    Ok(next)
}

async fn lock_item(conn: &mut PgConnection, id: Uuid) -> RepoResult<Option<CatalogItem>> {
    let result = sqlx::query_as::<_, CatalogItemModel>(
        r"
        SELECT id, code, title, description, price, quantity, image_url, status,
               reusable_at, created_by, created_at, updated_at
        FROM catalog_items
        WHERE id = $1
        FOR UPDATE
        ",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
    .map_err(map_db_error)?;

    Ok(result.map(CatalogItem::from))
}

async fn insert_queue_entry(
    conn: &mut PgConnection,
    item_id: Uuid,
    submission: &Submission,
) -> RepoResult<QueueEntry> {
    let payload = serde_json::to_value(&submission.payload)
        .map_err(|e| DomainError::InternalError(format!("queue payload: {e}")))?;

    let model = sqlx::query_as::<_, QueueEntryModel>(
        r"
        INSERT INTO publish_queue (id, catalog_item_id, room_id, queued_by, status, payload, created_at)
        VALUES ($1, $2, $3, $4, 'pending', $5, NOW())
        RETURNING id, catalog_item_id, room_id, queued_by, status, payload,
                  published_message_id, approved_by, approved_at, created_at
        ",
    )
    .bind(Uuid::new_v4())
    .bind(item_id)
    .bind(submission.room_id)
    .bind(submission.queued_by)
    .bind(&payload)
    .fetch_one(conn)
    .await
    .map_err(map_db_error)?;

    QueueEntry::try_from(model)
}

/// Copy the submitted snapshot onto the item and mark it published
async fn apply_payload(
    conn: &mut PgConnection,
    item_id: Uuid,
    code: i32,
    payload: &QueuePayload,
) -> RepoResult<CatalogItem> {
    let model = sqlx::query_as::<_, CatalogItemModel>(
        r"
        UPDATE catalog_items
        SET code = $2, title = $3, description = $4, price = $5, quantity = $6, image_url = $7,
            status = 'published', reusable_at = NULL, updated_at = NOW()
        WHERE id = $1
        RETURNING id, code, title, description, price, quantity, image_url, status,
                  reusable_at, created_by, created_at, updated_at
        ",
    )
    .bind(item_id)
    .bind(code)
    .bind(payload.title.trim())
    .bind(payload.description.as_deref())
    .bind(payload.price)
    .bind(payload.quantity)
    .bind(payload.image_url.as_deref())
    .fetch_one(conn)
    .await
    .map_err(map_db_error)?;

    Ok(CatalogItem::from(model))
}

#[async_trait]
impl CatalogRepository for PgCatalogRepository {
    #[instrument(skip(self))]
    async fn find_item(&self, id: Uuid) -> RepoResult<Option<CatalogItem>> {
        let result = sqlx::query_as::<_, CatalogItemModel>(
            r"
            SELECT id, code, title, description, price, quantity, image_url, status,
                   reusable_at, created_by, created_at, updated_at
            FROM catalog_items
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(CatalogItem::from))
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str, limit: i64) -> RepoResult<Vec<CatalogItem>> {
        let query = query.trim();
        let pattern = format!("%{}%", escape_like(query));
        let code = query.parse::<i32>().ok();

        let rows = sqlx::query_as::<_, CatalogItemModel>(
            r"
            SELECT id, code, title, description, price, quantity, image_url, status,
                   reusable_at, created_by, created_at, updated_at
            FROM catalog_items
            WHERE title ILIKE $1 OR description ILIKE $1 OR ($2::int IS NOT NULL AND code = $2)
            ORDER BY (code = $2) IS TRUE DESC, updated_at DESC
            LIMIT $3
            ",
        )
        .bind(&pattern)
        .bind(code)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(CatalogItem::from).collect())
    }

    #[instrument(skip(self, submission), fields(room_id = %submission.room_id))]
    async fn submit(&self, submission: &Submission) -> RepoResult<QueueEntry> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        lock_catalog(&mut tx).await?;

        let code = allocate_code(&mut tx).await?;
        let payload = &submission.payload;
        let item_id = Uuid::new_v4();

        sqlx::query(
            r"
            INSERT INTO catalog_items
                (id, code, title, description, price, quantity, image_url, status, created_by, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'draft', $8, NOW(), NOW())
            ",
        )
        .bind(item_id)
        .bind(code)
        .bind(payload.title.trim())
        .bind(payload.description.as_deref())
        .bind(payload.price)
        .bind(payload.quantity)
        .bind(payload.image_url.as_deref())
        .bind(submission.queued_by)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let entry = insert_queue_entry(&mut tx, item_id, submission).await?;

        tx.commit().await.map_err(map_db_error)?;
        debug!(code, item_id = %item_id, "Queued new catalog item");
        Ok(entry)
    }

    #[instrument(skip(self, submission), fields(room_id = %submission.room_id))]
    async fn requeue(&self, item_id: Uuid, submission: &Submission) -> RepoResult<QueueEntry> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        lock_catalog(&mut tx).await?;

        let item = lock_item(&mut tx, item_id).await?.ok_or_else(|| item_not_found(item_id))?;
        let code = match item.code {
            Some(code) => code,
            None => allocate_code(&mut tx).await?,
        };

        sqlx::query(
            r"
            UPDATE catalog_items
            SET code = $2, status = 'draft', reusable_at = NULL, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(item_id)
        .bind(code)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let entry = insert_queue_entry(&mut tx, item_id, submission).await?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(entry)
    }

    #[instrument(skip(self))]
    async fn list_pending(&self, room_id: Option<Uuid>) -> RepoResult<Vec<QueueEntry>> {
        let rows = sqlx::query_as::<_, QueueEntryModel>(
            r"
            SELECT id, catalog_item_id, room_id, queued_by, status, payload,
                   published_message_id, approved_by, approved_at, created_at
            FROM publish_queue
            WHERE status = 'pending' AND ($1::uuid IS NULL OR room_id = $1)
            ORDER BY created_at, id
            ",
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        queue_entries(rows)
    }

    #[instrument(skip(self, selection))]
    async fn publish(&self, selection: &PublishSelection, approved_by: Uuid) -> RepoResult<Vec<PublishedEntry>> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        lock_catalog(&mut tx).await?;

        let rows = match selection {
            PublishSelection::Room(room_id) => {
                sqlx::query_as::<_, QueueEntryModel>(
                    r"
                    SELECT id, catalog_item_id, room_id, queued_by, status, payload,
                           published_message_id, approved_by, approved_at, created_at
                    FROM publish_queue
                    WHERE status = 'pending' AND room_id = $1
                    ORDER BY created_at, id
                    FOR UPDATE
                    ",
                )
                .bind(room_id)
                .fetch_all(&mut *tx)
                .await
            }
            PublishSelection::Entries(ids) => {
                sqlx::query_as::<_, QueueEntryModel>(
                    r"
                    SELECT id, catalog_item_id, room_id, queued_by, status, payload,
                           published_message_id, approved_by, approved_at, created_at
                    FROM publish_queue
                    WHERE status = 'pending' AND id = ANY($1)
                    ORDER BY created_at, id
                    FOR UPDATE
                    ",
                )
                .bind(ids)
                .fetch_all(&mut *tx)
                .await
            }
        }
        .map_err(map_db_error)?;

        let entries = queue_entries(rows)?;

        // All or nothing: every requested entry must still be pending
        if let PublishSelection::Entries(ids) = selection {
            if let Some(missing) = ids.iter().find(|id| !entries.iter().any(|e| e.id == **id)) {
                return Err(DomainError::QueueEntryNotFound(*missing));
            }
        }

        let now = Utc::now();
        let mut published = Vec::with_capacity(entries.len());

        for entry in entries {
            let item = lock_item(&mut tx, entry.catalog_item_id)
                .await?
                .ok_or_else(|| item_not_found(entry.catalog_item_id))?;

            let code = match item.code {
                Some(code) => code,
                None => allocate_code(&mut tx).await?,
            };
            let item = apply_payload(&mut tx, item.id, code, &entry.payload).await?;

            let message = insert_message(
                &mut tx,
                &Message {
                    id: Uuid::new_v4(),
                    room_id: entry.room_id,
                    sender_id: Some(approved_by),
                    text: item.listing_text(),
                    meta: item.listing_meta().to_value(),
                    client_msg_id: None,
                    created_at: now,
                },
            )
            .await?;

            let model = sqlx::query_as::<_, QueueEntryModel>(
                r"
                UPDATE publish_queue
                SET status = 'published', published_message_id = $2, approved_by = $3, approved_at = $4
                WHERE id = $1
                RETURNING id, catalog_item_id, room_id, queued_by, status, payload,
                          published_message_id, approved_by, approved_at, created_at
                ",
            )
            .bind(entry.id)
            .bind(message.id)
            .bind(approved_by)
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_error)?;

            published.push(PublishedEntry {
                entry: QueueEntry::try_from(model)?,
                item,
                message,
            });
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(published)
    }

    #[instrument(skip(self))]
    async fn archive(&self, item_id: Uuid, reuse_after_days: i64) -> RepoResult<CatalogItem> {
        let result = sqlx::query_as::<_, CatalogItemModel>(
            r"
            UPDATE catalog_items
            SET status = 'archived', reusable_at = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, code, title, description, price, quantity, image_url, status,
                      reusable_at, created_by, created_at, updated_at
            ",
        )
        .bind(item_id)
        .bind(code_reusable_at(Utc::now(), reuse_after_days))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(CatalogItem::from).ok_or_else(|| item_not_found(item_id))
    }
}

/// Escape LIKE wildcards in user input
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
