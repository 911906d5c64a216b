//! PostgreSQL implementation of CartRepository
//!
//! Every flow locks the catalog item row first, then the cart item and
//! reservation. Stock taken by a cart item is always equal to its
//! reservation's quantity, so `item.quantity + Σ reservation.quantity` stays
//! constant across add and cancel.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument};
use uuid::Uuid;

use bazaar_core::entities::{ensure_cancellable, CartItem, CartLine, CartStatus, CatalogItem, Message, Reservation};
use bazaar_core::error::DomainError;
use bazaar_core::traits::{CartCancellation, CartRepository, CartUpdate, RepoResult};

use crate::models::{CartItemModel, CartLineModel, CatalogItemModel, MessageModel, ReservationModel};

use super::error::{item_not_found, map_db_error};
use super::message::{delete_message, rewrite_message};

/// PostgreSQL implementation of CartRepository
#[derive(Clone)]
pub struct PgCartRepository {
    pool: PgPool,
}

impl PgCartRepository {
    /// Create a new PgCartRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn lock_item(conn: &mut PgConnection, id: Uuid) -> RepoResult<CatalogItem> {
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

    result.map(CatalogItem::from).ok_or_else(|| item_not_found(id))
}

/// Move stock by `delta` units and return the item
async fn adjust_stock(conn: &mut PgConnection, id: Uuid, delta: i32) -> RepoResult<CatalogItem> {
    let model = sqlx::query_as::<_, CatalogItemModel>(
        r"
        UPDATE catalog_items SET quantity = quantity + $2, updated_at = NOW()
        WHERE id = $1
        RETURNING id, code, title, description, price, quantity, image_url, status,
                  reusable_at, created_by, created_at, updated_at
        ",
    )
    .bind(id)
    .bind(delta)
    .fetch_one(conn)
    .await
    .map_err(map_db_error)?;

    Ok(CatalogItem::from(model))
}

/// Rewrite the latest catalog post of `item` to show its current stock
async fn refresh_catalog_post(conn: &mut PgConnection, item: &CatalogItem) -> RepoResult<Option<Message>> {
    let post = sqlx::query_as::<_, MessageModel>(
        r"
        SELECT id, room_id, sender_id, text, meta, client_msg_id, created_at
        FROM messages
        WHERE meta ->> 'kind' = 'catalog_product' AND meta ->> 'product_id' = $1
        ORDER BY created_at DESC
        LIMIT 1
        FOR UPDATE
        ",
    )
    .bind(item.id.to_string())
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_db_error)?;

    let Some(post) = post else {
        return Ok(None);
    };

    let meta = item.refresh_listing_meta(&post.meta);
    rewrite_message(conn, post.id, &item.listing_text(), &meta).await.map(Some)
}

#[async_trait]
impl CartRepository for PgCartRepository {
    #[instrument(skip(self))]
    async fn add(&self, user_id: Uuid, item_id: Uuid, quantity: i32) -> RepoResult<CartUpdate> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let item = lock_item(&mut tx, item_id).await?;
        item.ensure_available(quantity)?;
        let item = adjust_stock(&mut tx, item_id, -quantity).await?;

        let cart_item = sqlx::query_as::<_, CartItemModel>(
            r"
            INSERT INTO cart_items (id, user_id, catalog_item_id, quantity, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, 'pending_processing', NOW(), NOW())
            ON CONFLICT (user_id, catalog_item_id) DO UPDATE
            SET quantity = cart_items.quantity + EXCLUDED.quantity,
                status = 'pending_processing',
                reserved_sent_at = NULL,
                updated_at = NOW()
            RETURNING id, user_id, catalog_item_id, quantity, status, reserved_sent_at, created_at, updated_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(item_id)
        .bind(quantity)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        // Re-adding restarts the lifecycle; the reservation mirrors the merged cart quantity
        let reservation = sqlx::query_as::<_, ReservationModel>(
            r"
            INSERT INTO reservations (id, user_id, catalog_item_id, cart_item_id, quantity, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (user_id, catalog_item_id) DO UPDATE
            SET cart_item_id = EXCLUDED.cart_item_id,
                quantity = EXCLUDED.quantity,
                is_sent = FALSE,
                is_fulfilled = FALSE,
                sent_at = NULL,
                fulfilled_at = NULL
            RETURNING id, user_id, catalog_item_id, cart_item_id, quantity, is_fulfilled, is_sent,
                      reserved_message_id, sent_at, fulfilled_at, created_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(item_id)
        .bind(cart_item.id)
        .bind(cart_item.quantity)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let catalog_message = refresh_catalog_post(&mut tx, &item).await?;

        tx.commit().await.map_err(map_db_error)?;
        debug!(remaining = item.quantity, "Reserved stock");

        Ok(CartUpdate {
            cart_item: CartItem::from(cart_item),
            reservation: Reservation::from(reservation),
            item,
            catalog_message,
        })
    }

    #[instrument(skip(self))]
    async fn cancel(&self, user_id: Uuid, cart_item_id: Uuid) -> RepoResult<CartCancellation> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Unlocked read to learn the item, so the item row is locked first
        let item_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT catalog_item_id FROM cart_items WHERE id = $1 AND user_id = $2",
        )
        .bind(cart_item_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .ok_or(DomainError::CartItemNotFound)?;

        lock_item(&mut tx, item_id).await?;

        let cart_item = sqlx::query_as::<_, CartItemModel>(
            r"
            SELECT id, user_id, catalog_item_id, quantity, status, reserved_sent_at, created_at, updated_at
            FROM cart_items
            WHERE id = $1 AND user_id = $2
            FOR UPDATE
            ",
        )
        .bind(cart_item_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .map(CartItem::from)
        .ok_or(DomainError::CartItemNotFound)?;

        let reservation = sqlx::query_as::<_, ReservationModel>(
            r"
            SELECT id, user_id, catalog_item_id, cart_item_id, quantity, is_fulfilled, is_sent,
                   reserved_message_id, sent_at, fulfilled_at, created_at
            FROM reservations
            WHERE user_id = $1 AND catalog_item_id = $2
            FOR UPDATE
            ",
        )
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?
        .map(Reservation::from);

        ensure_cancellable(&cart_item, reservation.as_ref())?;

        let restored = reservation.as_ref().map_or(cart_item.quantity, |r| r.quantity);
        let item = adjust_stock(&mut tx, item_id, restored).await?;

        let mut removed_message = None;
        if let Some(reservation) = &reservation {
            sqlx::query("DELETE FROM reservations WHERE id = $1")
                .bind(reservation.id)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;

            if let Some(message_id) = reservation.reserved_message_id {
                removed_message = delete_message(&mut tx, message_id).await?;
            }
        }

        sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(cart_item.id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let catalog_message = refresh_catalog_post(&mut tx, &item).await?;

        tx.commit().await.map_err(map_db_error)?;
        debug!(restored, "Returned stock");

        Ok(CartCancellation {
            cart_item_id: cart_item.id,
            item,
            catalog_message,
            removed_message,
        })
    }

    #[instrument(skip(self))]
    async fn list(&self, user_id: Uuid) -> RepoResult<Vec<CartLine>> {
        let rows = sqlx::query_as::<_, CartLineModel>(
            r"
            SELECT c.id, c.user_id, c.catalog_item_id, c.quantity, c.status, c.reserved_sent_at,
                   c.created_at, c.updated_at,
                   i.title, i.code AS product_code, i.price, i.image_url
            FROM cart_items c
            JOIN catalog_items i ON i.id = c.catalog_item_id
            WHERE c.user_id = $1
            ORDER BY c.created_at DESC, c.id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(CartLine::from).collect())
    }

    #[instrument(skip(self))]
    async fn set_status(&self, cart_item_id: Uuid, status: CartStatus) -> RepoResult<CartItem> {
        let result = sqlx::query_as::<_, CartItemModel>(
            r"
            UPDATE cart_items SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, catalog_item_id, quantity, status, reserved_sent_at, created_at, updated_at
            ",
        )
        .bind(cart_item_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(CartItem::from).ok_or(DomainError::CartItemNotFound)
    }
}
