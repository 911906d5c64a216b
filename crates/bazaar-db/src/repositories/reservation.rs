//! PostgreSQL implementation of ReservationRepository

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use bazaar_core::entities::{
    processor_name, resolve_shelf, Message, Reservation, ReservationAction, ReservedOrder, Room, ShelfResolution,
    SystemMeta,
};
use bazaar_core::error::DomainError;
use bazaar_core::traits::{DispatchedOrder, Placement, PlacementTarget, RepoResult, ReservationRepository};

use crate::models::{ReservationModel, ReservedOrderModel};

use super::error::map_db_error;
use super::message::{insert_message, lock_message, rewrite_message, touch_room};

/// PostgreSQL implementation of ReservationRepository
#[derive(Clone)]
pub struct PgReservationRepository {
    pool: PgPool,
}

impl PgReservationRepository {
    /// Create a new PgReservationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Mark an operational message as placed, keeping unrelated meta keys
fn placed_meta(existing: &Value, shelf_number: i32, processed_by: Uuid, name: String) -> Value {
    let mut map = existing.as_object().cloned().unwrap_or_default();

    if let Some(SystemMeta::ReservedOrderItem(mut order)) = SystemMeta::parse(existing) {
        order.placed = true;
        order.shelf_number = Some(shelf_number);
        order.processed_by_id = Some(processed_by);
        order.processed_by_name = Some(name);
        if let Value::Object(fresh) = SystemMeta::ReservedOrderItem(order).to_value() {
            map.extend(fresh);
        }
    } else {
        map.insert("placed".into(), Value::Bool(true));
        map.insert("shelf_number".into(), Value::from(shelf_number));
        map.insert("processed_by_id".into(), Value::from(processed_by.to_string()));
        map.insert("processed_by_name".into(), Value::from(name));
    }

    Value::Object(map)
}

#[async_trait]
impl ReservationRepository for PgReservationRepository {
    #[instrument(skip(self, room), fields(room_id = %room.id))]
    async fn dispatch(&self, room: &Room) -> RepoResult<Vec<DispatchedOrder>> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        // Cart rows before reservation rows, the order add and cancel use
        sqlx::query(
            r"
            SELECT c.id
            FROM cart_items c
            JOIN reservations r ON r.cart_item_id = c.id
            WHERE r.is_sent = FALSE AND r.is_fulfilled = FALSE
            ORDER BY c.id
            FOR UPDATE OF c
            ",
        )
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let rows = sqlx::query_as::<_, ReservedOrderModel>(
            r"
            SELECT r.id, r.user_id, r.catalog_item_id, r.cart_item_id, r.quantity, r.is_fulfilled, r.is_sent,
                   r.reserved_message_id, r.sent_at, r.fulfilled_at, r.created_at,
                   i.code AS product_code, i.title AS product_title,
                   i.description AS product_description, i.price AS product_price,
                   u.name AS client_name, u.phone AS client_phone,
                   s.shelf_number
            FROM reservations r
            JOIN catalog_items i ON i.id = r.catalog_item_id
            JOIN users u ON u.id = r.user_id
            LEFT JOIN user_shelves s ON s.user_id = r.user_id
            WHERE r.is_sent = FALSE AND r.is_fulfilled = FALSE
            ORDER BY r.created_at, r.id
            FOR UPDATE OF r
            ",
        )
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let now = Utc::now();
        let mut dispatched = Vec::with_capacity(rows.len());

        for row in rows {
            let order = ReservedOrder::from(row);
            order.reservation.state().apply(ReservationAction::Dispatch)?;

            let text = order.message_text();
            let meta = order.message_meta().to_value();

            // A re-reserved item rewrites its earlier message instead of posting a second one
            let previous = match order.reservation.reserved_message_id {
                Some(id) => lock_message(&mut tx, id).await?.filter(|m| m.room_id == room.id),
                None => None,
            };

            let entry = match previous {
                Some(previous) => {
                    let message = rewrite_message(&mut tx, previous.id, &text, &meta).await?;
                    touch_room(&mut tx, room.id).await?;
                    DispatchedOrder { message, is_new: false }
                }
                None => {
                    let message = insert_message(
                        &mut tx,
                        &Message {
                            id: Uuid::new_v4(),
                            room_id: room.id,
                            sender_id: None,
                            text,
                            meta,
                            client_msg_id: None,
                            created_at: now,
                        },
                    )
                    .await?;
                    DispatchedOrder { message, is_new: true }
                }
            };

            sqlx::query(
                r"
                UPDATE reservations SET is_sent = TRUE, sent_at = $2, reserved_message_id = $3
                WHERE id = $1
                ",
            )
            .bind(order.reservation.id)
            .bind(now)
            .bind(entry.message.id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

            if let Some(cart_item_id) = order.reservation.cart_item_id {
                sqlx::query("UPDATE cart_items SET reserved_sent_at = $2, updated_at = NOW() WHERE id = $1")
                    .bind(cart_item_id)
                    .bind(now)
                    .execute(&mut *tx)
                    .await
                    .map_err(map_db_error)?;
            }

            dispatched.push(entry);
        }

        tx.commit().await.map_err(map_db_error)?;
        info!(count = dispatched.len(), "Dispatched reservations");
        Ok(dispatched)
    }

    #[instrument(skip(self))]
    async fn mark_placed(
        &self,
        target: PlacementTarget,
        shelf_number: Option<i32>,
        processed_by: Uuid,
    ) -> RepoResult<Placement> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let (sql, id) = match target {
            PlacementTarget::Reservation(id) => (
                r"
                SELECT id, user_id, catalog_item_id, cart_item_id, quantity, is_fulfilled, is_sent,
                       reserved_message_id, sent_at, fulfilled_at, created_at
                FROM reservations WHERE id = $1
                FOR UPDATE
                ",
                id,
            ),
            PlacementTarget::CartItem(id) => (
                r"
                SELECT id, user_id, catalog_item_id, cart_item_id, quantity, is_fulfilled, is_sent,
                       reserved_message_id, sent_at, fulfilled_at, created_at
                FROM reservations WHERE cart_item_id = $1
                FOR UPDATE
                ",
                id,
            ),
        };

        let reservation = sqlx::query_as::<_, ReservationModel>(sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_db_error)?
            .map(Reservation::from)
            .ok_or(DomainError::ReservationNotFound)?;

        reservation.state().apply(ReservationAction::Place)?;

        let existing_shelf = sqlx::query_scalar::<_, i32>(
            "SELECT shelf_number FROM user_shelves WHERE user_id = $1 FOR UPDATE",
        )
        .bind(reservation.user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let shelf = resolve_shelf(existing_shelf, shelf_number)?;
        if let ShelfResolution::Assign(number) = shelf {
            sqlx::query(
                r"
                INSERT INTO user_shelves (user_id, shelf_number, assigned_at)
                VALUES ($1, $2, NOW())
                ON CONFLICT (user_id) DO NOTHING
                ",
            )
            .bind(reservation.user_id)
            .bind(number)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        let reservation = sqlx::query_as::<_, ReservationModel>(
            r"
            UPDATE reservations SET is_fulfilled = TRUE, fulfilled_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, catalog_item_id, cart_item_id, quantity, is_fulfilled, is_sent,
                      reserved_message_id, sent_at, fulfilled_at, created_at
            ",
        )
        .bind(reservation.id)
        .fetch_one(&mut *tx)
        .await
        .map(Reservation::from)
        .map_err(map_db_error)?;

        if let Some(cart_item_id) = reservation.cart_item_id {
            sqlx::query("UPDATE cart_items SET status = 'processed', updated_at = NOW() WHERE id = $1")
                .bind(cart_item_id)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
        }

        let mut message = None;
        if let Some(message_id) = reservation.reserved_message_id {
            if let Some(current) = lock_message(&mut tx, message_id).await? {
                let processor = sqlx::query_as::<_, (Option<String>, String)>(
                    "SELECT name, email FROM users WHERE id = $1",
                )
                .bind(processed_by)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_db_error)?;

                let name = processor_name(
                    processor.as_ref().and_then(|(name, _)| name.as_deref()),
                    processor.as_ref().map(|(_, email)| email.as_str()),
                );
                let meta = placed_meta(&current.meta, shelf.number(), processed_by, name);
                message = Some(rewrite_message(&mut tx, message_id, &current.text, &meta).await?);
            }
        }

        tx.commit().await.map_err(map_db_error)?;
        info!(reservation_id = %reservation.id, shelf = shelf.number(), "Reservation placed");

        Ok(Placement {
            reservation,
            shelf_number: shelf.number(),
            message,
        })
    }
}
