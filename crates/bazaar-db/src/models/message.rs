//! Message database model

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for messages table
#[derive(Debug, Clone, FromRow)]
pub struct MessageModel {
    pub id: Uuid,
    pub room_id: Uuid,
    pub sender_id: Option<Uuid>,
    pub text: String,
    pub meta: Value,
    pub client_msg_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
