//! Catalog item and queue entry <-> model mappers

use bazaar_core::entities::{CatalogItem, QueueEntry, QueuePayload};
use bazaar_core::error::DomainError;

use crate::models::{CatalogItemModel, QueueEntryModel};

/// Convert CatalogItemModel to CatalogItem entity
impl From<CatalogItemModel> for CatalogItem {
    fn from(model: CatalogItemModel) -> Self {
        CatalogItem {
            id: model.id,
            code: model.code,
            title: model.title,
            description: model.description,
            price: model.price,
            quantity: model.quantity,
            image_url: model.image_url,
            status: model.status.parse().unwrap_or_default(),
            reusable_at: model.reusable_at,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// The payload column is free-form JSON, so decoding can fail
impl TryFrom<QueueEntryModel> for QueueEntry {
    type Error = DomainError;

    fn try_from(model: QueueEntryModel) -> Result<Self, Self::Error> {
        let payload: QueuePayload = serde_json::from_value(model.payload)
            .map_err(|e| DomainError::DatabaseError(format!("malformed queue payload {}: {e}", model.id)))?;

        Ok(QueueEntry {
            id: model.id,
            catalog_item_id: model.catalog_item_id,
            room_id: model.room_id,
            queued_by: model.queued_by,
            status: model.status.parse().unwrap_or_default(),
            payload,
            published_message_id: model.published_message_id,
            approved_by: model.approved_by,
            approved_at: model.approved_at,
            created_at: model.created_at,
        })
    }
}

/// Decode a batch of queue rows
pub fn queue_entries(models: Vec<QueueEntryModel>) -> Result<Vec<QueueEntry>, DomainError> {
    models.into_iter().map(QueueEntry::try_from).collect()
}
