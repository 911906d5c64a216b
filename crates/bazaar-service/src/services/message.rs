//! Message service
//!
//! Reading, posting, editing, and scoped deletion of room messages.

use bazaar_core::entities::{DeleteScope, Message, MESSAGE_TEXT_MAX};
use bazaar_core::traits::MessageQuery;
use bazaar_core::{DomainError, Identity, RoomEvent};
use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::dto::{CreateMessageRequest, MessageResponse, MessagesQuery, UpdateMessageRequest};

use super::access::AccessService;
use super::context::ServiceContext;
use super::error::ServiceResult;

/// Page size when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Trim `text` and enforce `1..=max` characters
pub fn clean_text(text: &str, max: usize) -> Result<String, DomainError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DomainError::ValidationError("text must not be empty".into()));
    }
    if text.chars().count() > max {
        return Err(DomainError::ContentTooLong { max });
    }
    Ok(text.to_string())
}

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    async fn load(&self, message_id: Uuid) -> ServiceResult<Message> {
        self.ctx
            .message_repo()
            .find_by_id(message_id)
            .await?
            .ok_or_else(|| DomainError::MessageNotFound(message_id).into())
    }

    /// Messages of a room, oldest first, without those hidden for the caller
    #[instrument(skip(self, query))]
    pub async fn get_messages(
        &self,
        room_id: Uuid,
        query: MessagesQuery,
        caller: &Identity,
    ) -> ServiceResult<Vec<MessageResponse>> {
        AccessService::new(self.ctx).require_read(room_id, caller).await?;

        let messages = self
            .ctx
            .message_repo()
            .list_visible(
                room_id,
                caller.user_id,
                MessageQuery {
                    before: query.before,
                    limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
                },
            )
            .await?;

        Ok(messages.iter().map(MessageResponse::from).collect())
    }

    /// Post a user message
    ///
    /// A repeated `client_msg_id` returns the message stored by the first
    /// attempt and publishes nothing.
    #[instrument(skip(self, request))]
    pub async fn post_message(
        &self,
        room_id: Uuid,
        request: CreateMessageRequest,
        caller: &Identity,
    ) -> ServiceResult<MessageResponse> {
        AccessService::new(self.ctx).require_post(room_id, caller).await?;

        let text = clean_text(&request.text, MESSAGE_TEXT_MAX)?;
        let client_msg_id = request
            .client_msg_id
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let draft = Message {
            id: Uuid::new_v4(),
            room_id,
            sender_id: Some(caller.user_id),
            text,
            meta: json!({}),
            client_msg_id,
            created_at: Utc::now(),
        };

        let stored = self.ctx.message_repo().create(&draft).await?;
        let response = MessageResponse::from(&stored);

        if stored.id == draft.id {
            info!(message_id = %stored.id, room_id = %room_id, "Message posted");
            self.ctx
                .publish(&[RoomEvent::message_new(room_id, stored.id, response.to_value())])
                .await;
        } else {
            debug!(message_id = %stored.id, "Duplicate client_msg_id, returning stored message");
        }

        Ok(response)
    }

    /// Edit the caller's own user message
    #[instrument(skip(self, request))]
    pub async fn edit_message(
        &self,
        message_id: Uuid,
        request: UpdateMessageRequest,
        caller: &Identity,
    ) -> ServiceResult<MessageResponse> {
        let message = self.load(message_id).await?;
        AccessService::new(self.ctx).require_read(message.room_id, caller).await?;
        message.ensure_editable_by(caller)?;

        let text = clean_text(&request.text, MESSAGE_TEXT_MAX)?;
        let updated = self.ctx.message_repo().update_text(message_id, &text).await?;
        let response = MessageResponse::from(&updated);

        info!(message_id = %message_id, "Message edited");
        self.ctx
            .publish(&[RoomEvent::message_updated(updated.room_id, updated.id, response.to_value())])
            .await;

        Ok(response)
    }

    /// Delete a message for the caller only, or for everyone
    #[instrument(skip(self))]
    pub async fn delete_message(&self, message_id: Uuid, scope: DeleteScope, caller: &Identity) -> ServiceResult<()> {
        let message = self.load(message_id).await?;
        AccessService::new(self.ctx).require_read(message.room_id, caller).await?;

        match scope {
            DeleteScope::Me => {
                let hidden = self.ctx.message_repo().hide_for(message_id, caller.user_id).await?;
                debug!(message_id = %message_id, hidden, "Message hidden for caller");
            }
            DeleteScope::All => {
                message.ensure_deletable_by(caller)?;
                if !self.ctx.message_repo().delete(message_id).await? {
                    return Err(DomainError::MessageNotFound(message_id).into());
                }

                info!(message_id = %message_id, room_id = %message.room_id, "Message deleted");
                self.ctx
                    .publish(&[RoomEvent::message_deleted(message.room_id, message_id)])
                    .await;
            }
        }

        Ok(())
    }
}
