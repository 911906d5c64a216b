//! Catalog service
//!
//! Submission into the publication queue, staff approval, archiving, and search.

use bazaar_core::traits::{PublishSelection, Submission};
use bazaar_core::{DomainError, Identity, Room, RoomEvent, SystemKey};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::dto::{
    CatalogItemResponse, PendingQueueQuery, PostRoomResponse, PublishQueueRequest,
    PublishResponse, PublishedEntryResponse, QueueEntryResponse, SubmitCatalogItemRequest,
};

use super::access::{require_staff, require_worker};
use super::context::ServiceContext;
use super::error::ServiceResult;
use super::system_room::SystemRoomService;

/// Maximum search hits
pub const SEARCH_LIMIT: i64 = 30;

/// Catalog items may only be submitted to the main channel
pub fn ensure_post_target(main: &Room, target: Uuid) -> Result<(), DomainError> {
    if main.id == target {
        Ok(())
    } else {
        Err(DomainError::WrongPostTarget {
            main_channel_id: main.id,
        })
    }
}

/// Catalog service
pub struct CatalogService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CatalogService<'a> {
    /// Create a new CatalogService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    async fn submission(&self, request: &SubmitCatalogItemRequest, caller: &Identity) -> ServiceResult<Submission> {
        let payload = request.payload();
        payload.validate()?;

        let main = SystemRoomService::new(self.ctx).ensure(SystemKey::MainChannel).await?;
        ensure_post_target(&main, request.room_id)?;

        Ok(Submission {
            payload,
            room_id: request.room_id,
            queued_by: caller.user_id,
        })
    }

    /// Queue a new catalog item for approval
    #[instrument(skip(self, request))]
    pub async fn submit(
        &self,
        request: SubmitCatalogItemRequest,
        caller: &Identity,
    ) -> ServiceResult<QueueEntryResponse> {
        require_worker(caller)?;

        let submission = self.submission(&request, caller).await?;
        let entry = self.ctx.catalog_repo().submit(&submission).await?;

        info!(queue_id = %entry.id, item_id = %entry.catalog_item_id, "Catalog item queued");
        Ok(QueueEntryResponse::from(&entry))
    }

    /// Queue an existing item again, typically after it was archived
    #[instrument(skip(self, request))]
    pub async fn requeue(
        &self,
        item_id: Uuid,
        request: SubmitCatalogItemRequest,
        caller: &Identity,
    ) -> ServiceResult<QueueEntryResponse> {
        require_worker(caller)?;

        let submission = self.submission(&request, caller).await?;
        let entry = self.ctx.catalog_repo().requeue(item_id, &submission).await?;

        info!(queue_id = %entry.id, item_id = %item_id, "Catalog item requeued");
        Ok(QueueEntryResponse::from(&entry))
    }

    /// Pending entries, oldest first
    #[instrument(skip(self))]
    pub async fn pending(&self, query: PendingQueueQuery, caller: &Identity) -> ServiceResult<Vec<QueueEntryResponse>> {
        require_staff(caller)?;
        let entries = self.ctx.catalog_repo().list_pending(query.room_id).await?;
        Ok(entries.iter().map(QueueEntryResponse::from).collect())
    }

    /// Approve a batch of pending entries
    ///
    /// The batch commits or fails as a whole; events go out only after commit.
    #[instrument(skip(self, request))]
    pub async fn publish(&self, request: PublishQueueRequest, caller: &Identity) -> ServiceResult<PublishResponse> {
        require_staff(caller)?;

        let selection = PublishSelection::try_from(request)?;
        let published = self.ctx.catalog_repo().publish(&selection, caller.user_id).await?;

        let responses: Vec<PublishedEntryResponse> = published.iter().map(PublishedEntryResponse::from).collect();
        let events: Vec<RoomEvent> = responses
            .iter()
            .map(|p| RoomEvent::message_new(p.message.room_id, p.message.id, p.message.to_value()))
            .collect();

        info!(count = responses.len(), "Queue entries published");
        self.ctx.publish(&events).await;

        Ok(PublishResponse { published: responses })
    }

    /// Archive an item; its code becomes reusable after the cooldown
    #[instrument(skip(self))]
    pub async fn archive(&self, item_id: Uuid, caller: &Identity) -> ServiceResult<CatalogItemResponse> {
        require_staff(caller)?;

        let item = self
            .ctx
            .catalog_repo()
            .archive(item_id, self.ctx.code_reuse_days())
            .await?;

        info!(item_id = %item_id, code = ?item.code, "Catalog item archived");
        Ok(CatalogItemResponse::from(&item))
    }

    /// Get one catalog item
    #[instrument(skip(self))]
    pub async fn get_item(&self, item_id: Uuid) -> ServiceResult<CatalogItemResponse> {
        let item = self
            .ctx
            .catalog_repo()
            .find_item(item_id)
            .await?
            .ok_or(DomainError::CatalogItemNotFound(item_id))?;
        Ok(CatalogItemResponse::from(&item))
    }

    /// Title, description, or exact code search
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, caller: &Identity) -> ServiceResult<Vec<CatalogItemResponse>> {
        require_worker(caller)?;

        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let items = self.ctx.catalog_repo().search(query, SEARCH_LIMIT).await?;
        Ok(items.iter().map(CatalogItemResponse::from).collect())
    }

    /// Rooms the caller may submit catalog items to
    #[instrument(skip(self))]
    pub async fn allowed_post_rooms(&self, caller: &Identity) -> ServiceResult<Vec<PostRoomResponse>> {
        require_worker(caller)?;

        let main = SystemRoomService::new(self.ctx).ensure(SystemKey::MainChannel).await?;
        Ok(vec![PostRoomResponse {
            id: main.id,
            title: main.title,
        }])
    }
}
