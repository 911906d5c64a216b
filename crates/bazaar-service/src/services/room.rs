//! Room service
//!
//! The room directory: listing, creation, channel settings, and deletion.

use std::collections::HashMap;

use bazaar_core::entities::{ChannelPatch, Membership, RoomConfig, RoomKind, Visibility};
use bazaar_core::{decide, AccessDecision, DomainError, Identity, MemberRole, Room, RoomAccess, RoomEvent};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::dto::{
    ChannelOverviewResponse, CreateChannelRequest, CreateRoomRequest, MessageResponse, RoomResponse,
    UpdateChannelRequest,
};

use super::access::{require_staff, AccessService};
use super::context::ServiceContext;
use super::error::ServiceResult;

/// Maximum rooms returned by a listing
pub const ROOM_LIST_LIMIT: usize = 200;

/// Room service
pub struct RoomService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RoomService<'a> {
    /// Create a new RoomService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Rooms the caller can read, most recently updated first
    #[instrument(skip(self))]
    pub async fn list_rooms(&self, caller: &Identity) -> ServiceResult<Vec<RoomResponse>> {
        let mut listings = self.ctx.room_repo().list_for_viewer(caller.user_id).await?;
        listings.sort_by(|a, b| b.room.updated_at.cmp(&a.room.updated_at));

        let mut rooms: Vec<RoomResponse> = listings
            .iter()
            .filter_map(|listing| {
                let access =
                    RoomAccess::for_user(&listing.room, caller.user_id, listing.membership, listing.has_members);
                let decision = decide(&access, caller.role);
                decision
                    .can_read
                    .then(|| RoomResponse::from_listing(listing, decision))
            })
            .take(ROOM_LIST_LIMIT)
            .collect();

        let ids: Vec<Uuid> = rooms.iter().map(|r| r.id).collect();
        let mut last: HashMap<Uuid, MessageResponse> = self
            .ctx
            .message_repo()
            .last_visible(&ids, caller.user_id)
            .await?
            .iter()
            .map(|m| (m.room_id, MessageResponse::from(m)))
            .collect();

        for room in &mut rooms {
            room.last_message = last.remove(&room.id);
        }

        Ok(rooms)
    }

    /// Get one room the caller can read
    #[instrument(skip(self))]
    pub async fn get_room(&self, room_id: Uuid, caller: &Identity) -> ServiceResult<RoomResponse> {
        let gate = AccessService::new(self.ctx).require_read(room_id, caller).await?;
        let mut response = RoomResponse::from(&gate.room).with_access(gate.decision);
        response.member_role = gate.membership;
        Ok(response)
    }

    /// Create a direct or group chat with the caller as owner
    #[instrument(skip(self, request))]
    pub async fn create_room(&self, request: CreateRoomRequest, caller: &Identity) -> ServiceResult<RoomResponse> {
        require_staff(caller)?;

        let mut others: Vec<Uuid> = Vec::with_capacity(request.members.len());
        for user_id in request.members {
            if user_id != caller.user_id && !others.contains(&user_id) {
                others.push(user_id);
            }
        }
        if others.is_empty() {
            return Err(DomainError::ValidationError("at least one other member is required".into()).into());
        }
        for user_id in &others {
            if self.ctx.user_repo().find_by_id(*user_id).await?.is_none() {
                return Err(DomainError::UserNotFound(*user_id).into());
            }
        }

        let kind = if others.len() == 1 { RoomKind::Direct } else { RoomKind::Group };
        let title = request
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let room = Room::new(
            Uuid::new_v4(),
            title,
            kind,
            Some(caller.user_id),
            RoomConfig::generic(Visibility::Private, None),
        );

        let mut members = vec![Membership::new(room.id, caller.user_id, MemberRole::Owner)];
        members.extend(others.iter().map(|id| Membership::new(room.id, *id, MemberRole::Member)));

        self.ctx.room_repo().create(&room, &members).await?;
        info!(room_id = %room.id, kind = kind.as_str(), members = members.len(), "Room created");

        self.ctx.publish(&[RoomEvent::room_created(room.id, room.kind)]).await;

        let mut response = RoomResponse::from(&room).with_access(AccessDecision {
            can_read: true,
            can_post: true,
        });
        response.member_role = Some(MemberRole::Owner);
        Ok(response)
    }

    /// Create a generic channel
    #[instrument(skip(self, request))]
    pub async fn create_channel(
        &self,
        request: CreateChannelRequest,
        caller: &Identity,
    ) -> ServiceResult<RoomResponse> {
        require_staff(caller)?;

        let title = request.title.trim();
        if title.is_empty() {
            return Err(DomainError::ValidationError("title must not be empty".into()).into());
        }
        let description = request
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let room = Room::new(
            Uuid::new_v4(),
            Some(title.to_string()),
            RoomKind::Channel,
            Some(caller.user_id),
            RoomConfig::generic(request.visibility, description),
        );
        let owner = Membership::new(room.id, caller.user_id, MemberRole::Owner);

        self.ctx.room_repo().create(&room, &[owner]).await?;
        info!(room_id = %room.id, visibility = request.visibility.as_str(), "Channel created");

        self.ctx.publish(&[RoomEvent::room_created(room.id, room.kind)]).await;

        let gate = AccessService::new(self.ctx).evaluate(room, caller).await?;
        let mut response = RoomResponse::from(&gate.room).with_access(gate.decision);
        response.member_role = gate.membership;
        Ok(response)
    }

    /// Update a channel's title and settings
    #[instrument(skip(self, request))]
    pub async fn update_channel(
        &self,
        room_id: Uuid,
        request: UpdateChannelRequest,
        caller: &Identity,
    ) -> ServiceResult<RoomResponse> {
        require_staff(caller)?;

        let patch = ChannelPatch::from(request);
        let room = self.ctx.room_repo().update_channel(room_id, &patch).await?;

        info!(room_id = %room_id, "Channel updated");
        self.ctx.publish(&[RoomEvent::room_updated(room.id, room.kind)]).await;

        let gate = AccessService::new(self.ctx).evaluate(room, caller).await?;
        let mut response = RoomResponse::from(&gate.room).with_access(gate.decision);
        response.member_role = gate.membership;
        Ok(response)
    }

    /// Delete a channel with its memberships and messages
    #[instrument(skip(self))]
    pub async fn delete_channel(&self, room_id: Uuid, caller: &Identity) -> ServiceResult<()> {
        require_staff(caller)?;

        let room = AccessService::new(self.ctx).load_room(room_id).await?;
        if !room.is_channel() {
            return Err(DomainError::ValidationError("only channels can be deleted here".into()).into());
        }
        room.ensure_deletable()?;

        if !self.ctx.room_repo().delete(room_id).await? {
            return Err(DomainError::RoomNotFound(room_id).into());
        }

        info!(room_id = %room_id, "Channel deleted");
        self.ctx.publish(&[RoomEvent::room_deleted(room.id, room.kind)]).await;
        Ok(())
    }

    /// Staff view of a channel
    #[instrument(skip(self))]
    pub async fn overview(&self, room_id: Uuid, caller: &Identity) -> ServiceResult<ChannelOverviewResponse> {
        require_staff(caller)?;

        let access = AccessService::new(self.ctx);
        let room = access.load_room(room_id).await?;
        let stats = self.ctx.room_repo().stats(room_id).await?;
        let blacklist = room.config.shared().blacklist.clone();

        let gate = access.evaluate(room, caller).await?;
        let mut response = RoomResponse::from(&gate.room).with_access(gate.decision);
        response.member_role = gate.membership;

        Ok(ChannelOverviewResponse {
            room: response,
            member_count: stats.member_count,
            message_count: stats.message_count,
            pending_queue: stats.pending_queue,
            blacklist,
        })
    }
}
