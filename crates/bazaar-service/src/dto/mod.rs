//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use requests::{
    AddMemberRequest, AddToCartRequest, BlacklistAction, BlacklistRequest, BugReportRequest,
    CreateChannelRequest, CreateMessageRequest, CreateRoomRequest, DeleteMessageQuery,
    MarkPlacedRequest, MessagesQuery, PendingQueueQuery, PublishQueueRequest, SearchCatalogQuery,
    SetCartStatusRequest, SetUserRoleRequest, SubmitCatalogItemRequest, UpdateChannelRequest,
    UpdateMemberRoleRequest, UpdateMessageRequest,
};

pub use responses::{
    AddToCartResponse, ApiResponse, CancelCartResponse, CartItemResponse, CartLineResponse,
    CartResponse, CartSummaryResponse, CatalogItemResponse, ChannelOverviewResponse,
    DispatchResponse, HealthChecks, HealthResponse, MemberResponse, MessageResponse,
    PlacementResponse, PostRoomResponse, PublishResponse, PublishedEntryResponse,
    QueueEntryResponse, ReadinessResponse, ReservationResponse, RoomResponse, UserResponse,
};
