//! Domain errors - error types for the domain layer

use thiserror::Error;
use uuid::Uuid;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Uuid),

    #[error("Room not found: {0}")]
    RoomNotFound(Uuid),

    #[error("Message not found: {0}")]
    MessageNotFound(Uuid),

    #[error("Catalog item not found: {0}")]
    CatalogItemNotFound(Uuid),

    #[error("Cart item not found")]
    CartItemNotFound,

    #[error("Reservation not found")]
    ReservationNotFound,

    #[error("Queue entry not found: {0}")]
    QueueEntryNotFound(Uuid),

    #[error("Member not found in room")]
    MemberNotFound,

    #[error("System room is not configured: {0}")]
    SystemRoomMissing(&'static str),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("Shelf number is required for this client")]
    ShelfRequired,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("No read access to this room")]
    CannotReadRoom,

    #[error("Cannot post in this room")]
    CannotPostInRoom,

    #[error("Not message sender")]
    NotMessageSender,

    #[error("System messages cannot be modified")]
    SystemMessageImmutable,

    #[error("Catalog items can only be submitted to the main channel")]
    WrongPostTarget { main_channel_id: Uuid },

    #[error("System room settings are managed automatically")]
    SystemRoomProtected,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Not enough stock: {available} available, {requested} requested")]
    OutOfStock { available: i32, requested: i32 },

    #[error("Catalog item is not available")]
    ItemNotAvailable,

    #[error("Reservation already processed")]
    AlreadyProcessed,

    #[error("Reservation already dispatched")]
    AlreadyDispatched,

    #[error("Cart item can no longer be cancelled")]
    NotCancellable,

    #[error("Another room already holds system key {0}")]
    DuplicateSystemRoom(String),

    #[error("Already a member of this room")]
    AlreadyMember,

    #[error("Resource is busy, retry the request")]
    Contended,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::RoomNotFound(_) => "UNKNOWN_ROOM",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::CatalogItemNotFound(_) => "UNKNOWN_CATALOG_ITEM",
            Self::CartItemNotFound => "UNKNOWN_CART_ITEM",
            Self::ReservationNotFound => "UNKNOWN_RESERVATION",
            Self::QueueEntryNotFound(_) => "UNKNOWN_QUEUE_ENTRY",
            Self::MemberNotFound => "UNKNOWN_MEMBER",
            Self::SystemRoomMissing(_) => "SYSTEM_ROOM_MISSING",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::ShelfRequired => "SHELF_REQUIRED",

            // Authorization
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::CannotReadRoom => "CANNOT_READ_ROOM",
            Self::CannotPostInRoom => "CANNOT_POST_IN_ROOM",
            Self::NotMessageSender => "NOT_MESSAGE_SENDER",
            Self::SystemMessageImmutable => "SYSTEM_MESSAGE_IMMUTABLE",
            Self::WrongPostTarget { .. } => "WRONG_POST_TARGET",
            Self::SystemRoomProtected => "SYSTEM_ROOM_PROTECTED",

            // Conflict
            Self::OutOfStock { .. } => "OUT_OF_STOCK",
            Self::ItemNotAvailable => "ITEM_NOT_AVAILABLE",
            Self::AlreadyProcessed => "ALREADY_PROCESSED",
            Self::AlreadyDispatched => "ALREADY_DISPATCHED",
            Self::NotCancellable => "NOT_CANCELLABLE",
            Self::DuplicateSystemRoom(_) => "DUPLICATE_SYSTEM_ROOM",
            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::Contended => "RETRYABLE_CONFLICT",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::RoomNotFound(_)
                | Self::MessageNotFound(_)
                | Self::CatalogItemNotFound(_)
                | Self::CartItemNotFound
                | Self::ReservationNotFound
                | Self::QueueEntryNotFound(_)
                | Self::MemberNotFound
                | Self::SystemRoomMissing(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationError(_) | Self::ContentTooLong { .. })
    }

    /// Check if this is an authorization error
    ///
    /// `Unauthorized` is not included; it means no identity at all.
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::Forbidden(_)
                | Self::CannotReadRoom
                | Self::CannotPostInRoom
                | Self::NotMessageSender
                | Self::SystemMessageImmutable
                | Self::WrongPostTarget { .. }
                | Self::SystemRoomProtected
        )
    }

    /// Check if this is a conflict error
    ///
    /// `ShelfRequired` is reported as a conflict so the caller can retry with a shelf.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::OutOfStock { .. }
                | Self::ItemNotAvailable
                | Self::AlreadyProcessed
                | Self::AlreadyDispatched
                | Self::NotCancellable
                | Self::DuplicateSystemRoom(_)
                | Self::AlreadyMember
                | Self::Contended
                | Self::ShelfRequired
        )
    }

    /// Whether repeating the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Contended)
    }
}
