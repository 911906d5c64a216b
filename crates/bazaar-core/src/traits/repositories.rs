//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Operations that must be atomic (stock
//! changes, code allocation, dispatch, reconciliation) are single trait
//! methods so the implementation can run each one in one transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entities::{
    BlacklistEntry, CartItem, ChannelPatch, CartLine, CartStatus, CatalogItem, Membership, Message, QueueEntry,
    QueuePayload, Reservation, Room, SystemKey, User,
};
use crate::error::DomainError;
use crate::value_objects::{MemberRole, Role};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>>;

    /// List users, newest first
    async fn list(&self, limit: i64) -> RepoResult<Vec<User>>;

    /// Create a new user
    async fn create(&self, user: &User) -> RepoResult<()>;

    /// Change the global role and return the updated user
    async fn set_role(&self, id: Uuid, role: Role) -> RepoResult<User>;
}

// ============================================================================
// Room Repository
// ============================================================================

/// A room together with what the access engine needs about one viewer
#[derive(Debug, Clone)]
pub struct RoomListing {
    pub room: Room,
    pub membership: Option<MemberRole>,
    pub has_members: bool,
}

/// Counters shown on a channel overview
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    pub member_count: i64,
    pub message_count: i64,
    pub pending_queue: i64,
}

#[derive(Debug, Clone)]
pub enum BlacklistChange {
    Add(BlacklistEntry),
    Remove(Uuid),
}

#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Find room by ID
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Room>>;

    /// Every room with the viewer's membership, most recently updated first
    async fn list_for_viewer(&self, user_id: Uuid) -> RepoResult<Vec<RoomListing>>;

    /// Create a room and its initial members
    async fn create(&self, room: &Room, members: &[Membership]) -> RepoResult<()>;

    /// Apply a channel patch under a row lock and return the updated room
    async fn update_channel(&self, room_id: Uuid, patch: &ChannelPatch) -> RepoResult<Room>;

    /// Delete a room with its members and messages
    async fn delete(&self, id: Uuid) -> RepoResult<bool>;

    /// Member, message, and pending queue counts
    async fn stats(&self, id: Uuid) -> RepoResult<ChannelStats>;

    /// Apply a blacklist change under a row lock and return the updated room
    ///
    /// Adding an entry also removes the target's membership in the room.
    async fn update_blacklist(&self, room_id: Uuid, change: BlacklistChange) -> RepoResult<Room>;
}

// ============================================================================
// Member Repository
// ============================================================================

#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Find a membership
    async fn find(&self, room_id: Uuid, user_id: Uuid) -> RepoResult<Option<Membership>>;

    /// Whether the room has any membership rows
    async fn has_members(&self, room_id: Uuid) -> RepoResult<bool>;

    /// List members of a room, oldest first
    async fn list(&self, room_id: Uuid) -> RepoResult<Vec<Membership>>;

    /// Add a member
    async fn add(&self, membership: &Membership) -> RepoResult<()>;

    /// Remove a member; false when there was no such membership
    async fn remove(&self, room_id: Uuid, user_id: Uuid) -> RepoResult<bool>;

    /// Change a member's room role; false when there was no such membership
    async fn set_role(&self, room_id: Uuid, user_id: Uuid, role: MemberRole) -> RepoResult<bool>;
}

// ============================================================================
// Message Repository
// ============================================================================

/// Pagination options for message queries
#[derive(Debug, Clone, Default)]
pub struct MessageQuery {
    pub before: Option<DateTime<Utc>>,
    pub limit: i64,
}

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find message by ID
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<Message>>;

    /// Messages in a room not hidden for `viewer`, oldest first
    async fn list_visible(&self, room_id: Uuid, viewer: Uuid, query: MessageQuery) -> RepoResult<Vec<Message>>;

    /// The latest message not hidden for `viewer` in each of the given rooms
    async fn last_visible(&self, room_ids: &[Uuid], viewer: Uuid) -> RepoResult<Vec<Message>>;

    /// Store a message
    ///
    /// When `client_msg_id` repeats within the room the existing message is
    /// returned instead, so callers compare ids to detect a duplicate.
    async fn create(&self, message: &Message) -> RepoResult<Message>;

    /// Replace the text and stamp the edit
    async fn update_text(&self, id: Uuid, text: &str) -> RepoResult<Message>;

    /// Hide for one user; false when it was already hidden
    async fn hide_for(&self, id: Uuid, user_id: Uuid) -> RepoResult<bool>;

    /// Hard delete
    async fn delete(&self, id: Uuid) -> RepoResult<bool>;
}

// ============================================================================
// Catalog Repository
// ============================================================================

/// A catalog item offered for publication
#[derive(Debug, Clone)]
pub struct Submission {
    pub payload: QueuePayload,
    pub room_id: Uuid,
    pub queued_by: Uuid,
}

/// Which pending entries to publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishSelection {
    /// Every pending entry for the room
    Room(Uuid),
    /// Exactly these entries
    Entries(Vec<Uuid>),
}

#[derive(Debug, Clone)]
pub struct PublishedEntry {
    pub entry: QueueEntry,
    pub item: CatalogItem,
    pub message: Message,
}

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Find catalog item by ID
    async fn find_item(&self, id: Uuid) -> RepoResult<Option<CatalogItem>>;

    /// Case-insensitive title/description match, or exact code match
    async fn search(&self, query: &str, limit: i64) -> RepoResult<Vec<CatalogItem>>;

    /// Create a draft item with a fresh code and queue it
    async fn submit(&self, submission: &Submission) -> RepoResult<QueueEntry>;

    /// Queue an existing item again, keeping its code if it still has one
    async fn requeue(&self, item_id: Uuid, submission: &Submission) -> RepoResult<QueueEntry>;

    /// Pending entries, oldest first
    async fn list_pending(&self, room_id: Option<Uuid>) -> RepoResult<Vec<QueueEntry>>;

    /// Publish the selected entries; either all of them are published or none
    async fn publish(&self, selection: &PublishSelection, approved_by: Uuid) -> RepoResult<Vec<PublishedEntry>>;

    /// Archive an item; its code becomes reusable after `reuse_after_days`
    async fn archive(&self, item_id: Uuid, reuse_after_days: i64) -> RepoResult<CatalogItem>;
}

// ============================================================================
// Cart Repository
// ============================================================================

#[derive(Debug, Clone)]
pub struct CartUpdate {
    pub cart_item: CartItem,
    pub reservation: Reservation,
    pub item: CatalogItem,
    /// The catalog post after its stock line was rewritten
    pub catalog_message: Option<Message>,
}

#[derive(Debug, Clone)]
pub struct CartCancellation {
    pub cart_item_id: Uuid,
    pub item: CatalogItem,
    pub catalog_message: Option<Message>,
    /// Operational message removed along with the reservation
    pub removed_message: Option<Message>,
}

#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Reserve stock into the user's cart
    async fn add(&self, user_id: Uuid, item_id: Uuid, quantity: i32) -> RepoResult<CartUpdate>;

    /// Cancel a pending cart item and return its stock
    async fn cancel(&self, user_id: Uuid, cart_item_id: Uuid) -> RepoResult<CartCancellation>;

    /// The user's cart, newest first
    async fn list(&self, user_id: Uuid) -> RepoResult<Vec<CartLine>>;

    /// Set the processing status of a cart item
    async fn set_status(&self, cart_item_id: Uuid, status: CartStatus) -> RepoResult<CartItem>;
}

// ============================================================================
// Reservation Repository
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementTarget {
    Reservation(Uuid),
    CartItem(Uuid),
}

#[derive(Debug, Clone)]
pub struct Placement {
    pub reservation: Reservation,
    pub shelf_number: i32,
    /// The operational message after its metadata was patched
    pub message: Option<Message>,
}

/// Operational message written for one reservation
#[derive(Debug, Clone)]
pub struct DispatchedOrder {
    pub message: Message,
    /// False when an earlier message of a re-reserved item was rewritten
    pub is_new: bool,
}

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Post every undispatched reservation into `room` and mark them sent
    async fn dispatch(&self, room: &Room) -> RepoResult<Vec<DispatchedOrder>>;

    /// Put a reservation on the client's shelf
    async fn mark_placed(
        &self,
        target: PlacementTarget,
        shelf_number: Option<i32>,
        processed_by: Uuid,
    ) -> RepoResult<Placement>;
}

// ============================================================================
// System Room Repository
// ============================================================================

/// Outcome of one reconciliation pass
#[derive(Debug, Clone)]
pub struct Reconciled {
    pub room: Room,
    /// The room did not exist and was inserted by this pass
    pub created: bool,
}

#[async_trait]
pub trait SystemRoomRepository: Send + Sync {
    /// Ensure the room for `key` exists, is configured, and is staffed
    async fn reconcile(&self, key: SystemKey) -> RepoResult<Reconciled>;

    /// Stamp system keys onto legacy rooms matched by title; returns rooms adopted
    async fn backfill_keys(&self) -> RepoResult<u64>;
}
