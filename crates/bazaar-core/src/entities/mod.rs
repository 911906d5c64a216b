//! Domain entities - core business objects

mod cart;
mod catalog;
mod channel_patch;
mod membership;
mod message;
mod room;
mod room_config;
mod user;

pub use cart::{
    ensure_cancellable, processor_name, resolve_shelf, CartItem, CartLine, CartStatus, CartSummary,
    Reservation, ReservationAction, ReservationState, ReservedOrder, ShelfAssignment, ShelfResolution,
    DEFAULT_PROCESSOR_NAME,
};
pub use catalog::{
    check_stock, code_reusable_at, format_price, CatalogItem, ItemStatus, QueueEntry, QueuePayload,
    QueueStatus, DEFAULT_CODE_REUSE_DAYS,
};
pub use channel_patch::ChannelPatch;
pub use membership::{staff_member_role, staff_roles, Membership};
pub use message::{
    meta_with_edit, meta_with_hidden, BugReportMeta, CatalogProductMeta, DeleteScope, Message, MetaKind,
    ReservedOrderMeta, SystemMeta, BUG_REPORT_TEXT_MAX, MESSAGE_TEXT_MAX,
};
pub use room::{title_matches, Room, RoomKind};
pub use room_config::{
    AvatarSettings, BlacklistEntry, BugReportsConfig, GenericChannelConfig, MainChannelConfig,
    ReservedOrdersConfig, RoomConfig, SharedConfig, SystemKey, Visibility, BLACKLIST_REASON_MAX,
    BUG_REPORTS_TITLE, MAIN_CHANNEL_TITLE, RESERVED_ORDERS_TITLE,
};
pub use user::User;
