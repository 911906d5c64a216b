//! Repository traits (ports)

mod repositories;

pub use repositories::{
    BlacklistChange, CartCancellation, CartRepository, CartUpdate, CatalogRepository, ChannelStats,
    DispatchedOrder, MemberRepository, MessageQuery, MessageRepository, Placement, PlacementTarget,
    PublishSelection, PublishedEntry, Reconciled, RepoResult, ReservationRepository, RoomListing, RoomRepository,
    Submission, SystemRoomRepository, UserRepository,
};
