//! Domain events

mod room_event;

pub use room_event::{MessageChange, MessageRemoval, RoomChange, RoomEvent};
