//! Value objects - small immutable domain types

mod role;

pub use role::{Identity, MemberRole, Role};
