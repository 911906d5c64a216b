//! Error handling utilities for repositories

use bazaar_core::error::DomainError;
use sqlx::Error as SqlxError;
use uuid::Uuid;

/// `lock_not_available`, raised when `lock_timeout` expires
const LOCK_NOT_AVAILABLE: &str = "55P03";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

/// Convert SQLx error to DomainError
///
/// Lock timeouts, serialization failures, and deadlocks become
/// `Contended` so callers can retry the whole operation.
pub fn map_db_error(e: SqlxError) -> DomainError {
    if is_contention(&e) {
        return DomainError::Contended;
    }
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    map_db_error(e)
}

fn is_contention(e: &SqlxError) -> bool {
    e.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| matches!(code.as_ref(), LOCK_NOT_AVAILABLE | SERIALIZATION_FAILURE | DEADLOCK_DETECTED))
}

/// Create a "room not found" error
pub fn room_not_found(id: Uuid) -> DomainError {
    DomainError::RoomNotFound(id)
}

/// Create a "message not found" error
pub fn message_not_found(id: Uuid) -> DomainError {
    DomainError::MessageNotFound(id)
}

/// Create a "catalog item not found" error
pub fn item_not_found(id: Uuid) -> DomainError {
    DomainError::CatalogItemNotFound(id)
}

/// Create a "user not found" error
pub fn user_not_found(id: Uuid) -> DomainError {
    DomainError::UserNotFound(id)
}
