//! Handler error types

use crate::protocol::CloseCode;
use bazaar_common::AppError;
use bazaar_core::DomainError;
use thiserror::Error;

/// Handler error type
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Payload did not match the op code
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Service error: {0}")]
    ServiceError(#[from] bazaar_service::ServiceError),

    /// Domain error (from repositories)
    #[error("Domain error: {0}")]
    DomainError(#[from] DomainError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AppError> for HandlerError {
    fn from(err: AppError) -> Self {
        Self::AuthenticationFailed(err.to_string())
    }
}

impl HandlerError {
    /// Close code the session ends with
    pub fn to_close_code(&self) -> CloseCode {
        match self {
            Self::InvalidPayload(_) => CloseCode::DecodeError,
            Self::AuthenticationFailed(_) => CloseCode::AuthenticationFailed,
            Self::NotAuthenticated => CloseCode::NotAuthenticated,
            Self::ServiceError(_) | Self::DomainError(_) | Self::Internal(_) => CloseCode::UnknownError,
        }
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_codes() {
        assert_eq!(
            HandlerError::InvalidPayload("x".into()).to_close_code(),
            CloseCode::DecodeError
        );
        assert_eq!(
            HandlerError::AuthenticationFailed("expired".into()).to_close_code(),
            CloseCode::AuthenticationFailed
        );
        assert_eq!(HandlerError::NotAuthenticated.to_close_code(), CloseCode::NotAuthenticated);
        assert_eq!(
            HandlerError::Internal("boom".into()).to_close_code(),
            CloseCode::UnknownError
        );
    }

    #[test]
    fn test_app_error_is_auth_failure() {
        let err: HandlerError = AppError::InvalidToken.into();
        assert!(matches!(err, HandlerError::AuthenticationFailed(_)));
    }
}
