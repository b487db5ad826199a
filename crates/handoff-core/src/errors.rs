use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid username")]
    InvalidUsername,

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Cipher exceeds payload limit")]
    PayloadTooLarge,

    #[error("authSecret mismatch")]
    AuthSecretMismatch,

    #[error("Admin privileges required")]
    AdminRequired,

    #[error("Admin not allowed")]
    AdminNotAllowed,

    #[error("Not the session owner")]
    NotSessionOwner,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Recipient not found: {0}")]
    RecipientNotFound(String),

    #[error("Share not found")]
    ShareNotFound,

    #[error("Share already consumed")]
    ShareConsumed,

    #[error("Token already registered")]
    TokenExists,

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Session expired")]
    SessionExpired,

    #[error("Session payload unavailable")]
    SessionCipherMissing,

    #[error("Storage error: {0}")]
    Storage(#[from] handoff_storage::StorageError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
