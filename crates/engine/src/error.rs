//! The module contains the errors the engine can return.
//!
//! Every operation fails independently per request; nothing is retried
//! internally. [`ConcurrentModification`] is the one kind callers are
//! expected to retry.
//!
//! [`ConcurrentModification`]: EngineError::ConcurrentModification
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("member \"{0}\" not found")]
    MemberNotFound(String),
    #[error("\"{0}\" not found")]
    KeyNotFound(String),
    #[error("\"{0}\" already present")]
    ExistingKey(String),
    #[error("invalid purchase order: {0}")]
    InvalidPurchaseOrder(String),
    #[error("invalid state transition: {0}")]
    InvalidStateTransition(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("member \"{0}\" was modified concurrently, retry the operation")]
    ConcurrentModification(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::MemberNotFound(a), Self::MemberNotFound(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidPurchaseOrder(a), Self::InvalidPurchaseOrder(b)) => a == b,
            (Self::InvalidStateTransition(a), Self::InvalidStateTransition(b)) => a == b,
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::ConcurrentModification(a), Self::ConcurrentModification(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
