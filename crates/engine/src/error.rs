//! The module contains the errors the engine can throw.
//!
//! Split validation errors ([`InvalidSplit`], [`SplitMismatch`]) are the only
//! ones surfaced synchronously to the member editing an expense. Everything
//! the depletion sweeper runs into (contention, a deleted meal, an empty
//! shelf) is reported through the sweep report instead, never as an error.
//!
//! [`InvalidSplit`]: EngineError::InvalidSplit
//! [`SplitMismatch`]: EngineError::SplitMismatch
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid split: {0}")]
    InvalidSplit(String),
    #[error("Split mismatch: {0}")]
    SplitMismatch(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid slot: {0}")]
    InvalidSlot(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidSplit(a), Self::InvalidSplit(b)) => a == b,
            (Self::SplitMismatch(a), Self::SplitMismatch(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidSlot(a), Self::InvalidSlot(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
