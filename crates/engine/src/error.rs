//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`NotFound`] thrown when a referenced name or id does not resolve.
//! - [`ExistingKey`] thrown when a unique key is already taken.
//!
//! Store-level constraint violations surface through [`Database`] untouched;
//! the presentation layer is expected to catch and display them.
//!
//!  [`NotFound`]: EngineError::NotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`Database`]: EngineError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid name: {0}")]
    InvalidName(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
