//! The module contains the errors the ledger can return.
//!
//! The errors are:
//!
//! - [`Validation`] returned when caller-supplied data fails a field check.
//! - [`StoreWrite`] returned when the store rejects an insert, update or delete.
//! - [`NotFound`] returned when a caller requires an entry that does not exist.
//! - [`Database`] returned when reading from the store fails.
//!
//!  [`Validation`]: LedgerError::Validation
//!  [`StoreWrite`]: LedgerError::StoreWrite
//!  [`NotFound`]: LedgerError::NotFound
//!  [`Database`]: LedgerError::Database
use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Store write failed: {0}")]
    StoreWrite(#[source] DbErr),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::StoreWrite(a), Self::StoreWrite(b)) => a.to_string() == b.to_string(),
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
