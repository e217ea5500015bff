use thiserror::Error;

use pantry_core::DomainError;

use crate::remote::{RemoteError, Table};

pub type PantryResult<T> = Result<T, PantryError>;

/// A remote row that could not be turned into a typed record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed {table} row: {message}")]
pub struct DecodeError {
    pub table: Table,
    pub message: String,
}

impl DecodeError {
    pub fn new(table: Table, message: impl Into<String>) -> Self {
        Self {
            table,
            message: message.into(),
        }
    }
}

/// Everything a session operation can fail with.
///
/// None of these are retried: the caller reports them and the user re-invokes
/// the action.
#[derive(Debug, Error)]
pub enum PantryError {
    /// Rejected before any remote call.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("remote store operation failed: {0}")]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
