//! The module contains the errors the ledger can return.
//!
//! The taxonomy:
//!
//! - [`InvalidArgument`] rejected before any storage access.
//! - [`NotFound`] an account (or another row) does not exist.
//! - [`ConstraintViolation`] a storage-level invariant refused a write.
//! - [`Internal`] storage or connectivity failure, lock-wait timeout or
//!   cancellation. `retryable` tells whether the same call may succeed later.
//!
//! Raw driver errors never leave the crate: every [`DbErr`] is classified by
//! [`crate::constraints`] through the `From` impl below.
//!
//!  [`InvalidArgument`]: LedgerError::InvalidArgument
//!  [`NotFound`]: LedgerError::NotFound
//!  [`ConstraintViolation`]: LedgerError::ConstraintViolation
//!  [`Internal`]: LedgerError::Internal
use sea_orm::DbErr;
use thiserror::Error;

/// Ledger errors.
#[derive(Error, Debug, Clone)]
pub enum LedgerError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("Internal error: {message}")]
    Internal { message: String, retryable: bool },
}

impl LedgerError {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            retryable: false,
        }
    }

    pub(crate) fn retryable(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            retryable: true,
        }
    }

    /// Whether repeating the same call may succeed.
    ///
    /// Only contention-related failures (lock-wait timeouts, serialization
    /// failures, expired deadlines) are retryable. The ledger never retries on
    /// its own.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Internal {
                retryable: true,
                ..
            }
        )
    }
}

impl From<DbErr> for LedgerError {
    fn from(err: DbErr) -> Self {
        crate::constraints::classify(&err)
    }
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidArgument(a), Self::InvalidArgument(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::ConstraintViolation(a), Self::ConstraintViolation(b)) => a == b,
            (
                Self::Internal {
                    message: a,
                    retryable: ra,
                },
                Self::Internal {
                    message: b,
                    retryable: rb,
                },
            ) => a == b && ra == rb,
            _ => false,
        }
    }
}
