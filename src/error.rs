//! Error types for the ledger engine

use thiserror::Error;

/// Result type for engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Engine errors
///
/// Every variant maps to a distinct user-visible failure category so the
/// command layer can render an accurate explanation. Only `TransientStore`
/// is retryable; the store retries it internally before surfacing it.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Account, trade, or game absent — or already resolved by a concurrent call
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Duplicate account creation
    #[error("account already exists")]
    AlreadyExists,

    /// Non-positive amount, out-of-bounds bet, self-targeting, etc.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Balance would drop below zero
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Heist attempted inside the cooldown window
    #[error("cooldown active, {remaining_secs}s remaining")]
    CooldownActive { remaining_secs: i64 },

    /// Retryable store failure (busy/locked), surfaced after bounded retries
    #[error("transient store error: {0}")]
    TransientStore(String),

    /// Non-retryable store failure (schema/constraint violation, corruption)
    #[error("store error: {0}")]
    Fatal(String),
}

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ffi::ErrorCode;

        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if matches!(
                    e.code,
                    ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
                ) =>
            {
                EngineError::TransientStore(err.to_string())
            }
            _ => EngineError::Fatal(err.to_string()),
        }
    }
}

impl EngineError {
    /// True for failures worth retrying with backoff
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::TransientStore(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_maps_to_transient() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            Some("database is locked".into()),
        );
        let mapped: EngineError = err.into();
        assert!(mapped.is_transient());
    }

    #[test]
    fn test_other_sqlite_errors_are_fatal() {
        let mapped: EngineError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(mapped, EngineError::Fatal(_)));
        assert!(!mapped.is_transient());
    }
}
