//! Errors raised by [`SqliteStore`](crate::SqliteStore).

pub type Result<T> = core::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Connecting, querying or committing failed.
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// A stored `IsPrime` column held something other than `0` or `1`.
    #[error("Invalid IsPrime flag {flag} for value {value}")]
    InvalidFlag { value: i32, flag: i32 },
}
