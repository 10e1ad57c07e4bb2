// ================================================================
// File: coupon-common/src/error.rs
// ================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Cooldown or transport throttle triggered. `retry_after_secs` is the
    /// remaining wait when it is known.
    #[error("{message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },

    #[error("No coupons available.")]
    PoolExhausted,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("Not found error: {0}")]
    NotFound(String),

    /// The conditional coupon write kept losing to concurrent writers.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn rate_limited(message: impl Into<String>, retry_after_secs: Option<u64>) -> Self {
        Error::RateLimited {
            message: message.into(),
            retry_after_secs,
        }
    }

    /// True for errors that come from the backing store or the process itself
    /// rather than from the caller's request.
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            Error::Database(_)
                | Error::Migration(_)
                | Error::Io(_)
                | Error::Json(_)
                | Error::Config(_)
                | Error::Internal(_)
        )
    }

    /// Postgres unique_violation (23505), used to turn insert races into `AlreadyExists`.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => {
                db_err.code().as_deref() == Some("23505")
            }
            _ => false,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Internal(e.to_string())
    }
}

impl From<uuid::Error> for Error {
    fn from(err: uuid::Error) -> Self {
        Error::InvalidInput(format!("invalid id: {}", err))
    }
}
