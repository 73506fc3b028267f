//! Database error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("query error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::Serialization(e.to_string())
    }
}

impl From<DbError> for mpesa_types::MpesaError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound(what) => mpesa_types::MpesaError::NotFound(what),
            other => mpesa_types::MpesaError::Internal(other.to_string()),
        }
    }
}

pub type DbResult<T> = Result<T, DbError>;
