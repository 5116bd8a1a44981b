use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("migration error: {0}")]
    Migration(String),
}

impl DatabaseError {
    /// Classify a driver error, keeping unique violations distinguishable from other failures.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DatabaseError::UniqueViolation(db_err.message().to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                DatabaseError::Connection(err.to_string())
            }
            _ => DatabaseError::Query(err.to_string()),
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DatabaseError::UniqueViolation(_))
    }
}

#[async_trait]
pub trait Database: Send + Sync {
    async fn execute(&self, query: &str) -> Result<u64, DatabaseError>;
}
