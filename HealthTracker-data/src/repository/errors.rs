use std::sync::PoisonError;
use thiserror::Error;
use crate::database::DatabaseError;

/// Error type for repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
    
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    
    /// Connection pool error
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    
    /// Unique constraint violated
    #[error("Conflict: {0}")]
    Conflict(String),
    
    /// Not found error
    #[error("Record not found: {0}")]
    NotFound(String),
    
    /// Mutex lock error
    #[error("Mutex lock error: {0}")]
    MutexLock(String),
}

impl<T> From<PoisonError<T>> for RepositoryError {
    fn from(error: PoisonError<T>) -> Self {
        RepositoryError::MutexLock(error.to_string())
    }
}

impl From<String> for RepositoryError {
    fn from(error: String) -> Self {
        if error.contains("validation") || error.contains("invalid") {
            RepositoryError::Validation(error)
        } else {
            RepositoryError::Database(DatabaseError::GenericError(error))
        }
    }
}

impl RepositoryError {
    /// Map a SQLite error, turning UNIQUE violations into [`RepositoryError::Conflict`]
    pub fn from_insert(error: rusqlite::Error, what: &str) -> Self {
        match &error {
            rusqlite::Error::SqliteFailure(code, _)
                if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                RepositoryError::Conflict(format!("{} already exists", what))
            }
            _ => RepositoryError::Sqlite(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_errors_are_classified() {
        assert!(matches!(RepositoryError::from("invalid date".to_string()), RepositoryError::Validation(_)));
        assert!(matches!(RepositoryError::from("disk full".to_string()), RepositoryError::Database(_)));
    }
}
