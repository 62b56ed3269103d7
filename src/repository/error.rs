// ==========================================
// NCIP Registry Import - Repository error types
// ==========================================
// Denials are classified here, at the store boundary; callers match on
// PermissionDenied and never inspect message text
// Tooling: thiserror derive
// ==========================================

use rusqlite::ErrorCode;
use thiserror::Error;

/// Repository error type
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== Access errors =====
    #[error("permission denied on collection '{collection}': {message}")]
    PermissionDenied { collection: String, message: String },

    // ===== Database errors =====
    #[error("record not found: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("database connection failed: {0}")]
    DatabaseConnectionError(String),

    #[error("database lock acquisition failed: {0}")]
    LockError(String),

    #[error("database query failed: {0}")]
    DatabaseQueryError(String),

    // ===== Data errors =====
    #[error("document serialization failed: {0}")]
    SerializationError(String),

    // ===== Generic =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, RepositoryError::PermissionDenied { .. })
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref failure, ref msg)
                if matches!(
                    failure.code,
                    ErrorCode::ReadOnly | ErrorCode::AuthorizationForStatementDenied
                        | ErrorCode::PermissionDenied
                ) =>
            {
                RepositoryError::PermissionDenied {
                    collection: String::new(),
                    message: msg.clone().unwrap_or_else(|| failure.to_string()),
                }
            }
            rusqlite::Error::SqliteFailure(_, Some(msg)) => RepositoryError::DatabaseQueryError(msg),
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::SerializationError(err.to_string())
    }
}

/// Result alias
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readonly_failure_is_permission_denied() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_READONLY),
            Some("attempt to write a readonly database".to_string()),
        );
        let repo_err: RepositoryError = err.into();
        assert!(repo_err.is_permission_denied());
    }

    #[test]
    fn test_other_failures_are_not_denials() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_CONSTRAINT),
            Some("UNIQUE constraint failed".to_string()),
        );
        let repo_err: RepositoryError = err.into();
        assert!(!repo_err.is_permission_denied());
        assert!(matches!(repo_err, RepositoryError::DatabaseQueryError(_)));
    }
}
