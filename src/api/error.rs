// ==========================================
// NCIP Registry Import - API error types
// ==========================================
// Role: turn layer errors into messages a user can act on
// ==========================================

use crate::domain::ReconcileSummary;
use crate::importer::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    // ===== Input =====
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    // ===== Import runs =====
    #[error("file import failed: {0}")]
    ImportError(String),

    /// Reconciliation stopped; `message` is the run's summary message.
    #[error("{message}")]
    ImportFailed {
        message: String,
        partial: bool,
        summary: Option<ReconcileSummary>,
    },

    // ===== Data access =====
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("database error: {0}")]
    DatabaseError(String),

    #[error("database connection failed: {0}")]
    DatabaseConnectionError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    // ===== Generic =====
    #[error("internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::PermissionDenied {
                collection,
                message,
            } => ApiError::PermissionDenied(format!("{} ({})", message, collection)),
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={}) does not exist", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("database lock unavailable: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::SerializationError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::ImportError(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_errors_map_to_api_errors() {
        let denied = RepositoryError::PermissionDenied {
            collection: "import_x".to_string(),
            message: "insufficient permissions".to_string(),
        };
        assert!(matches!(ApiError::from(denied), ApiError::PermissionDenied(msg) if msg.contains("import_x")));

        let missing = RepositoryError::NotFound {
            entity: "record".to_string(),
            id: "r1".to_string(),
        };
        assert!(matches!(ApiError::from(missing), ApiError::NotFound(_)));
    }

    #[test]
    fn test_import_failed_displays_message_only() {
        let err = ApiError::ImportFailed {
            message: "Import failed: disk full".to_string(),
            partial: false,
            summary: None,
        };
        assert_eq!(err.to_string(), "Import failed: disk full");
    }
}
