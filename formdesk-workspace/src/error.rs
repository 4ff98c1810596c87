use sqlx::error::ErrorKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WorkspaceError>;

/// Faults returned by workspace operations.
///
/// Storage errors are classified when they cross the store boundary, so the
/// service and its callers only ever match on these variants.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Workspace not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkspaceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, WorkspaceError::NotFound(_))
    }
}

impl From<sqlx::Error> for WorkspaceError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => WorkspaceError::NotFound("no matching row".to_string()),
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                    WorkspaceError::Validation(db_err.message().to_string())
                }
                _ => WorkspaceError::Database(db_err.message().to_string()),
            },
            _ => WorkspaceError::Database(err.to_string()),
        }
    }
}
