use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Repository error: {0}")]
    Repository(RepositoryError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("User failed validation:\n\t- {}", .0.join("\n\t- "))]
    ValidationFailed(Vec<String>),

    #[error("Duplicate key violates unique constraint \"{0}\"")]
    DuplicateKey(String),

    #[error("Not found")]
    NotFound,

    #[error("Failed to encode password: {0}")]
    Credential(String),
}

impl From<RepositoryError> for DomainError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => DomainError::NotFound,
            RepositoryError::DuplicateKey { constraint } => DomainError::DuplicateKey(constraint),
            other => DomainError::Repository(other),
        }
    }
}

/// Typed outcome of a store call. The adapter maps raw driver errors into
/// these variants before anything above it sees them.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Not found")]
    NotFound,

    #[error("Duplicate key value violates unique constraint \"{constraint}\"")]
    DuplicateKey { constraint: String },

    #[error("Database error: {0}")]
    DatabaseError(String),
}
