//! Store Errors
//!
//! Error types for persistence operations.

/// Constraint guarding global uniqueness of certificate numbers
pub const CERTIFICATE_NUMBER_CONSTRAINT: &str = "certificates_certificate_number_key";

/// Errors that can occur in the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// Serialization failure or deadlock reported by the database
    #[error("Concurrent write conflict: {0}")]
    Conflict(String),

    /// Referenced row does not exist
    #[error("{entity} not found: {id}")]
    MissingReference { entity: &'static str, id: uuid::Uuid },

    /// Database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Notification sink refused the write
    #[error("Notification sink unavailable: {0}")]
    SinkUnavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return StoreError::UniqueViolation {
                    constraint: db_err.constraint().unwrap_or_default().to_string(),
                };
            }
            // serialization_failure, deadlock_detected
            if matches!(db_err.code().as_deref(), Some("40001") | Some("40P01")) {
                return StoreError::Conflict(db_err.message().to_string());
            }
        }
        StoreError::Database(err)
    }
}

impl StoreError {
    /// Check if this error is a certificate number collision
    pub fn is_certificate_number_collision(&self) -> bool {
        matches!(
            self,
            StoreError::UniqueViolation { constraint } if constraint == CERTIFICATE_NUMBER_CONSTRAINT
        )
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

/// Store-wide Result type
pub type StoreResult<T> = Result<T, StoreError>;
