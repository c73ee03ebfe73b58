/// Structured error types for crmctl-core.
///
/// Uses `thiserror` so the GraphQL layer can map each failure class onto
/// its own error code, while binaries can still wrap everything in `anyhow`.
use thiserror::Error;

use crate::models::ValidationError;

/// Query building failed (bad sort key, bad cursor)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Sort key names a field the entity does not have
    #[error("Unknown sort field '{field}' for {entity}")]
    UnknownSortField { entity: &'static str, field: String },

    /// Sort key is empty or only a direction marker
    #[error("Empty sort field for {entity}")]
    EmptySortField { entity: &'static str },
}

/// Store backend failure
#[derive(Error, Debug)]
pub enum StoreError {
    /// Unique constraint rejected a write
    #[error("unique constraint violated on {field}")]
    UniqueViolation { field: &'static str },

    /// Row expected but missing
    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// Unit of work was already finished
    #[error("unit of work already closed")]
    Closed,

    /// Backend-specific failure (SQL, connection, ...)
    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wrap any backend error
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}

/// Main error type for crmctl-core operations
#[derive(Error, Debug)]
pub enum CrmError {
    /// Input rejected by a validation rule
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// List query could not be built
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Storage failed
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for CrmError {
    fn from(err: StoreError) -> Self {
        match err {
            // A unique email that slipped past the pre-insert check (concurrent
            // insert) is still a duplicate from the caller's point of view.
            StoreError::UniqueViolation { field: "email" } => {
                Self::Validation(ValidationError::DuplicateEmail)
            }
            other => Self::Store(other),
        }
    }
}

/// Result type alias for crmctl-core operations
pub type Result<T> = std::result::Result<T, CrmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error_display() {
        let err = QueryError::UnknownSortField {
            entity: "customer",
            field: "shoe_size".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown sort field 'shoe_size' for customer"
        );
    }

    #[test]
    fn test_email_unique_violation_becomes_validation() {
        let err: CrmError = StoreError::UniqueViolation { field: "email" }.into();
        assert!(matches!(
            err,
            CrmError::Validation(ValidationError::DuplicateEmail)
        ));
        assert_eq!(err.to_string(), "Email already exists.");
    }

    #[test]
    fn test_other_store_errors_pass_through() {
        let err: CrmError = StoreError::Closed.into();
        assert!(matches!(err, CrmError::Store(StoreError::Closed)));
    }
}
