//! # Error Types
//!
//! Domain-specific error types for orderly-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  orderly-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  orderly-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  orderly-api errors                                                    │
//! │  └── ApiError         - What callers see (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError ← DbError                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These are request-scoped failures: each one is returned to the caller as
/// the result of the operation and never retried.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A record with the same unique key already exists.
    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: String, key: String },

    /// The referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The record exists but belongs to another seller.
    ///
    /// ## User Workflow
    /// ```text
    /// Seller A: get_customer("c-42")
    ///      │
    ///      ▼
    /// customer.seller_id == "seller-b"
    ///      │
    ///      ▼
    /// AccessDenied { entity: "Customer", id: "c-42" }
    /// ```
    #[error("Access denied to {entity} {id}")]
    AccessDenied { entity: String, id: String },

    /// Email/password pair did not match.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Bearer token was malformed, expired or badly signed.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Not enough stock on hand to reserve the requested quantity.
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates an AccessDenied error for a given entity type and ID.
    pub fn access_denied(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::AccessDenied {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates an AlreadyExists error.
    pub fn already_exists(entity: impl Into<String>, key: impl Into<String>) -> Self {
        CoreError::AlreadyExists {
            entity: entity.into(),
            key: key.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before any store is touched.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Widget".to_string(),
            available: 2,
            requested: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Widget: available 2, requested 3"
        );

        let err = CoreError::access_denied("Customer", "c-1");
        assert_eq!(err.to_string(), "Access denied to Customer c-1");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "email".to_string(),
        };
        assert_eq!(err.to_string(), "email is required");

        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        };
        assert_eq!(err.to_string(), "password must be at least 6 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
