//! # API Error Type
//!
//! Unified error type for every service operation.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Orderly                                │
//! │                                                                         │
//! │  Service operation (createOrder)                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Validation Error? ── ValidationError ───────────┐              │  │
//! │  │         │                                        │              │  │
//! │  │         ▼                                        ▼              │  │
//! │  │  Ownership Error? ─── CoreError::AccessDenied ── ApiError ─────►│  │
//! │  │         │                                        ▲              │  │
//! │  │         ▼                                        │              │  │
//! │  │  Database Error? ──── DbError::InsufficientStock ┘              │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "INSUFFICIENT_STOCK",                                        │
//! │    "message": "Insufficient stock for Widget: available 2, ..." }      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Unexpected persistence failures are logged here and reach the caller as
//! a generic `INTERNAL` message.

use orderly_core::{CoreError, ValidationError};
use orderly_db::DbError;
use serde::Serialize;

/// API error returned from service operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Order not found: 7f9c..."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unique key (email) already taken
    AlreadyExists,

    /// Resource not found
    NotFound,

    /// Record belongs to another seller
    AccessDenied,

    /// Email/password mismatch
    InvalidCredentials,

    /// Missing, malformed, expired or forged token
    InvalidToken,

    /// Not enough stock on hand
    InsufficientStock,

    /// Input validation failed
    InvalidInput,

    /// Internal server error
    Internal,
}

/// Result type for service operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates an access denied error.
    pub fn access_denied(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::AccessDenied,
            format!("Access denied to {} {}", resource, id),
        )
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidInput, message)
    }

    /// Creates an invalid token error.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidToken, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::AlreadyExists,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                ApiError::invalid_input("Record is still referenced by an order")
            }
            DbError::InsufficientStock {
                product,
                available,
                requested,
            } => ApiError::new(
                ErrorCode::InsufficientStock,
                format!(
                    "Insufficient stock for {}: available {}, requested {}",
                    product, available, requested
                ),
            ),
            DbError::StockOverflow {
                product,
                on_hand,
                released,
            } => ApiError::invalid_input(format!(
                "Cannot release {} units of {}: {} already on hand",
                released, product, on_hand
            )),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::internal("Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::internal("Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::internal("Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::internal("Database transaction failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::internal("Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::internal("Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AlreadyExists { .. } => ApiError::new(ErrorCode::AlreadyExists, err.to_string()),
            CoreError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            CoreError::AccessDenied { entity, id } => ApiError::access_denied(&entity, &id),
            CoreError::InvalidCredentials => {
                ApiError::new(ErrorCode::InvalidCredentials, "Invalid credentials")
            }
            CoreError::InvalidToken(reason) => {
                ApiError::invalid_token(format!("Invalid token: {}", reason))
            }
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::Validation(e) => ApiError::from(e),
        }
    }
}

/// Converts validation errors to API errors.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::invalid_input(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_mapping() {
        let err = ApiError::from(DbError::InsufficientStock {
            product: "Widget".to_string(),
            available: 2,
            requested: 3,
        });
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(
            err.message,
            "Insufficient stock for Widget: available 2, requested 3"
        );

        assert_eq!(
            ApiError::from(DbError::duplicate("users.email", "ada@example.com")).code,
            ErrorCode::AlreadyExists
        );
        assert_eq!(
            ApiError::from(DbError::ForeignKeyViolation {
                message: "FOREIGN KEY constraint failed".to_string()
            })
            .code,
            ErrorCode::InvalidInput
        );

        let err = ApiError::from(DbError::StockOverflow {
            product: "Widget".to_string(),
            on_hand: 5,
            released: i64::MAX,
        });
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(err.message.contains("Widget"));
    }

    #[test]
    fn test_internal_errors_are_generic() {
        let err = ApiError::from(DbError::QueryFailed("no such table: orders".to_string()));
        assert_eq!(err.code, ErrorCode::Internal);
        assert!(!err.message.contains("orders"));
    }

    #[test]
    fn test_core_error_mapping() {
        assert_eq!(
            ApiError::from(CoreError::access_denied("Order", "o-1")).code,
            ErrorCode::AccessDenied
        );
        assert_eq!(
            ApiError::from(CoreError::InvalidCredentials).code,
            ErrorCode::InvalidCredentials
        );
        assert_eq!(
            ApiError::from(CoreError::Validation(ValidationError::Required {
                field: "email".to_string()
            }))
            .code,
            ErrorCode::InvalidInput
        );
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::not_found("Product", "p-1")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Product not found: p-1");
    }
}
