//! # Validation Module
//!
//! Input validation utilities for Orderly.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Service operation (Rust)                                     │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: field and line-item rules                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL / UNIQUE constraints                                     │
//! │  ├── CHECK (quantity >= 0)                                             │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use orderly_core::validation::{validate_email, validate_quantity};
//!
//! assert!(validate_email("ada@example.com").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{CustomerInput, LineItem, NewOrder, NewProduct, NewUser, OrderUpdate, ProductUpdate};
use crate::{MAX_LINE_ITEMS, MAX_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum password length for new accounts.
pub const MIN_PASSWORD_LENGTH: usize = 6;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required text field with a maximum length.
fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a person or company name field.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    validate_text(field, value, 100)
}

/// Validates a product name.
///
/// ## Example
/// ```rust
/// use orderly_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Widget").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_text("name", name, 200)
}

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty, at most 254 characters
/// - Exactly one `@` with a non-empty local part and a dotted domain
pub fn validate_email(email: &str) -> ValidationResult<()> {
    validate_text("email", email, 254)?;

    let email = email.trim();
    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@domain.tld".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a password for a new account.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

/// Validates an optional phone number.
///
/// ## Rules
/// - At most 30 characters
/// - Digits, spaces and `+ - ( )` only
pub fn validate_phone(phone: Option<&str>) -> ValidationResult<()> {
    let Some(phone) = phone.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(());
    };

    if phone.len() > 30 {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: 30,
        });
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, and + - ( )".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line-item or reservation quantity (1 to `MAX_QUANTITY`).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_QUANTITY,
        });
    }

    Ok(())
}

/// Validates stock on hand for a new product (zero allowed).
pub fn validate_stock(qty: i64) -> ValidationResult<()> {
    if !(0..=MAX_QUANTITY).contains(&qty) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_QUANTITY,
        });
    }

    Ok(())
}

/// Validates an amount in cents (zero allowed).
///
/// ## Example
/// ```rust
/// use orderly_core::validation::validate_cents;
///
/// assert!(validate_cents("price", 999).is_ok());
/// assert!(validate_cents("price", 0).is_ok());
/// assert!(validate_cents("price", -1).is_err());
/// ```
pub fn validate_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates the line items of an order.
///
/// ## Rules
/// - At least one, at most MAX_LINE_ITEMS (100)
/// - Every product reference present, every quantity positive
pub fn validate_line_items(items: &[LineItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "line_items".to_string(),
        });
    }

    if items.len() > MAX_LINE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "line_items".to_string(),
            min: 1,
            max: MAX_LINE_ITEMS as i64,
        });
    }

    for item in items {
        if item.product_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "product_id".to_string(),
            });
        }
        validate_quantity(item.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Input Validators
// =============================================================================

pub fn validate_new_user(input: &NewUser) -> ValidationResult<()> {
    validate_name("name", &input.name)?;
    validate_name("surname", &input.surname)?;
    validate_email(&input.email)?;
    validate_password(&input.password)
}

pub fn validate_new_product(input: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&input.name)?;
    validate_stock(input.quantity)?;
    validate_cents("price", input.price_cents)
}

pub fn validate_product_update(input: &ProductUpdate) -> ValidationResult<()> {
    validate_product_name(&input.name)?;
    validate_cents("price", input.price_cents)
}

pub fn validate_customer_input(input: &CustomerInput) -> ValidationResult<()> {
    validate_name("name", &input.name)?;
    validate_name("surname", &input.surname)?;
    validate_name("company", &input.company)?;
    validate_email(&input.email)?;
    validate_phone(input.phone.as_deref())
}

pub fn validate_new_order(input: &NewOrder) -> ValidationResult<()> {
    if input.customer_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "customer_id".to_string(),
        });
    }
    validate_line_items(&input.line_items)?;
    validate_cents("total", input.total_cents)
}

pub fn validate_order_update(input: &OrderUpdate) -> ValidationResult<()> {
    validate_line_items(&input.line_items)?;
    if let Some(total) = input.total_cents {
        validate_cents("total", total)?;
    }
    if let Some(customer_id) = &input.customer_id {
        if customer_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "customer_id".to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ada@example.com").is_ok());
        assert!(validate_email(" ada@example.com ").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("ada").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("ada@example").is_err());
        assert!(validate_email("ada@@example.com").is_err());
        assert!(validate_email("a da@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret1").is_ok());
        assert!(validate_password("").is_err());
        assert!(matches!(
            validate_password("abc"),
            Err(ValidationError::TooShort { min: 6, .. })
        ));
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone(None).is_ok());
        assert!(validate_phone(Some("")).is_ok());
        assert!(validate_phone(Some("+1 (555) 010-0199")).is_ok());
        assert!(validate_phone(Some("call me")).is_err());
    }

    #[test]
    fn test_validate_quantities() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());

        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(-1).is_err());
    }

    #[test]
    fn test_quantity_cap() {
        assert!(validate_quantity(MAX_QUANTITY).is_ok());
        assert!(matches!(
            validate_quantity(MAX_QUANTITY + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_quantity(i64::MAX).is_err());

        assert!(validate_stock(MAX_QUANTITY).is_ok());
        assert!(validate_stock(MAX_QUANTITY + 1).is_err());
        assert!(validate_line_items(&[LineItem::new("p-1", i64::MAX)]).is_err());
    }

    #[test]
    fn test_validate_line_items() {
        assert!(validate_line_items(&[LineItem::new("p-1", 2)]).is_ok());
        assert!(validate_line_items(&[]).is_err());
        assert!(validate_line_items(&[LineItem::new("p-1", 0)]).is_err());
        assert!(validate_line_items(&[LineItem::new(" ", 1)]).is_err());

        let too_many: Vec<LineItem> = (0..=MAX_LINE_ITEMS)
            .map(|i| LineItem::new(format!("p-{}", i), 1))
            .collect();
        assert!(validate_line_items(&too_many).is_err());
    }

    #[test]
    fn test_validate_new_product() {
        let widget = NewProduct {
            name: "Widget".to_string(),
            quantity: 5,
            price_cents: 999,
        };
        assert!(validate_new_product(&widget).is_ok());

        let negative = NewProduct {
            quantity: -1,
            ..widget.clone()
        };
        assert!(validate_new_product(&negative).is_err());

        let free = NewProduct {
            price_cents: 0,
            ..widget
        };
        assert!(validate_new_product(&free).is_ok());
    }

    #[test]
    fn test_validate_order_update_requires_line_items() {
        let update = OrderUpdate::default();
        assert!(matches!(
            validate_order_update(&update),
            Err(ValidationError::Required { .. })
        ));
    }
}
