//! # Domain Types
//!
//! Core domain types used throughout Orderly.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   User (seller) │   │    Customer     │   │    Product      │       │
//! │  │  ─────────────  │◄──│  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  seller_id (FK) │   │  quantity ≥ 0   │       │
//! │  │  email (unique) │   │  email (unique) │   │  price_cents    │       │
//! │  └────────▲────────┘   └────────▲────────┘   └────────▲────────┘       │
//! │           │                     │                     │                 │
//! │           │            ┌────────┴────────┐            │                 │
//! │           └────────────│      Order      │────────────┘                 │
//! │                        │  ─────────────  │   line_items: [(product,     │
//! │                        │  seller_id      │                 quantity)]   │
//! │                        │  customer_id    │                              │
//! │                        │  state          │   PENDING|COMPLETED|CANCELED │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity has an opaque `id` (UUID v4 string) assigned by the server,
//! and a server-assigned `created_at`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// User (seller)
// =============================================================================

/// A seller account.
///
/// The password hash lives only in the storage record; this type is what
/// every read returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct User {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Input for seller signup.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
}

/// The acting seller, as decoded from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub email: String,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Identity {
            id: user.id.clone(),
            name: user.name.clone(),
            surname: user.surname.clone(),
            email: user.email.clone(),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub name: String,

    /// Quantity on hand. Only stock reservations change it.
    pub quantity: i64,

    /// Unit price in cents.
    pub price_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks if the stock on hand covers `quantity`.
    pub fn can_reserve(&self, quantity: i64) -> bool {
        quantity <= self.quantity
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub quantity: i64,
    pub price_cents: i64,
}

/// Editable product fields. Stock is not among them.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductUpdate {
    pub name: String,
    pub price_cents: i64,
}

// =============================================================================
// Customer
// =============================================================================

/// A customer, owned by exactly one seller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub company: String,
    pub email: String,
    pub phone: Option<String>,

    /// Owning seller. Immutable after creation.
    pub seller_id: String,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or updating a customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerInput {
    pub name: String,
    pub surname: String,
    pub company: String,
    pub email: String,
    pub phone: Option<String>,
}

/// A customer joined with its seller record.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerDetails {
    pub customer: Customer,
    pub seller: Option<User>,
}

// =============================================================================
// Order State
// =============================================================================

/// Lifecycle state of an order.
///
/// Transitions are set by the client; nothing beyond the default is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderState {
    /// Placed, stock reserved.
    Pending,
    /// Fulfilled. Counted by the reports.
    Completed,
    /// Cancelled by the seller.
    Canceled,
}

impl Default for OrderState {
    fn default() -> Self {
        OrderState::Pending
    }
}

// =============================================================================
// Order
// =============================================================================

/// A (product, quantity) pair within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct LineItem {
    pub product_id: String,
    pub quantity: i64,
}

impl LineItem {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        LineItem {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// An order placed by a seller for one of their customers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,

    /// Line items in the order they were submitted.
    pub line_items: Vec<LineItem>,

    /// Order total in cents, as submitted by the client.
    pub total_cents: i64,

    pub customer_id: String,

    /// Seller that placed the order. Immutable after creation.
    pub seller_id: String,

    pub state: OrderState,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Input for placing an order. New orders always start `PENDING`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewOrder {
    pub line_items: Vec<LineItem>,
    pub total_cents: i64,
    pub customer_id: String,
}

/// Input for updating an order.
///
/// `line_items` replaces the current line items and must not be empty;
/// omitted optional fields keep their current values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderUpdate {
    pub line_items: Vec<LineItem>,
    pub total_cents: Option<i64>,
    pub customer_id: Option<String>,
    pub state: Option<OrderState>,
}

// =============================================================================
// Population
// =============================================================================

/// Which references a read should resolve.
///
/// ## Usage
/// ```rust
/// use orderly_core::Populate;
///
/// // Plain record, no joins
/// let bare = Populate::NONE;
/// assert!(!bare.customer);
///
/// // Customer, seller and every product
/// let full = Populate::ALL;
/// assert!(full.products);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Populate {
    pub customer: bool,
    pub seller: bool,
    pub products: bool,
}

impl Populate {
    pub const NONE: Populate = Populate {
        customer: false,
        seller: false,
        products: false,
    };

    pub const ALL: Populate = Populate {
        customer: true,
        seller: true,
        products: true,
    };
}

/// A line item joined with its product record.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PopulatedLineItem {
    pub product: Product,
    pub quantity: i64,
}

/// An order with the references requested through [`Populate`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDetails {
    pub order: Order,
    pub customer: Option<Customer>,
    pub seller: Option<User>,
    pub products: Vec<PopulatedLineItem>,
}

// =============================================================================
// Reports
// =============================================================================

/// One row of the best-customers report.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BestCustomer {
    /// Sum of COMPLETED order totals, in cents.
    pub total_cents: i64,
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub customer: Customer,
}

impl BestCustomer {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// One row of the best-sellers report.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct BestSeller {
    /// Sum of COMPLETED order totals, in cents.
    pub total_cents: i64,
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub seller: User,
}

impl BestSeller {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
