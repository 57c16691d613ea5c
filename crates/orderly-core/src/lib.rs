//! # orderly-core: Pure Business Logic for Orderly
//!
//! This crate holds the domain model of the order-management backend and
//! every rule that can be checked without touching the database.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Orderly Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    orderly-api (services)                       │   │
//! │  │  UserService, ProductService, CustomerService, OrderService     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ orderly-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ ownership │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  guard    │  │   rules   │  │   │
//! │  │   │   Order   │  │           │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐                                                │   │
//! │  │   │   stock   │  line-item diffing for order updates           │   │
//! │  │   └───────────┘                                                │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    orderly-db (Database Layer)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Product, Customer, Order, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//! - [`ownership`] - Seller ownership guard
//! - [`stock`] - Stock deltas between two sets of line items

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod ownership;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use ownership::{ensure_owned, SellerOwned};
pub use stock::{stock_deltas, StockDelta};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of line items in a single order.
pub const MAX_LINE_ITEMS: usize = 100;

/// Largest quantity accepted for a line item, a reservation or a product's
/// initial stock.
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// Maximum number of products returned by a free-text search.
pub const SEARCH_RESULT_LIMIT: u32 = 10;

/// Number of entries in the best-customers report.
pub const BEST_CUSTOMERS_LIMIT: u32 = 10;

/// Number of entries in the best-sellers report.
pub const BEST_SELLERS_LIMIT: u32 = 3;
