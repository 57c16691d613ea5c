//! # orderly-db: Database Layer for Orderly
//!
//! This crate provides database access for the Orderly order-management
//! service. It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Orderly Data Flow                                │
//! │                                                                         │
//! │  Service operation (createOrder)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     orderly-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ UserRepo      │    │ 001_init.sql │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo   │    │ 002_fts.sql  │  │   │
//! │  │   │ Transactions  │    │ CustomerRepo  │    │              │  │   │
//! │  │   │               │    │ OrderRepo     │    │              │  │   │
//! │  │   │               │    │ ReportRepo    │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database (orderly.db)                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use orderly_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("orderly.db")).await?;
//!
//! let products = db.products().search("widget", 10).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, DbTransaction};

pub use repository::customer::CustomerRepository;
pub use repository::order::{OrderRecord, OrderRepository};
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;
pub use repository::user::{UserRecord, UserRepository};
pub use repository::generate_id;
