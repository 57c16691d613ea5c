//! Service implementations.
//!
//! Every service holds a clone of the [`AppContext`](crate::AppContext).
//! Seller-scoped operations take the verified [`Identity`](orderly_core::Identity)
//! of the caller as their first argument.

pub mod customer_service;
pub mod health_service;
pub mod order_service;
pub mod product_service;
pub mod report_service;
pub mod user_service;

pub use customer_service::CustomerService;
pub use health_service::{HealthService, HealthStatus};
pub use order_service::OrderService;
pub use product_service::ProductService;
pub use report_service::ReportService;
pub use user_service::UserService;
