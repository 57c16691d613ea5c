//! # Orderly API
//!
//! Typed service operations for the Orderly order-management backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Orderly Services                                │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  UserService   │  │ ProductService │  │  CustomerService           ││
//! │  │                │  │                │  │                            ││
//! │  │ • createIdent. │  │ • create/get   │  │ • create/get               ││
//! │  │ • authenticate │  │ • update/delete│  │ • update/delete            ││
//! │  │ • verifyToken  │  │ • search       │  │ • listBySeller             ││
//! │  │ • currentUser  │  │ • reserve      │  │ • listAll                  ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────┐            │
//! │  │  OrderService  │  │ ReportService  │  │ HealthService  │            │
//! │  │                │  │                │  │                │            │
//! │  │ • createOrder  │  │ • bestCustomers│  │ • check        │            │
//! │  │ • updateOrder  │  │ • bestSellers  │  │                │            │
//! │  │ • deleteOrder  │  │                │  │                │            │
//! │  └────────────────┘  └────────────────┘  └────────────────┘            │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      AppContext                                   │  │
//! │  │   AppConfig  •  Database (SqlitePool)  •  JwtManager              │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let ctx = AppContext::init(AppConfig::load()?).await?;
//!
//! let token = ctx.users().authenticate("ada@example.com", "secret").await?;
//! let seller = ctx.users().authorize(&format!("Bearer {token}"))?;
//! let order = ctx.orders().create_order(&seller, input).await?;
//!
//! ctx.shutdown().await;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod services;

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use orderly_db::{Database, DbConfig};

use crate::auth::JwtManager;
use crate::services::{
    CustomerService, HealthService, OrderService, ProductService, ReportService, UserService,
};

// Re-exports
pub use config::{AppConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};

/// Shared application state, built once at startup.
///
/// Cloning is cheap; every clone shares the pool and token manager.
#[derive(Clone)]
pub struct AppContext {
    config: AppConfig,
    db: Database,
    jwt: Arc<JwtManager>,
}

impl AppContext {
    /// Connects the database, runs migrations and prepares token signing.
    pub async fn init(config: AppConfig) -> ApiResult<Self> {
        if config.uses_dev_secret() {
            warn!("JWT_SECRET not set, using the development secret");
        }

        let db_config = if config.is_in_memory() {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&config.db_path).max_connections(config.db_max_connections)
        };

        let db = Database::new(db_config).await?;
        let jwt = Arc::new(JwtManager::new(
            config.jwt_secret.clone(),
            config.jwt_lifetime_secs,
        ));

        info!(db_path = %config.db_path, "Application context ready");

        Ok(AppContext { config, db, jwt })
    }

    /// Closes the database pool.
    pub async fn shutdown(&self) {
        info!("Shutting down application context");
        self.db.close().await;
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn jwt(&self) -> &JwtManager {
        &self.jwt
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.clone())
    }

    pub fn products(&self) -> ProductService {
        ProductService::new(self.clone())
    }

    pub fn customers(&self) -> CustomerService {
        CustomerService::new(self.clone())
    }

    pub fn orders(&self) -> OrderService {
        OrderService::new(self.clone())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.clone())
    }

    pub fn health(&self) -> HealthService {
        HealthService::new(self.clone())
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=orderly_db=trace` - Show trace for the database crate only
/// - Default: INFO, DEBUG for Orderly crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,orderly=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
