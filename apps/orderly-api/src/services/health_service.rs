//! Health check service implementation.
//!
//! Reports database connectivity and migration status.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::AppContext;

/// Snapshot returned by [`HealthService::check`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// Database answered a trivial query
    pub database: bool,
    pub migrations_total: usize,
    pub migrations_applied: usize,
    pub server_time: DateTime<Utc>,
}

impl HealthStatus {
    /// Serving when the database answers and every migration is applied.
    pub fn is_serving(&self) -> bool {
        self.database && self.migrations_applied == self.migrations_total
    }
}

/// Health service implementation.
pub struct HealthService {
    ctx: AppContext,
}

impl HealthService {
    /// Create a new health service.
    pub fn new(ctx: AppContext) -> Self {
        HealthService { ctx }
    }

    /// Check overall system health. Never fails; problems show up in the status.
    pub async fn check(&self) -> HealthStatus {
        let database = self.ctx.db().health_check().await;

        let (migrations_total, migrations_applied) = if database {
            match self.ctx.db().migration_status().await {
                Ok(status) => status,
                Err(e) => {
                    warn!(error = %e, "Migration status unavailable");
                    (0, 0)
                }
            }
        } else {
            warn!("Database unhealthy");
            (0, 0)
        };

        HealthStatus {
            database,
            migrations_total,
            migrations_applied,
            server_time: Utc::now(),
        }
    }
}
