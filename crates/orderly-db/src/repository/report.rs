//! # Report Repository
//!
//! Aggregations over COMPLETED orders.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  orders (state = 'COMPLETED')                                           │
//! │       │                                                                 │
//! │       ▼  GROUP BY customer_id / seller_id, SUM(total_cents)            │
//! │       │                                                                 │
//! │       ▼  JOIN customers / users                                        │
//! │       │                                                                 │
//! │       ▼  ORDER BY total DESC, id     ← sort first                      │
//! │       │                                                                 │
//! │       ▼  LIMIT n                     ← then keep the top n             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use orderly_core::{BestCustomer, BestSeller};

/// Repository for report queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Customers ranked by the sum of their completed order totals.
    pub async fn best_customers(&self, limit: u32) -> DbResult<Vec<BestCustomer>> {
        debug!(limit = %limit, "Computing best customers");

        let rows = sqlx::query_as::<_, BestCustomer>(
            r#"
            SELECT
                t.total_cents,
                c.id,
                c.name,
                c.surname,
                c.company,
                c.email,
                c.phone,
                c.seller_id,
                c.created_at,
                c.updated_at
            FROM (
                SELECT customer_id, SUM(total_cents) AS total_cents
                FROM orders
                WHERE state = 'COMPLETED'
                GROUP BY customer_id
            ) t
            INNER JOIN customers c ON c.id = t.customer_id
            ORDER BY t.total_cents DESC, c.id
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Sellers ranked by the sum of their completed order totals.
    pub async fn best_sellers(&self, limit: u32) -> DbResult<Vec<BestSeller>> {
        debug!(limit = %limit, "Computing best sellers");

        let rows = sqlx::query_as::<_, BestSeller>(
            r#"
            SELECT
                t.total_cents,
                u.id,
                u.name,
                u.surname,
                u.email,
                u.created_at
            FROM (
                SELECT seller_id, SUM(total_cents) AS total_cents
                FROM orders
                WHERE state = 'COMPLETED'
                GROUP BY seller_id
            ) t
            INNER JOIN users u ON u.id = t.seller_id
            ORDER BY t.total_cents DESC, u.id
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
