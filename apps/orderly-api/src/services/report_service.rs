//! Report service implementation.
//!
//! Aggregates COMPLETED orders. Rows are sorted by total, highest first,
//! and then cut to the report size. Reports are public and take no identity.

use tracing::debug;

use orderly_core::{BestCustomer, BestSeller, BEST_CUSTOMERS_LIMIT, BEST_SELLERS_LIMIT};

use crate::error::ApiResult;
use crate::AppContext;

/// Report service implementation.
pub struct ReportService {
    ctx: AppContext,
}

impl ReportService {
    /// Create a new report service.
    pub fn new(ctx: AppContext) -> Self {
        ReportService { ctx }
    }

    /// Top customers by completed-order total.
    pub async fn best_customers(&self) -> ApiResult<Vec<BestCustomer>> {
        debug!(limit = BEST_CUSTOMERS_LIMIT, "Best customers report");
        Ok(self.ctx.db().reports().best_customers(BEST_CUSTOMERS_LIMIT).await?)
    }

    /// Top sellers by completed-order total.
    pub async fn best_sellers(&self) -> ApiResult<Vec<BestSeller>> {
        debug!(limit = BEST_SELLERS_LIMIT, "Best sellers report");
        Ok(self.ctx.db().reports().best_sellers(BEST_SELLERS_LIMIT).await?)
    }
}
