//! Order workflow service implementation.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   {none} ──create──► PENDING ──update──► PENDING | COMPLETED | CANCELED  │
//! │                                                     │                   │
//! │                                                  delete                 │
//! │                                                     ▼                   │
//! │                                                   {none}                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Consistency
//! Each workflow runs in one transaction together with its stock moves:
//!
//! - create reserves every line item, then inserts the order
//! - update reserves/releases only the per-product difference
//! - delete releases every line item, then removes the order
//!
//! Any failure drops the transaction, which rolls back every reservation
//! made so far. Ownership is checked on the pool before the transaction
//! opens, and the first statement inside is always a write so SQLite hands
//! out the write lock immediately.

use chrono::Utc;
use tracing::{debug, info};

use orderly_core::validation::{validate_new_order, validate_order_update};
use orderly_core::{
    ensure_owned, stock_deltas, Customer, Identity, LineItem, NewOrder, Order, OrderDetails,
    OrderState, OrderUpdate, Populate,
};
use orderly_db::{generate_id, Database, OrderRepository, ProductRepository};

use crate::error::{ApiError, ApiResult};
use crate::AppContext;

/// Order workflow service implementation.
pub struct OrderService {
    ctx: AppContext,
}

impl OrderService {
    /// Create a new order service.
    pub fn new(ctx: AppContext) -> Self {
        OrderService { ctx }
    }

    /// Place a new `PENDING` order for one of the acting seller's customers.
    ///
    /// ## Errors
    /// - `INVALID_INPUT` - No line items, non-positive quantity, negative total
    /// - `NOT_FOUND` - Unknown customer or product
    /// - `ACCESS_DENIED` - Customer belongs to another seller
    /// - `INSUFFICIENT_STOCK` - A line item exceeds stock; no stock changes
    pub async fn create_order(&self, acting: &Identity, input: NewOrder) -> ApiResult<Order> {
        validate_new_order(&input)?;

        let customer_id = input.customer_id.trim().to_string();
        self.load_customer(acting, &customer_id).await?;

        let now = Utc::now();
        let order = Order {
            id: generate_id(),
            line_items: trim_product_ids(input.line_items),
            total_cents: input.total_cents,
            customer_id,
            seller_id: acting.id.clone(),
            state: OrderState::Pending,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.ctx.db().begin().await?;

        for item in &order.line_items {
            let remaining = ProductRepository::reserve_in(&mut tx, &item.product_id, item.quantity).await?;
            debug!(product_id = %item.product_id, quantity = item.quantity, remaining, "Reserved");
        }

        OrderRepository::insert_in(&mut tx, &order).await?;
        Database::commit(tx).await?;

        info!(
            order_id = %order.id,
            seller_id = %acting.id,
            items = order.line_items.len(),
            total_cents = order.total_cents,
            "Order created"
        );
        Ok(order)
    }

    /// Replace the line items of an owned order and optionally its total,
    /// customer and state.
    ///
    /// Only the per-product difference between the old and new line items
    /// touches stock.
    pub async fn update_order(
        &self,
        acting: &Identity,
        id: &str,
        input: OrderUpdate,
    ) -> ApiResult<Order> {
        self.load_owned(acting, id).await?;
        validate_order_update(&input)?;

        let customer_id = input.customer_id.as_deref().map(str::trim);
        if let Some(customer_id) = customer_id {
            self.load_customer(acting, customer_id).await?;
        }

        let line_items = trim_product_ids(input.line_items);

        let mut tx = self.ctx.db().begin().await?;

        OrderRepository::touch_in(&mut tx, id).await?;
        let current = OrderRepository::get_by_id_in(&mut tx, id)
            .await?
            .ok_or_else(|| ApiError::not_found("Order", id))?;

        for delta in stock_deltas(&current.line_items, &line_items)? {
            if delta.is_reservation() {
                ProductRepository::reserve_in(&mut tx, &delta.product_id, delta.delta).await?;
            } else {
                ProductRepository::release_in(&mut tx, &delta.product_id, -delta.delta).await?;
            }
            debug!(order_id = %id, product_id = %delta.product_id, delta = delta.delta, "Stock adjusted");
        }

        let updated = Order {
            line_items,
            total_cents: input.total_cents.unwrap_or(current.total_cents),
            customer_id: customer_id
                .map(str::to_string)
                .unwrap_or(current.customer_id),
            state: input.state.unwrap_or(current.state),
            updated_at: Utc::now(),
            ..current
        };

        OrderRepository::update_in(&mut tx, &updated).await?;
        Database::commit(tx).await?;

        info!(order_id = %id, state = ?updated.state, "Order updated");
        Ok(updated)
    }

    /// Delete an owned order and return its line items to stock.
    pub async fn delete_order(&self, acting: &Identity, id: &str) -> ApiResult<()> {
        self.load_owned(acting, id).await?;

        let mut tx = self.ctx.db().begin().await?;

        OrderRepository::touch_in(&mut tx, id).await?;
        let items = OrderRepository::line_items_in(&mut tx, id).await?;
        for item in &items {
            ProductRepository::release_in(&mut tx, &item.product_id, item.quantity).await?;
        }

        OrderRepository::delete_in(&mut tx, id).await?;
        Database::commit(tx).await?;

        info!(order_id = %id, seller_id = %acting.id, released = items.len(), "Order deleted");
        Ok(())
    }

    /// Get an owned order with the requested references resolved.
    pub async fn get_order(
        &self,
        acting: &Identity,
        id: &str,
        populate: Populate,
    ) -> ApiResult<OrderDetails> {
        let order = self.load_owned(acting, id).await?;
        Ok(self.ctx.db().orders().populate(order, populate).await?)
    }

    pub async fn list_by_seller(&self, acting: &Identity) -> ApiResult<Vec<Order>> {
        Ok(self.ctx.db().orders().list_by_seller(&acting.id).await?)
    }

    pub async fn list_by_state(&self, acting: &Identity, state: OrderState) -> ApiResult<Vec<Order>> {
        Ok(self
            .ctx
            .db()
            .orders()
            .list_by_seller_and_state(&acting.id, state)
            .await?)
    }

    /// Every order, regardless of seller.
    pub async fn list_all(&self, _acting: &Identity) -> ApiResult<Vec<Order>> {
        Ok(self.ctx.db().orders().list_all().await?)
    }

    async fn load_owned(&self, acting: &Identity, id: &str) -> ApiResult<Order> {
        let order = self
            .ctx
            .db()
            .orders()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Order", id))?;

        ensure_owned(&order, acting)?;
        Ok(order)
    }

    async fn load_customer(&self, acting: &Identity, id: &str) -> ApiResult<Customer> {
        let customer = self
            .ctx
            .db()
            .customers()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Customer", id))?;

        ensure_owned(&customer, acting)?;
        Ok(customer)
    }
}

fn trim_product_ids(items: Vec<LineItem>) -> Vec<LineItem> {
    items
        .into_iter()
        .map(|item| LineItem::new(item.product_id.trim(), item.quantity))
        .collect()
}
