//! # Order Repository
//!
//! Database operations for orders and their line items.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  orders                         order_items                             │
//! │  ───────────────────────        ──────────────────────────────────      │
//! │  id            ◄──────────────  order_id   (ON DELETE CASCADE)          │
//! │  total_cents                    position   (submission order)           │
//! │  customer_id                    product_id (ON DELETE RESTRICT)         │
//! │  seller_id                      quantity > 0                            │
//! │  state                                                                  │
//! │  created_at / updated_at                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transactions
//! Every write here is an associated `*_in` function taking the caller's
//! connection. The order workflow runs them on one transaction together
//! with the stock primitives of [`ProductRepository`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::customer::CustomerRepository;
use crate::repository::product::ProductRepository;
use crate::repository::user::UserRepository;
use orderly_core::{LineItem, Order, OrderDetails, OrderState, Populate, PopulatedLineItem};

const ORDER_COLUMNS: &str = "id, total_cents, customer_id, seller_id, state, created_at, updated_at";

/// A stored order row, without its line items.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderRecord {
    pub id: String,
    pub total_cents: i64,
    pub customer_id: String,
    pub seller_id: String,
    pub state: OrderState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    pub fn into_order(self, line_items: Vec<LineItem>) -> Order {
        Order {
            id: self.id,
            line_items,
            total_cents: self.total_cents,
            customer_id: self.customer_id,
            seller_id: self.seller_id,
            state: self.state,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LineItemRow {
    order_id: String,
    product_id: String,
    quantity: i64,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an order with its line items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let mut conn = self.pool.acquire().await?;
        Self::get_by_id_in(&mut conn, id).await
    }

    /// Gets an order with its line items on the caller's connection.
    pub async fn get_by_id_in(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Order>> {
        let record = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        match record {
            Some(record) => {
                let items = Self::line_items_in(conn, &record.id).await?;
                Ok(Some(record.into_order(items)))
            }
            None => Ok(None),
        }
    }

    /// Loads the line items of one order in submission order.
    pub async fn line_items_in(conn: &mut SqliteConnection, order_id: &str) -> DbResult<Vec<LineItem>> {
        let items = sqlx::query_as::<_, LineItem>(
            r#"
            SELECT product_id, quantity
            FROM order_items
            WHERE order_id = ?1
            ORDER BY position
            "#,
        )
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(items)
    }

    /// Lists every order, oldest first.
    pub async fn list_all(&self) -> DbResult<Vec<Order>> {
        let records = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        self.with_line_items(records).await
    }

    /// Lists the orders placed by one seller, oldest first.
    pub async fn list_by_seller(&self, seller_id: &str) -> DbResult<Vec<Order>> {
        let records = sqlx::query_as::<_, OrderRecord>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE seller_id = ?1 ORDER BY created_at, id"
        ))
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;

        self.with_line_items(records).await
    }

    /// Lists the orders of one seller in one state, oldest first.
    pub async fn list_by_seller_and_state(
        &self,
        seller_id: &str,
        state: OrderState,
    ) -> DbResult<Vec<Order>> {
        let records = sqlx::query_as::<_, OrderRecord>(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE seller_id = ?1 AND state = ?2
            ORDER BY created_at, id
            "#
        ))
        .bind(seller_id)
        .bind(state)
        .fetch_all(&self.pool)
        .await?;

        self.with_line_items(records).await
    }

    /// Attaches line items to a batch of order rows with one query.
    async fn with_line_items(&self, records: Vec<OrderRecord>) -> DbResult<Vec<Order>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; records.len()].join(", ");
        let sql = format!(
            r#"
            SELECT order_id, product_id, quantity
            FROM order_items
            WHERE order_id IN ({placeholders})
            ORDER BY order_id, position
            "#
        );

        let mut query = sqlx::query_as::<_, LineItemRow>(&sql);
        for record in &records {
            query = query.bind(&record.id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut items: HashMap<String, Vec<LineItem>> = HashMap::new();
        for row in rows {
            items
                .entry(row.order_id)
                .or_default()
                .push(LineItem::new(row.product_id, row.quantity));
        }

        Ok(records
            .into_iter()
            .map(|record| {
                let line_items = items.remove(&record.id).unwrap_or_default();
                record.into_order(line_items)
            })
            .collect())
    }

    // =========================================================================
    // Writes (caller-held connection)
    // =========================================================================

    /// Inserts an order and its line items.
    pub async fn insert_in(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, seller_id = %order.seller_id, items = order.line_items.len(), "Inserting order");

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, total_cents, customer_id, seller_id, state, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&order.id)
        .bind(order.total_cents)
        .bind(&order.customer_id)
        .bind(&order.seller_id)
        .bind(order.state)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *conn)
        .await?;

        Self::insert_line_items_in(conn, &order.id, &order.line_items).await
    }

    /// Overwrites the fields and line items of an existing order.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Order doesn't exist
    pub async fn update_in(conn: &mut SqliteConnection, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, state = ?order.state, "Updating order");

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                total_cents = ?2,
                customer_id = ?3,
                state = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&order.id)
        .bind(order.total_cents)
        .bind(&order.customer_id)
        .bind(order.state)
        .bind(order.updated_at)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", &order.id));
        }

        sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
            .bind(&order.id)
            .execute(&mut *conn)
            .await?;

        Self::insert_line_items_in(conn, &order.id, &order.line_items).await
    }

    /// Bumps `updated_at` without changing anything else.
    ///
    /// Used as the first statement of a workflow transaction, so the
    /// transaction holds the write lock before it reads.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Order doesn't exist
    pub async fn touch_in(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        let result = sqlx::query("UPDATE orders SET updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    /// Deletes an order. Its line items go with it.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Order doesn't exist
    pub async fn delete_in(conn: &mut SqliteConnection, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting order");

        let result = sqlx::query("DELETE FROM orders WHERE id = ?1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", id));
        }

        Ok(())
    }

    async fn insert_line_items_in(
        conn: &mut SqliteConnection,
        order_id: &str,
        items: &[LineItem],
    ) -> DbResult<()> {
        for (position, item) in items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, position, product_id, quantity)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(order_id)
            .bind(position as i64)
            .bind(&item.product_id)
            .bind(item.quantity)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    // =========================================================================
    // Population
    // =========================================================================

    /// Resolves the references of an order requested by `populate`.
    ///
    /// Products come back in line-item order, one entry per line item.
    pub async fn populate(&self, order: Order, populate: Populate) -> DbResult<OrderDetails> {
        let customer = if populate.customer {
            CustomerRepository::new(self.pool.clone())
                .get_by_id(&order.customer_id)
                .await?
        } else {
            None
        };

        let seller = if populate.seller {
            UserRepository::new(self.pool.clone())
                .get_by_id(&order.seller_id)
                .await?
        } else {
            None
        };

        let products = if populate.products {
            let ids: Vec<String> = order
                .line_items
                .iter()
                .map(|item| item.product_id.clone())
                .collect();
            let by_id: HashMap<String, _> = ProductRepository::new(self.pool.clone())
                .get_many(&ids)
                .await?
                .into_iter()
                .map(|product| (product.id.clone(), product))
                .collect();

            order
                .line_items
                .iter()
                .filter_map(|item| {
                    by_id.get(&item.product_id).map(|product| PopulatedLineItem {
                        product: product.clone(),
                        quantity: item.quantity,
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(OrderDetails {
            order,
            customer,
            seller,
            products,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::generate_id;
    use crate::repository::test_support::{customer, database, product, seller};
    use crate::Database;

    async fn place(db: &Database, seller_id: &str, customer_id: &str, items: Vec<LineItem>) -> Order {
        let now = Utc::now();
        let order = Order {
            id: generate_id(),
            line_items: items,
            total_cents: 1000,
            customer_id: customer_id.to_string(),
            seller_id: seller_id.to_string(),
            state: OrderState::Pending,
            created_at: now,
            updated_at: now,
        };

        let mut tx = db.begin().await.unwrap();
        OrderRepository::insert_in(&mut tx, &order).await.unwrap();
        tx.commit().await.unwrap();
        order
    }

    #[tokio::test]
    async fn test_insert_and_get_keeps_item_order() {
        let db = database().await;
        let ada = seller(&db, "ada@example.com").await;
        let grace = customer(&db, &ada, "grace@example.com").await;
        let b = product(&db, "B", 5, 100).await;
        let a = product(&db, "A", 5, 100).await;

        let order = place(
            &db,
            &ada.id,
            &grace.id,
            vec![LineItem::new(&b.id, 2), LineItem::new(&a.id, 1)],
        )
        .await;

        let stored = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.line_items, order.line_items);
        assert_eq!(stored.state, OrderState::Pending);
        assert!(db.orders().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lists() {
        let db = database().await;
        let ada = seller(&db, "ada@example.com").await;
        let bob = seller(&db, "bob@example.com").await;
        let grace = customer(&db, &ada, "grace@example.com").await;
        let linus = customer(&db, &bob, "linus@example.com").await;
        let widget = product(&db, "Widget", 50, 100).await;

        let first = place(&db, &ada.id, &grace.id, vec![LineItem::new(&widget.id, 1)]).await;
        place(&db, &ada.id, &grace.id, vec![LineItem::new(&widget.id, 2)]).await;
        place(&db, &bob.id, &linus.id, vec![LineItem::new(&widget.id, 3)]).await;

        let mut completed = first.clone();
        completed.state = OrderState::Completed;
        let mut conn = db.pool().acquire().await.unwrap();
        OrderRepository::update_in(&mut conn, &completed).await.unwrap();
        drop(conn);

        let repo = db.orders();
        assert_eq!(repo.list_all().await.unwrap().len(), 3);

        let mine = repo.list_by_seller(&ada.id).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|o| o.line_items.len() == 1));

        let done = repo
            .list_by_seller_and_state(&ada.id, OrderState::Completed)
            .await
            .unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, first.id);

        assert!(repo
            .list_by_seller_and_state(&bob.id, OrderState::Canceled)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_line_items() {
        let db = database().await;
        let ada = seller(&db, "ada@example.com").await;
        let grace = customer(&db, &ada, "grace@example.com").await;
        let a = product(&db, "A", 5, 100).await;
        let b = product(&db, "B", 5, 100).await;

        let mut order = place(&db, &ada.id, &grace.id, vec![LineItem::new(&a.id, 2)]).await;
        order.line_items = vec![LineItem::new(&b.id, 1), LineItem::new(&a.id, 4)];
        order.total_cents = 2500;

        let mut tx = db.begin().await.unwrap();
        OrderRepository::touch_in(&mut tx, &order.id).await.unwrap();
        OrderRepository::update_in(&mut tx, &order).await.unwrap();
        tx.commit().await.unwrap();

        let stored = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.line_items, order.line_items);
        assert_eq!(stored.total_cents, 2500);
    }

    #[tokio::test]
    async fn test_delete_and_missing() {
        let db = database().await;
        let ada = seller(&db, "ada@example.com").await;
        let grace = customer(&db, &ada, "grace@example.com").await;
        let a = product(&db, "A", 5, 100).await;
        let order = place(&db, &ada.id, &grace.id, vec![LineItem::new(&a.id, 2)]).await;

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(matches!(
            OrderRepository::touch_in(&mut conn, "missing").await,
            Err(DbError::NotFound { .. })
        ));
        OrderRepository::delete_in(&mut conn, &order.id).await.unwrap();
        assert!(OrderRepository::line_items_in(&mut conn, &order.id)
            .await
            .unwrap()
            .is_empty());
        assert!(matches!(
            OrderRepository::delete_in(&mut conn, &order.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_referenced_product_cannot_be_deleted() {
        let db = database().await;
        let ada = seller(&db, "ada@example.com").await;
        let grace = customer(&db, &ada, "grace@example.com").await;
        let a = product(&db, "A", 5, 100).await;
        place(&db, &ada.id, &grace.id, vec![LineItem::new(&a.id, 2)]).await;

        assert!(matches!(
            db.products().delete(&a.id).await,
            Err(DbError::ForeignKeyViolation { .. })
        ));
        assert!(matches!(
            db.customers().delete(&grace.id).await,
            Err(DbError::ForeignKeyViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_populate() {
        let db = database().await;
        let ada = seller(&db, "ada@example.com").await;
        let grace = customer(&db, &ada, "grace@example.com").await;
        let a = product(&db, "A", 5, 100).await;
        let b = product(&db, "B", 5, 250).await;
        let order = place(
            &db,
            &ada.id,
            &grace.id,
            vec![LineItem::new(&b.id, 1), LineItem::new(&a.id, 3)],
        )
        .await;

        let bare = db.orders().populate(order.clone(), Populate::NONE).await.unwrap();
        assert!(bare.customer.is_none() && bare.seller.is_none() && bare.products.is_empty());

        let full = db.orders().populate(order, Populate::ALL).await.unwrap();
        assert_eq!(full.customer.unwrap().id, grace.id);
        assert_eq!(full.seller.unwrap().id, ada.id);
        let names: Vec<_> = full.products.iter().map(|p| p.product.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(full.products[1].quantity, 3);
    }
}
