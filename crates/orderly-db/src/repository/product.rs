//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Full-text search using FTS5
//! - CRUD operations
//! - Stock reservation and release
//!
//! ## FTS5 Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How FTS5 Search Works                                │
//! │                                                                         │
//! │  User types: "blue wid"                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  match expression: "blue"* OR "wid"*                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │ products_fts (virtual table over name)  │                           │
//! │  │                                         │                           │
//! │  │ Blue Widget                             │ ← MATCH! (both terms)     │
//! │  │ Widget                                  │ ← MATCH!                  │
//! │  │ Gadget                                  │                           │
//! │  └─────────────────────────────────────────┘                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Results ranked by relevance: [Blue Widget, Widget]                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Primitives
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  reserve(id, n)                                                         │
//! │     UPDATE products SET quantity = quantity - n                         │
//! │      WHERE id = ? AND quantity >= n                                     │
//! │     RETURNING quantity                                                  │
//! │                                                                         │
//! │     row returned   ──► new on-hand quantity                             │
//! │     no row         ──► product missing?  NotFound                       │
//! │                        otherwise         InsufficientStock              │
//! │                                                                         │
//! │  release(id, n)                                                         │
//! │     UPDATE products SET quantity = quantity + n WHERE id = ?            │
//! │                                                                         │
//! │  Check and decrement are one statement, so two concurrent reserves      │
//! │  can never both pass on the same units.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use orderly_core::{Product, ProductUpdate};

const PRODUCT_COLUMNS: &str = "id, name, quantity, price_cents, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let results = repo.search("widget", 10).await?;
/// let left = repo.reserve(&widget.id, 3).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Searches product names using full-text search.
    ///
    /// ## How It Works
    /// 1. Splits the query into words
    /// 2. Matches any word as a prefix (`wid` finds `Widget`)
    /// 3. Returns products ordered by relevance
    ///
    /// A query with no searchable words returns no products.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let Some(fts_query) = fts_match_expression(query) else {
            return Ok(Vec::new());
        };

        debug!(query = %fts_query, limit = %limit, "Searching products");

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                p.id,
                p.name,
                p.quantity,
                p.price_cents,
                p.created_at,
                p.updated_at
            FROM products_fts
            INNER JOIN products p ON p.rowid = products_fts.rowid
            WHERE products_fts MATCH ?1
            ORDER BY rank
            LIMIT ?2
            "#,
        )
        .bind(&fts_query)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists every product, oldest first.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets several products by ID in one query. Missing IDs are skipped.
    pub async fn get_many(&self, ids: &[String]) -> DbResult<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id IN ({placeholders})");

        let mut query = sqlx::query_as::<_, Product>(&sql);
        for id in ids {
            query = query.bind(id);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Inserts a new product.
    ///
    /// ## Arguments
    /// * `product` - Product to insert (id should be generated beforehand)
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, quantity, price_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.quantity)
        .bind(product.price_cents)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Updates the name and price of a product. Stock is untouched.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The updated product
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: &str, update: &ProductUpdate) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products SET
                name = ?2,
                price_cents = ?3,
                updated_at = ?4
            WHERE id = ?1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&update.name)
        .bind(update.price_cents)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        product.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(DbError::ForeignKeyViolation)` - An order still references it
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Reserves stock in its own autocommit statement.
    ///
    /// ## Returns
    /// The quantity left on hand.
    pub async fn reserve(&self, id: &str, quantity: i64) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        Self::reserve_in(&mut conn, id, quantity).await
    }

    /// Releases stock in its own autocommit statement.
    ///
    /// ## Returns
    /// The quantity now on hand.
    pub async fn release(&self, id: &str, quantity: i64) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;
        Self::release_in(&mut conn, id, quantity).await
    }

    /// Atomically takes `quantity` units off the shelf.
    ///
    /// Runs on the caller's connection, so inside a transaction the
    /// reservation commits or rolls back with everything else.
    ///
    /// ## Returns
    /// * `Ok(i64)` - Quantity left on hand
    /// * `Err(DbError::InsufficientStock)` - Not enough on hand; nothing changed
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn reserve_in(conn: &mut SqliteConnection, id: &str, quantity: i64) -> DbResult<i64> {
        debug!(id = %id, quantity = %quantity, "Reserving stock");

        let remaining: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET
                quantity = quantity - ?2,
                updated_at = ?3
            WHERE id = ?1 AND quantity >= ?2
            RETURNING quantity
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(remaining) = remaining {
            return Ok(remaining);
        }

        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT name, quantity FROM products WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

        match row {
            Some((product, available)) => {
                warn!(
                    id = %id,
                    available = %available,
                    requested = %quantity,
                    "Reservation refused"
                );
                Err(DbError::InsufficientStock {
                    product,
                    available,
                    requested: quantity,
                })
            }
            None => Err(DbError::not_found("Product", id)),
        }
    }

    /// Atomically puts `quantity` units back on the shelf.
    ///
    /// Refuses a release that would carry the stock past `i64::MAX`; SQLite
    /// would otherwise store the sum as a REAL.
    ///
    /// ## Returns
    /// * `Ok(i64)` - Quantity now on hand
    /// * `Err(DbError::StockOverflow)` - Stock would overflow; nothing changed
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn release_in(conn: &mut SqliteConnection, id: &str, quantity: i64) -> DbResult<i64> {
        debug!(id = %id, quantity = %quantity, "Releasing stock");

        let on_hand: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET
                quantity = quantity + ?2,
                updated_at = ?3
            WHERE id = ?1 AND quantity <= ?4 - ?2
            RETURNING quantity
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .bind(i64::MAX)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(on_hand) = on_hand {
            return Ok(on_hand);
        }

        let row: Option<(String, i64)> =
            sqlx::query_as("SELECT name, quantity FROM products WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

        match row {
            Some((product, on_hand)) => {
                warn!(id = %id, on_hand = %on_hand, released = %quantity, "Release refused");
                Err(DbError::StockOverflow {
                    product,
                    on_hand,
                    released: quantity,
                })
            }
            None => Err(DbError::not_found("Product", id)),
        }
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Builds an FTS5 match expression from free text.
///
/// Each alphanumeric word becomes a quoted prefix term; terms are OR-ed so
/// any word can match, and FTS5 ranking puts products matching more words
/// first. Returns `None` when nothing searchable remains.
fn fts_match_expression(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| format!("\"{}\"*", word))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{database, product};

    #[test]
    fn test_fts_match_expression() {
        assert_eq!(fts_match_expression("wid").as_deref(), Some("\"wid\"*"));
        assert_eq!(
            fts_match_expression("blue  wid-get").as_deref(),
            Some("\"blue\"* OR \"wid\"* OR \"get\"*")
        );
        assert_eq!(fts_match_expression("  \"*() "), None);
        assert_eq!(fts_match_expression(""), None);
    }

    #[tokio::test]
    async fn test_widget_round_trip() {
        let db = database().await;
        let widget = product(&db, "Widget", 5, 999).await;
        let repo = db.products();

        assert_eq!(repo.reserve(&widget.id, 3).await.unwrap(), 2);

        let err = repo.reserve(&widget.id, 3).await.unwrap_err();
        match err {
            DbError::InsufficientStock {
                product,
                available,
                requested,
            } => {
                assert_eq!(product, "Widget");
                assert_eq!(available, 2);
                assert_eq!(requested, 3);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        let stored = repo.get_by_id(&widget.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 2);
    }

    #[tokio::test]
    async fn test_quantity_never_negative() {
        let db = database().await;
        let bolt = product(&db, "Bolt", 4, 10).await;
        let repo = db.products();

        let steps: [(bool, i64); 8] = [
            (true, 3),
            (true, 3),
            (false, 1),
            (true, 2),
            (true, 1),
            (false, 5),
            (true, 6),
            (true, 5),
        ];

        for (is_reserve, qty) in steps {
            let _ = if is_reserve {
                repo.reserve(&bolt.id, qty).await
            } else {
                repo.release(&bolt.id, qty).await
            };

            let on_hand = repo.get_by_id(&bolt.id).await.unwrap().unwrap().quantity;
            assert!(on_hand >= 0, "quantity went negative: {on_hand}");
        }

        // 4 → 1 → (refused) → 2 → 0 → (refused) → 5 → (refused) → 0
        let final_qty = repo.get_by_id(&bolt.id).await.unwrap().unwrap().quantity;
        assert_eq!(final_qty, 0);
    }

    #[tokio::test]
    async fn test_reserve_and_release_missing_product() {
        let db = database().await;
        let repo = db.products();

        assert!(matches!(
            repo.reserve("missing", 1).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            repo.release("missing", 1).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_release_past_i64_max_is_refused() {
        let db = database().await;
        let widget = product(&db, "Widget", 5, 999).await;
        let repo = db.products();

        match repo.release(&widget.id, i64::MAX).await.unwrap_err() {
            DbError::StockOverflow {
                product,
                on_hand,
                released,
            } => {
                assert_eq!(product, "Widget");
                assert_eq!(on_hand, 5);
                assert_eq!(released, i64::MAX);
            }
            other => panic!("expected StockOverflow, got {other:?}"),
        }

        // Still an INTEGER column value, so every read keeps decoding
        assert_eq!(repo.get_by_id(&widget.id).await.unwrap().unwrap().quantity, 5);
        assert_eq!(repo.list().await.unwrap().len(), 1);

        assert_eq!(repo.release(&widget.id, i64::MAX - 5).await.unwrap(), i64::MAX);
        assert!(repo.release(&widget.id, 1).await.is_err());
        assert_eq!(repo.get_by_id(&widget.id).await.unwrap().unwrap().quantity, i64::MAX);
    }

    #[tokio::test]
    async fn test_reserve_rolls_back_with_transaction() {
        let db = database().await;
        let widget = product(&db, "Widget", 5, 999).await;

        {
            let mut tx = db.begin().await.unwrap();
            let left = ProductRepository::reserve_in(&mut tx, &widget.id, 4)
                .await
                .unwrap();
            assert_eq!(left, 1);
            // dropped without commit
        }

        let stored = db.products().get_by_id(&widget.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 5);
    }

    #[tokio::test]
    async fn test_search_ranks_and_limits() {
        let db = database().await;
        product(&db, "Blue Widget", 1, 100).await;
        product(&db, "Widget", 1, 100).await;
        product(&db, "Gadget", 1, 100).await;
        for i in 0..12 {
            product(&db, &format!("Widget Mk{}", i), 1, 100).await;
        }

        let results = db.products().search("wid", 10).await.unwrap();
        assert_eq!(results.len(), 10);
        assert!(results.iter().all(|p| p.name.contains("Widget")));

        let both = db.products().search("blue widget", 10).await.unwrap();
        assert_eq!(both[0].name, "Blue Widget");

        assert!(db.products().search("***", 10).await.unwrap().is_empty());
        assert!(db.products().search("sprocket", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_keeps_stock_and_reindexes() {
        let db = database().await;
        let widget = product(&db, "Widget", 5, 999).await;
        let repo = db.products();

        let updated = repo
            .update(
                &widget.id,
                &ProductUpdate {
                    name: "Sprocket".to_string(),
                    price_cents: 1299,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.quantity, 5);
        assert_eq!(updated.price_cents, 1299);

        assert!(repo.search("widget", 10).await.unwrap().is_empty());
        assert_eq!(repo.search("sprock", 10).await.unwrap().len(), 1);

        assert!(matches!(
            repo.update(
                "missing",
                &ProductUpdate {
                    name: "X".to_string(),
                    price_cents: 1
                }
            )
            .await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = database().await;
        let widget = product(&db, "Widget", 5, 999).await;
        let repo = db.products();

        repo.delete(&widget.id).await.unwrap();
        assert!(repo.get_by_id(&widget.id).await.unwrap().is_none());
        assert!(repo.search("widget", 10).await.unwrap().is_empty());
        assert!(matches!(
            repo.delete(&widget.id).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_and_get_many() {
        let db = database().await;
        let a = product(&db, "A", 1, 1).await;
        let b = product(&db, "B", 1, 1).await;

        assert_eq!(db.products().list().await.unwrap().len(), 2);
        assert_eq!(db.products().count().await.unwrap(), 2);

        let many = db
            .products()
            .get_many(&[a.id.clone(), b.id.clone(), "missing".to_string()])
            .await
            .unwrap();
        assert_eq!(many.len(), 2);
    }
}
