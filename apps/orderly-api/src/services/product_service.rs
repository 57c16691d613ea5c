//! Catalog service implementation.
//!
//! Products are not seller-scoped; mutations only require a verified
//! identity. Stock moves exclusively through `reserve` and `release`.

use chrono::Utc;
use tracing::{debug, info};

use orderly_core::validation::{
    validate_new_product, validate_product_update, validate_quantity, validate_search_query,
};
use orderly_core::{Identity, NewProduct, Product, ProductUpdate, SEARCH_RESULT_LIMIT};
use orderly_db::generate_id;

use crate::error::{ApiError, ApiResult};
use crate::AppContext;

/// Catalog service implementation.
pub struct ProductService {
    ctx: AppContext,
}

impl ProductService {
    /// Create a new catalog service.
    pub fn new(ctx: AppContext) -> Self {
        ProductService { ctx }
    }

    pub async fn create(&self, acting: &Identity, input: NewProduct) -> ApiResult<Product> {
        validate_new_product(&input)?;

        let now = Utc::now();
        let product = Product {
            id: generate_id(),
            name: input.name.trim().to_string(),
            quantity: input.quantity,
            price_cents: input.price_cents,
            created_at: now,
            updated_at: now,
        };

        let product = self.ctx.db().products().insert(&product).await?;

        info!(product_id = %product.id, seller_id = %acting.id, "Product created");
        Ok(product)
    }

    pub async fn get(&self, id: &str) -> ApiResult<Product> {
        self.ctx
            .db()
            .products()
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Product", id))
    }

    /// Edit name and price. Stock is left alone.
    pub async fn update(
        &self,
        acting: &Identity,
        id: &str,
        input: ProductUpdate,
    ) -> ApiResult<Product> {
        validate_product_update(&input)?;

        let input = ProductUpdate {
            name: input.name.trim().to_string(),
            price_cents: input.price_cents,
        };
        let product = self.ctx.db().products().update(id, &input).await?;

        info!(product_id = %id, seller_id = %acting.id, "Product updated");
        Ok(product)
    }

    /// Delete a product. Fails while any order still references it.
    pub async fn delete(&self, acting: &Identity, id: &str) -> ApiResult<()> {
        self.ctx.db().products().delete(id).await?;

        info!(product_id = %id, seller_id = %acting.id, "Product deleted");
        Ok(())
    }

    pub async fn list(&self) -> ApiResult<Vec<Product>> {
        Ok(self.ctx.db().products().list().await?)
    }

    /// Free-text search over product names, best matches first.
    pub async fn search(&self, text: &str) -> ApiResult<Vec<Product>> {
        let query = validate_search_query(text)?;

        let results = self
            .ctx
            .db()
            .products()
            .search(&query, SEARCH_RESULT_LIMIT)
            .await?;

        debug!(query = %query, results = results.len(), "Product search");
        Ok(results)
    }

    /// Take `quantity` units out of stock. Returns the remaining stock.
    ///
    /// ## Errors
    /// - `NOT_FOUND` - Unknown product
    /// - `INSUFFICIENT_STOCK` - Stock does not cover the request; nothing changes
    pub async fn reserve(&self, acting: &Identity, id: &str, quantity: i64) -> ApiResult<i64> {
        validate_quantity(quantity)?;

        let remaining = self.ctx.db().products().reserve(id, quantity).await?;

        debug!(product_id = %id, seller_id = %acting.id, quantity, remaining, "Stock reserved");
        Ok(remaining)
    }

    /// Put `quantity` units back into stock. Returns the new stock.
    ///
    /// Quantities above `MAX_QUANTITY` fail with `INVALID_INPUT`, as does a
    /// release that would overflow the stock counter.
    pub async fn release(&self, acting: &Identity, id: &str, quantity: i64) -> ApiResult<i64> {
        validate_quantity(quantity)?;

        let remaining = self.ctx.db().products().release(id, quantity).await?;

        debug!(product_id = %id, seller_id = %acting.id, quantity, remaining, "Stock released");
        Ok(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::{context, product, seller};
    use orderly_core::MAX_QUANTITY;

    #[tokio::test]
    async fn test_widget_round_trip() {
        let ctx = context().await;
        let ada = seller(&ctx, "ada@example.com").await;
        let widget = product(&ctx, &ada, "Widget", 5).await;
        let products = ctx.products();

        assert_eq!(products.reserve(&ada, &widget.id, 3).await.unwrap(), 2);

        let err = products.reserve(&ada, &widget.id, 3).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert!(err.message.contains("Widget"));

        assert_eq!(products.get(&widget.id).await.unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_release_restores_stock() {
        let ctx = context().await;
        let ada = seller(&ctx, "ada@example.com").await;
        let widget = product(&ctx, &ada, "Widget", 5).await;
        let products = ctx.products();

        products.reserve(&ada, &widget.id, 5).await.unwrap();
        assert_eq!(products.release(&ada, &widget.id, 4).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_non_positive_quantities() {
        let ctx = context().await;
        let ada = seller(&ctx, "ada@example.com").await;
        let widget = product(&ctx, &ada, "Widget", 5).await;
        let products = ctx.products();

        for qty in [0, -2] {
            assert_eq!(
                products.reserve(&ada, &widget.id, qty).await.unwrap_err().code,
                ErrorCode::InvalidInput
            );
            assert_eq!(
                products.release(&ada, &widget.id, qty).await.unwrap_err().code,
                ErrorCode::InvalidInput
            );
        }
        assert_eq!(products.get(&widget.id).await.unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let ctx = context().await;
        let ada = seller(&ctx, "ada@example.com").await;
        let products = ctx.products();

        assert_eq!(products.get("missing").await.unwrap_err().code, ErrorCode::NotFound);
        assert_eq!(
            products.reserve(&ada, "missing", 1).await.unwrap_err().code,
            ErrorCode::NotFound
        );
        assert_eq!(
            products.delete(&ada, "missing").await.unwrap_err().code,
            ErrorCode::NotFound
        );
    }

    #[tokio::test]
    async fn test_update_keeps_stock() {
        let ctx = context().await;
        let ada = seller(&ctx, "ada@example.com").await;
        let widget = product(&ctx, &ada, "Widget", 5).await;

        let updated = ctx
            .products()
            .update(
                &ada,
                &widget.id,
                ProductUpdate {
                    name: "  Deluxe Widget ".to_string(),
                    price_cents: 1499,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Deluxe Widget");
        assert_eq!(updated.price_cents, 1499);
        assert_eq!(updated.quantity, 5);
    }

    #[tokio::test]
    async fn test_invalid_product() {
        let ctx = context().await;
        let ada = seller(&ctx, "ada@example.com").await;

        let err = ctx
            .products()
            .create(
                &ada,
                NewProduct {
                    name: "Widget".to_string(),
                    quantity: -1,
                    price_cents: 100,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_search() {
        let ctx = context().await;
        let ada = seller(&ctx, "ada@example.com").await;
        product(&ctx, &ada, "Blue Widget", 1).await;
        product(&ctx, &ada, "Red Widget", 1).await;
        product(&ctx, &ada, "Gadget", 1).await;
        let products = ctx.products();

        let found = products.search("widget").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|p| p.name.contains("Widget")));

        assert!(products.search("   ").await.unwrap().is_empty());
        assert_eq!(products.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_search_is_capped() {
        let ctx = context().await;
        let ada = seller(&ctx, "ada@example.com").await;
        for i in 0..12 {
            product(&ctx, &ada, &format!("Widget {}", i), 1).await;
        }

        let found = ctx.products().search("widget").await.unwrap();
        assert_eq!(found.len(), SEARCH_RESULT_LIMIT as usize);
    }

    #[tokio::test]
    async fn test_quantities_above_cap() {
        let ctx = context().await;
        let ada = seller(&ctx, "ada@example.com").await;
        let widget = product(&ctx, &ada, "Widget", 5).await;
        let products = ctx.products();

        for qty in [MAX_QUANTITY + 1, i64::MAX] {
            assert_eq!(
                products.reserve(&ada, &widget.id, qty).await.unwrap_err().code,
                ErrorCode::InvalidInput
            );
            assert_eq!(
                products.release(&ada, &widget.id, qty).await.unwrap_err().code,
                ErrorCode::InvalidInput
            );
        }

        // The catalog still reads back cleanly
        assert_eq!(products.get(&widget.id).await.unwrap().quantity, 5);
        assert_eq!(products.list().await.unwrap().len(), 1);
        assert_eq!(products.search("widget").await.unwrap().len(), 1);

        assert_eq!(
            products.release(&ada, &widget.id, MAX_QUANTITY).await.unwrap(),
            MAX_QUANTITY + 5
        );
    }

    #[tokio::test]
    async fn test_initial_stock_above_cap() {
        let ctx = context().await;
        let ada = seller(&ctx, "ada@example.com").await;
        let products = ctx.products();

        let input = NewProduct {
            name: "Widget".to_string(),
            quantity: MAX_QUANTITY + 1,
            price_cents: 100,
        };
        let err = products.create(&ada, input.clone()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);

        let widget = products
            .create(
                &ada,
                NewProduct {
                    quantity: MAX_QUANTITY,
                    ..input
                },
            )
            .await
            .unwrap();
        assert_eq!(widget.quantity, MAX_QUANTITY);
    }
}
