//! Concurrent stock reservation against a file-backed database.
//!
//! In-memory databases hold a single connection, so these tests use a
//! temporary file with a real multi-connection pool.

use std::path::PathBuf;

use orderly_api::{AppConfig, AppContext, ErrorCode};
use orderly_core::{CustomerInput, Identity, LineItem, NewOrder, NewProduct, NewUser, Product};

/// Removes the database file and its WAL companions on drop.
struct TempDb {
    path: PathBuf,
}

impl TempDb {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!("orderly-test-{}.db", uuid::Uuid::new_v4()));
        TempDb { path }
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

async fn setup(db: &TempDb) -> (AppContext, Identity) {
    let config = AppConfig {
        db_path: db.path.to_string_lossy().into_owned(),
        db_max_connections: 8,
        jwt_secret: "test-secret".to_string(),
        jwt_lifetime_secs: 3600,
    };
    let ctx = AppContext::init(config).await.unwrap();

    ctx.users()
        .create_identity(NewUser {
            name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret1".to_string(),
        })
        .await
        .unwrap();
    let token = ctx.users().authenticate("ada@example.com", "secret1").await.unwrap();
    let seller = ctx.users().authorize(&format!("Bearer {}", token)).unwrap();

    (ctx, seller)
}

async fn widget(ctx: &AppContext, seller: &Identity, quantity: i64) -> Product {
    ctx.products()
        .create(
            seller,
            NewProduct {
                name: "Widget".to_string(),
                quantity,
                price_cents: 999,
            },
        )
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reserves_never_over_commit() {
    let db = TempDb::new();
    let (ctx, seller) = setup(&db).await;
    let product = widget(&ctx, &seller, 10).await;

    let mut handles = Vec::new();
    for _ in 0..25 {
        let ctx = ctx.clone();
        let seller = seller.clone();
        let id = product.id.clone();
        handles.push(tokio::spawn(async move {
            ctx.products().reserve(&seller, &id, 1).await
        }));
    }

    let mut reserved = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(remaining) => {
                assert!(remaining >= 0);
                reserved += 1;
            }
            Err(e) => assert_eq!(e.code, ErrorCode::InsufficientStock),
        }
    }

    assert_eq!(reserved, 10);
    assert_eq!(ctx.products().get(&product.id).await.unwrap().quantity, 0);

    ctx.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_orders_never_over_commit() {
    let db = TempDb::new();
    let (ctx, seller) = setup(&db).await;
    let product = widget(&ctx, &seller, 7).await;

    let customer = ctx
        .customers()
        .create(
            &seller,
            CustomerInput {
                name: "Grace".to_string(),
                surname: "Hopper".to_string(),
                company: "Navy".to_string(),
                email: "grace@example.com".to_string(),
                phone: None,
            },
        )
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let ctx = ctx.clone();
        let seller = seller.clone();
        let input = NewOrder {
            line_items: vec![LineItem::new(&product.id, 2)],
            total_cents: 1998,
            customer_id: customer.id.clone(),
        };
        handles.push(tokio::spawn(async move {
            ctx.orders().create_order(&seller, input).await
        }));
    }

    let mut placed = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => placed += 1,
            Err(e) => assert_eq!(e.code, ErrorCode::InsufficientStock),
        }
    }

    assert_eq!(placed, 3);
    assert_eq!(ctx.products().get(&product.id).await.unwrap().quantity, 1);
    assert_eq!(ctx.orders().list_by_seller(&seller).await.unwrap().len(), 3);

    ctx.shutdown().await;
}
