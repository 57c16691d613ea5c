//! # Seed Data Generator
//!
//! Populates a development database through the service layer.
//!
//! ## Usage
//! ```bash
//! # Seed ./orderly_dev.db with the default amount of orders
//! cargo run -p orderly-api --bin seed
//!
//! # More orders per customer
//! cargo run -p orderly-api --bin seed -- --orders 5
//!
//! # Specify database path
//! cargo run -p orderly-api --bin seed -- --db ./data/orderly.db
//! ```
//!
//! ## Generated Data
//! - 3 sellers, password `password1`
//! - A catalog of products with plenty of stock
//! - 4 customers per seller
//! - Orders per customer, cycling through PENDING, COMPLETED and CANCELED
//!   so both reports have something to rank

use orderly_api::{init_tracing, AppConfig, AppContext};
use orderly_core::{
    CustomerInput, Identity, LineItem, Money, NewOrder, NewProduct, NewUser, OrderState,
    OrderUpdate, Product,
};
use std::env;

const SELLERS: &[(&str, &str, &str)] = &[
    ("Ada", "Lovelace", "ada@orderly.dev"),
    ("Alan", "Turing", "alan@orderly.dev"),
    ("Grace", "Hopper", "grace@orderly.dev"),
];

const SELLER_PASSWORD: &str = "password1";

/// (name, stock, price in cents)
const PRODUCTS: &[(&str, i64, i64)] = &[
    ("Widget", 500, 999),
    ("Deluxe Widget", 200, 2499),
    ("Gadget", 400, 1499),
    ("Gizmo", 300, 1999),
    ("Sprocket", 1000, 249),
    ("Flange", 800, 399),
    ("Bolt Pack", 1500, 199),
    ("Nut Pack", 1500, 149),
    ("Gear Set", 150, 4999),
    ("Control Panel", 50, 19999),
];

const COMPANIES: &[&str] = &["Acme", "Globex", "Initech", "Umbrella", "Hooli", "Stark"];

const STATES: &[OrderState] = &[
    OrderState::Completed,
    OrderState::Pending,
    OrderState::Completed,
    OrderState::Canceled,
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut orders_per_customer: usize = 3;
    let mut db_path = String::from("./orderly_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--orders" | "-o" => {
                if i + 1 < args.len() {
                    orders_per_customer = args[i + 1].parse().unwrap_or(3);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Orderly Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -o, --orders <N>   Orders per customer (default: 3)");
                println!("  -d, --db <PATH>    Database file path (default: ./orderly_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    init_tracing();

    println!("🌱 Orderly Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Orders per customer: {}", orders_per_customer);
    println!();

    let mut config = AppConfig::load()?;
    config.db_path = db_path;
    let ctx = AppContext::init(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = ctx.db().products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        ctx.shutdown().await;
        return Ok(());
    }

    let start = std::time::Instant::now();

    // Sellers
    println!();
    println!("Creating sellers...");
    let mut sellers: Vec<Identity> = Vec::new();
    for (name, surname, email) in SELLERS {
        ctx.users()
            .create_identity(NewUser {
                name: name.to_string(),
                surname: surname.to_string(),
                email: email.to_string(),
                password: SELLER_PASSWORD.to_string(),
            })
            .await?;

        let token = ctx.users().authenticate(email, SELLER_PASSWORD).await?;
        sellers.push(ctx.users().verify_token(&token)?);
    }
    println!("  Created {} sellers", sellers.len());

    // Catalog
    println!("Creating products...");
    let mut catalog: Vec<Product> = Vec::new();
    for (name, quantity, price_cents) in PRODUCTS {
        let product = ctx
            .products()
            .create(
                &sellers[0],
                NewProduct {
                    name: name.to_string(),
                    quantity: *quantity,
                    price_cents: *price_cents,
                },
            )
            .await?;
        catalog.push(product);
    }
    println!("  Created {} products", catalog.len());

    // Customers and orders
    println!("Creating customers and orders...");
    let mut customers = 0;
    let mut orders = 0;
    let mut seed: usize = 0;

    for seller in &sellers {
        for c in 0..4 {
            let company = COMPANIES[(seed + c) % COMPANIES.len()];
            let local = seller.email.split('@').next().unwrap_or("seller");
            let customer = ctx
                .customers()
                .create(
                    seller,
                    CustomerInput {
                        name: format!("Buyer{}", c + 1),
                        surname: company.to_string(),
                        company: company.to_string(),
                        email: format!("buyer{}.{}@{}.example", c + 1, local, company.to_lowercase()),
                        phone: Some(format!("+1 555 01{:02}", seed % 100)),
                    },
                )
                .await?;
            customers += 1;

            for _ in 0..orders_per_customer {
                seed += 1;
                let line_items = generate_line_items(&catalog, seed);
                let total_cents = order_total(&catalog, &line_items);

                let order = match ctx
                    .orders()
                    .create_order(
                        seller,
                        NewOrder {
                            line_items: line_items.clone(),
                            total_cents,
                            customer_id: customer.id.clone(),
                        },
                    )
                    .await
                {
                    Ok(order) => order,
                    Err(e) => {
                        eprintln!("Failed to place order: {}", e);
                        continue;
                    }
                };
                orders += 1;

                let state = STATES[seed % STATES.len()];
                if state != OrderState::Pending {
                    ctx.orders()
                        .update_order(
                            seller,
                            &order.id,
                            OrderUpdate {
                                line_items,
                                state: Some(state),
                                ..Default::default()
                            },
                        )
                        .await?;
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!(
        "✓ Created {} customers and {} orders in {:?}",
        customers, orders, elapsed
    );

    // Verify reports and search
    println!();
    println!("Verifying reports...");
    for row in ctx.reports().best_sellers().await? {
        println!("  {} {}: {}", row.seller.name, row.seller.surname, row.total());
    }
    let best_customers = ctx.reports().best_customers().await?;
    println!("  Best customers: {} ranked", best_customers.len());

    let search_results = ctx.products().search("widget").await?;
    println!("  Search 'widget': {} results", search_results.len());

    ctx.shutdown().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Picks one to three distinct products for an order.
fn generate_line_items(catalog: &[Product], seed: usize) -> Vec<LineItem> {
    let count = 1 + seed % 3;

    (0..count)
        .map(|n| {
            let product = &catalog[(seed * 7 + n * 3) % catalog.len()];
            LineItem::new(&product.id, 1 + ((seed + n) % 4) as i64)
        })
        .collect()
}

fn order_total(catalog: &[Product], items: &[LineItem]) -> i64 {
    items
        .iter()
        .filter_map(|item| {
            catalog
                .iter()
                .find(|p| p.id == item.product_id)
                .map(|p| p.price() * item.quantity)
        })
        .sum::<Money>()
        .cents()
}
