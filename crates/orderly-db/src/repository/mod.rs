//! # Repository Module
//!
//! Database repository implementations for Orderly.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Service operation                                                      │
//! │       │                                                                 │
//! │       │  db.products().get_by_id(&id)                    (pool)         │
//! │       │  ProductRepository::reserve_in(&mut tx, &id, 3)  (transaction)  │
//! │       ▼                                                                 │
//! │  Repository                                                            │
//! │  ├── &self methods      run on the shared pool                         │
//! │  └── *_in(conn, ..)     run on a caller-held connection or transaction │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`user::UserRepository`] - Seller accounts
//! - [`product::ProductRepository`] - Catalog, search and stock
//! - [`customer::CustomerRepository`] - Seller-owned customers
//! - [`order::OrderRepository`] - Orders and their line items
//! - [`report::ReportRepository`] - Aggregations over completed orders

use uuid::Uuid;

pub mod customer;
pub mod order;
pub mod product;
pub mod report;
pub mod user;

/// Generates a new record ID.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use orderly_core::{Customer, Product, User};

    use super::generate_id;
    use crate::repository::user::UserRecord;
    use crate::{Database, DbConfig};

    pub async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn seller(db: &Database, email: &str) -> User {
        let record = UserRecord {
            id: generate_id(),
            name: "Test".to_string(),
            surname: "Seller".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            created_at: Utc::now(),
        };
        db.users().insert(&record).await.unwrap();
        record.into_user()
    }

    pub async fn product(db: &Database, name: &str, quantity: i64, price_cents: i64) -> Product {
        let now = Utc::now();
        let product = Product {
            id: generate_id(),
            name: name.to_string(),
            quantity,
            price_cents,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap()
    }

    pub async fn customer(db: &Database, seller: &User, email: &str) -> Customer {
        let now = Utc::now();
        let customer = Customer {
            id: generate_id(),
            name: "Grace".to_string(),
            surname: "Hopper".to_string(),
            company: "Navy".to_string(),
            email: email.to_string(),
            phone: None,
            seller_id: seller.id.clone(),
            created_at: now,
            updated_at: now,
        };
        db.customers().insert(&customer).await.unwrap()
    }
}
