//! # Customer Repository
//!
//! Database operations for customers. Ownership is checked by the caller;
//! this repository only stores and loads.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::user::UserRepository;
use orderly_core::{Customer, CustomerDetails, CustomerInput, Populate};

const CUSTOMER_COLUMNS: &str =
    "id, name, surname, company, email, phone, seller_id, created_at, updated_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a new customer.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Email already used by a customer
    pub async fn insert(&self, customer: &Customer) -> DbResult<Customer> {
        debug!(id = %customer.id, seller_id = %customer.seller_id, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, surname, company, email, phone,
                seller_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.surname)
        .bind(&customer.company)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.seller_id)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| with_email(e, &customer.email))?;

        Ok(customer.clone())
    }

    /// Gets a customer by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let mut conn = self.pool.acquire().await?;
        Self::get_by_id_in(&mut conn, id).await
    }

    /// Gets a customer by ID on the caller's connection.
    pub async fn get_by_id_in(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists every customer, oldest first.
    pub async fn list_all(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Lists the customers of one seller, oldest first.
    pub async fn list_by_seller(&self, seller_id: &str) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE seller_id = ?1 ORDER BY created_at, id"
        ))
        .bind(seller_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Overwrites the editable fields of a customer.
    ///
    /// The owning seller is never changed.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Customer doesn't exist
    /// * `Err(DbError::UniqueViolation)` - Email used by another customer
    pub async fn update(&self, id: &str, input: &CustomerInput) -> DbResult<Customer> {
        debug!(id = %id, "Updating customer");

        let customer = sqlx::query_as::<_, Customer>(&format!(
            r#"
            UPDATE customers SET
                name = ?2,
                surname = ?3,
                company = ?4,
                email = ?5,
                phone = ?6,
                updated_at = ?7
            WHERE id = ?1
            RETURNING {CUSTOMER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.name)
        .bind(&input.surname)
        .bind(&input.company)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| with_email(e, &input.email))?;

        customer.ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Deletes a customer.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Customer doesn't exist
    /// * `Err(DbError::ForeignKeyViolation)` - An order still references it
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Resolves the references of a customer requested by `populate`.
    pub async fn populate(&self, customer: Customer, populate: Populate) -> DbResult<CustomerDetails> {
        let seller = if populate.seller {
            UserRepository::new(self.pool.clone())
                .get_by_id(&customer.seller_id)
                .await?
        } else {
            None
        };

        Ok(CustomerDetails { customer, seller })
    }
}

/// Fills in the offending email on a unique violation.
fn with_email(err: sqlx::Error, email: &str) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
            field,
            value: email.to_string(),
        },
        other => other,
    }
}
