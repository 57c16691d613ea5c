//! # User Repository
//!
//! Database operations for seller accounts.
//!
//! The password hash never leaves this crate inside a [`User`]; only the
//! sign-in path reads a full [`UserRecord`].

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use orderly_core::User;

/// A stored user row, including the password hash.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Drops the password hash.
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            name: self.name,
            surname: self.surname,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new user.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - Email already registered
    pub async fn insert(&self, user: &UserRecord) -> DbResult<()> {
        debug!(id = %user.id, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (id, name, surname, email, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.surname)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: user.email.clone(),
            },
            other => other,
        })?;

        Ok(())
    }

    /// Gets a user by ID, without the password hash.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, surname, email, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets the full record for an email, for credential checks.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, surname, email, password_hash, created_at
            FROM users
            WHERE email = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Counts registered users (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::generate_id;
    use crate::repository::test_support::database;

    fn record(email: &str) -> UserRecord {
        UserRecord {
            id: generate_id(),
            name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = database().await;
        let ada = record("ada@example.com");
        db.users().insert(&ada).await.unwrap();

        let by_id = db.users().get_by_id(&ada.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ada@example.com");

        let by_email = db
            .users()
            .get_by_email("ada@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.password_hash, "$argon2id$stub");

        assert!(db.users().get_by_email("nobody@example.com").await.unwrap().is_none());
        assert_eq!(db.users().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let db = database().await;
        db.users().insert(&record("ada@example.com")).await.unwrap();

        let err = db.users().insert(&record("ada@example.com")).await.unwrap_err();
        match err {
            DbError::UniqueViolation { value, .. } => assert_eq!(value, "ada@example.com"),
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }
}
