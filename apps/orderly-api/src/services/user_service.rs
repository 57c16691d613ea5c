//! Identity service implementation.
//!
//! Seller signup, sign-in and token verification.

use chrono::Utc;
use tracing::{info, warn};

use orderly_core::validation::validate_new_user;
use orderly_core::{CoreError, Identity, NewUser, User};
use orderly_db::{generate_id, UserRecord};

use crate::auth::{extract_bearer_token, hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::AppContext;

/// Identity service implementation.
pub struct UserService {
    ctx: AppContext,
}

impl UserService {
    /// Create a new identity service.
    pub fn new(ctx: AppContext) -> Self {
        UserService { ctx }
    }

    /// Sign up a new seller.
    ///
    /// Fails with `ALREADY_EXISTS` if the email is taken. The returned user
    /// carries no password hash.
    pub async fn create_identity(&self, input: NewUser) -> ApiResult<User> {
        validate_new_user(&input)?;

        let email = input.email.trim().to_string();
        let users = self.ctx.db().users();

        if users.get_by_email(&email).await?.is_some() {
            return Err(CoreError::already_exists("User", &email).into());
        }

        let record = UserRecord {
            id: generate_id(),
            name: input.name.trim().to_string(),
            surname: input.surname.trim().to_string(),
            email,
            password_hash: hash_password(&input.password)?,
            created_at: Utc::now(),
        };
        users.insert(&record).await?;

        info!(user_id = %record.id, "User created");
        Ok(record.into_user())
    }

    /// Exchange credentials for a signed session token.
    ///
    /// ## Errors
    /// - `NOT_FOUND` - No user with that email
    /// - `INVALID_CREDENTIALS` - Wrong password
    pub async fn authenticate(&self, email: &str, password: &str) -> ApiResult<String> {
        let email = email.trim();

        let record = self
            .ctx
            .db()
            .users()
            .get_by_email(email)
            .await?
            .ok_or_else(|| ApiError::not_found("User", email))?;

        if !verify_password(password, &record.password_hash) {
            warn!(user_id = %record.id, "Authentication failed");
            return Err(CoreError::InvalidCredentials.into());
        }

        let token = self.ctx.jwt().issue_token(&record.into_user())?;

        info!(email = %email, "Token issued");
        Ok(token)
    }

    /// Decode a token into the identity it carries.
    pub fn verify_token(&self, token: &str) -> ApiResult<Identity> {
        self.ctx.jwt().verify(token)
    }

    /// Verify the value of an authorization header.
    ///
    /// Accepts `Bearer <token>` or a bare token.
    pub fn authorize(&self, auth_header: &str) -> ApiResult<Identity> {
        let token = extract_bearer_token(auth_header)
            .ok_or_else(|| ApiError::invalid_token("Missing token"))?;
        self.verify_token(token)
    }

    /// The stored user behind a verified identity.
    pub async fn current_user(&self, identity: &Identity) -> ApiResult<User> {
        self.ctx
            .db()
            .users()
            .get_by_id(&identity.id)
            .await?
            .ok_or_else(|| ApiError::not_found("User", &identity.id))
    }
}
