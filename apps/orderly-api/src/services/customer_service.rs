//! Customer directory service implementation.
//!
//! Every customer belongs to the seller that created it. Reads and writes
//! of a single customer go through the ownership guard.

use chrono::Utc;
use tracing::info;

use orderly_core::validation::validate_customer_input;
use orderly_core::{
    ensure_owned, CoreError, Customer, CustomerDetails, CustomerInput, Identity, Populate,
};
use orderly_db::generate_id;

use crate::error::{ApiError, ApiResult};
use crate::AppContext;

/// Customer directory service implementation.
pub struct CustomerService {
    ctx: AppContext,
}

impl CustomerService {
    /// Create a new customer service.
    pub fn new(ctx: AppContext) -> Self {
        CustomerService { ctx }
    }

    /// Create a customer owned by the acting seller.
    ///
    /// Fails with `ALREADY_EXISTS` if the email is taken.
    pub async fn create(&self, acting: &Identity, input: CustomerInput) -> ApiResult<Customer> {
        validate_customer_input(&input)?;
        let input = normalize(input);

        let customers = self.ctx.db().customers();
        if customers.get_by_email(&input.email).await?.is_some() {
            return Err(CoreError::already_exists("Customer", &input.email).into());
        }

        let now = Utc::now();
        let customer = Customer {
            id: generate_id(),
            name: input.name,
            surname: input.surname,
            company: input.company,
            email: input.email,
            phone: input.phone,
            seller_id: acting.id.clone(),
            created_at: now,
            updated_at: now,
        };

        let customer = customers.insert(&customer).await?;

        info!(customer_id = %customer.id, seller_id = %acting.id, "Customer created");
        Ok(customer)
    }

    /// Get one of the acting seller's customers.
    pub async fn get(
        &self,
        acting: &Identity,
        id: &str,
        populate: Populate,
    ) -> ApiResult<CustomerDetails> {
        let customer = self.load_owned(acting, id).await?;
        Ok(self.ctx.db().customers().populate(customer, populate).await?)
    }

    pub async fn list_by_seller(&self, acting: &Identity) -> ApiResult<Vec<Customer>> {
        Ok(self.ctx.db().customers().list_by_seller(&acting.id).await?)
    }

    /// Every customer, regardless of seller.
    pub async fn list_all(&self, _acting: &Identity) -> ApiResult<Vec<Customer>> {
        Ok(self.ctx.db().customers().list_all().await?)
    }

    /// Overwrite the contact fields of an owned customer.
    pub async fn update(
        &self,
        acting: &Identity,
        id: &str,
        input: CustomerInput,
    ) -> ApiResult<Customer> {
        validate_customer_input(&input)?;
        let input = normalize(input);

        self.load_owned(acting, id).await?;

        let customers = self.ctx.db().customers();
        if let Some(other) = customers.get_by_email(&input.email).await? {
            if other.id != id {
                return Err(CoreError::already_exists("Customer", &input.email).into());
            }
        }

        let customer = customers.update(id, &input).await?;

        info!(customer_id = %id, seller_id = %acting.id, "Customer updated");
        Ok(customer)
    }

    /// Delete an owned customer. Fails while any order references it.
    pub async fn delete(&self, acting: &Identity, id: &str) -> ApiResult<()> {
        self.load_owned(acting, id).await?;
        self.ctx.db().customers().delete(id).await?;

        info!(customer_id = %id, seller_id = %acting.id, "Customer deleted");
        Ok(())
    }

    async fn load_owned(&self, acting: &Identity, id: &str) -> ApiResult<Customer> {
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

fn normalize(input: CustomerInput) -> CustomerInput {
    CustomerInput {
        name: input.name.trim().to_string(),
        surname: input.surname.trim().to_string(),
        company: input.company.trim().to_string(),
        email: input.email.trim().to_string(),
        phone: input
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()),
    }
}
