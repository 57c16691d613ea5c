//! # Ownership Guard
//!
//! Customers and orders are scoped to the seller that created them. Every
//! seller-scoped read or write goes through [`ensure_owned`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load record ──► None? ──► NotFound                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ensure_owned(&record, &identity)                                       │
//! │       │                                                                 │
//! │       ├── record.seller_id() != identity.id ──► AccessDenied            │
//! │       │                                                                 │
//! │       └── OK ──► proceed                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult};
use crate::types::{Customer, Identity, Order};

/// A record that belongs to a seller.
pub trait SellerOwned {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    fn record_id(&self) -> &str;

    fn seller_id(&self) -> &str;
}

impl SellerOwned for Customer {
    const ENTITY: &'static str = "Customer";

    fn record_id(&self) -> &str {
        &self.id
    }

    fn seller_id(&self) -> &str {
        &self.seller_id
    }
}

impl SellerOwned for Order {
    const ENTITY: &'static str = "Order";

    fn record_id(&self) -> &str {
        &self.id
    }

    fn seller_id(&self) -> &str {
        &self.seller_id
    }
}

/// Fails with `AccessDenied` unless `record` belongs to the acting seller.
pub fn ensure_owned<T: SellerOwned>(record: &T, acting: &Identity) -> CoreResult<()> {
    if record.seller_id() != acting.id {
        return Err(CoreError::access_denied(T::ENTITY, record.record_id()));
    }

    Ok(())
}
