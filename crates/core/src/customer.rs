//! Customer contact records.
//!
//! Customers share their id with the authenticated user. Budget
//! notifications look up the recipient here. Records are registered at
//! checkout and when staff quote a customer for the first time.

use jardim_shared::types::UserId;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::order::UserInfo;
use crate::store::{self, EntityStore, StoreError, Table};

/// A customer's contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer (user) id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address, if known.
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number, if known.
    #[serde(default)]
    pub phone: Option<String>,
}

impl Customer {
    /// Returns the email address unless it is missing or blank.
    #[must_use]
    pub fn contact_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

/// Contact details supplied when registering a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct CustomerDetails {
    /// Display name.
    #[validate(length(min = 1, message = "customer name is required"))]
    pub name: String,
    /// Email address.
    #[validate(email(message = "customer email is invalid"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl From<&UserInfo> for CustomerDetails {
    fn from(info: &UserInfo) -> Self {
        Self {
            name: info.name.clone(),
            email: Some(info.email.clone()),
            phone: info.phone.clone(),
        }
    }
}

/// Creates the customer record or refreshes its details.
///
/// Fields missing from `details` keep their stored value.
///
/// # Errors
///
/// Returns the store error if the lookup or write fails.
pub async fn register(
    store: &dyn EntityStore,
    id: UserId,
    details: &CustomerDetails,
) -> Result<Customer, StoreError> {
    match store.get(Table::Customers, id.into_inner()).await {
        Ok(_) => {
            let changes = serde_json::to_value(details)?;
            store::patch(store, Table::Customers, id.into_inner(), changes).await
        }
        Err(StoreError::NotFound { .. }) => {
            let customer = Customer {
                id,
                name: details.name.clone(),
                email: details.email.clone(),
                phone: details.phone.clone(),
            };
            let customer = store::create(store, Table::Customers, &customer).await?;
            tracing::info!(customer_id = %id, "Customer registered");
            Ok(customer)
        }
        Err(err) => Err(err),
    }
}
