//! Budget domain types.

use chrono::{DateTime, Utc};
use jardim_shared::types::{BudgetId, OrderId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::customer::CustomerDetails;
use crate::order::{LineItem, UserInfo};
use crate::workflow::BudgetStatus;

/// A price quotation prepared by an employee for a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// Budget id.
    pub id: BudgetId,
    /// Customer the quotation is for.
    pub customer_id: UserId,
    /// Line item snapshots.
    pub items: Vec<LineItem>,
    /// Sum of line totals.
    pub subtotal: Decimal,
    /// Optional tax amount.
    #[serde(default)]
    pub tax: Option<Decimal>,
    /// Subtotal plus tax.
    pub total: Decimal,
    /// Lifecycle status.
    pub status: BudgetStatus,
    /// Expiry date.
    pub valid_until: DateTime<Utc>,
    /// Order produced by conversion. Set once.
    #[serde(default)]
    pub order_id: Option<OrderId>,
    /// Notes for the customer.
    #[serde(default)]
    pub notes: Option<String>,
    /// Employee who prepared the budget.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a budget.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateBudgetInput {
    /// Customer the quotation is for.
    pub customer_id: UserId,
    /// Contact details, required when the customer has never been seen.
    #[serde(default)]
    pub customer: Option<CustomerDetails>,
    /// Quoted items.
    pub items: Vec<LineItem>,
    /// Optional tax amount.
    #[serde(default)]
    pub tax: Option<Decimal>,
    /// Expiry date.
    pub valid_until: DateTime<Utc>,
    /// Notes for the customer.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Non-status fields that may be edited after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BudgetPatch {
    /// New notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// New expiry date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
}

impl BudgetPatch {
    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Filters for listing budgets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BudgetFilter {
    /// Only this customer.
    pub customer_id: Option<UserId>,
    /// Only this status.
    pub status: Option<BudgetStatus>,
}

/// Input for converting an accepted budget into an order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConvertBudgetInput {
    /// Customer who will own the order.
    pub customer_id: UserId,
    /// Delivery and contact snapshot for the order.
    pub user_info: UserInfo,
}
