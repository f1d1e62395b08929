//! Order domain types.

use chrono::{DateTime, Utc};
use jardim_shared::types::{BudgetId, OrderId, UserId, round_money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::{Validate, ValidationError};

use crate::workflow::{LifecycleError, OrderStatus};

/// A product snapshot copied into an order or budget.
///
/// Later catalog edits never alter stored line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct LineItem {
    /// Catalog id of the product at the time of purchase.
    #[serde(default)]
    pub product_id: String,
    /// Product name.
    #[validate(length(min = 1, message = "item name is required"))]
    pub name: String,
    /// Unit price.
    #[validate(custom(function = "non_negative", message = "price must not be negative"))]
    pub price: Decimal,
    /// Units ordered.
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: u32,
    /// Product category.
    #[serde(default)]
    pub category: String,
    /// Sale unit ("m²", "kg", "unidade").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl LineItem {
    /// Unit price times quantity, rounded to cents.
    ///
    /// Returns `None` if the product overflows.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.price
            .checked_mul(Decimal::from(self.quantity))
            .map(round_money)
    }
}

/// Largest amount an order or budget column can hold (`NUMERIC(12, 2)`).
#[must_use]
pub fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

fn out_of_range() -> LifecycleError {
    LifecycleError::Validation("amount out of range".to_string())
}

/// Adds two amounts, rejecting sums above [`max_amount`].
///
/// # Errors
///
/// Returns `Validation` if the sum overflows or exceeds the storable range.
pub fn add_amounts(a: Decimal, b: Decimal) -> Result<Decimal, LifecycleError> {
    a.checked_add(b)
        .filter(|sum| *sum <= max_amount())
        .ok_or_else(out_of_range)
}

/// Sum of line totals.
///
/// # Errors
///
/// Returns `Validation` if a line or the sum is out of range.
pub fn items_subtotal(items: &[LineItem]) -> Result<Decimal, LifecycleError> {
    items.iter().try_fold(Decimal::ZERO, |sum, item| {
        let line = item.line_total().ok_or_else(out_of_range)?;
        add_amounts(sum, line)
    })
}

/// Validates every line item.
///
/// # Errors
///
/// Returns `Validation` naming the first offending item.
pub fn validate_items(items: &[LineItem]) -> Result<(), LifecycleError> {
    for (index, item) in items.iter().enumerate() {
        item.validate()
            .map_err(|e| LifecycleError::Validation(format!("item {index}: {e}")))?;
    }
    Ok(())
}

pub(crate) fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("non_negative"));
    }
    Ok(())
}

/// Payment method recorded on an order. No gateway is involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Credit card.
    Credit,
    /// Debit card.
    Debit,
    /// PIX instant transfer.
    Pix,
    /// Bank slip.
    Boleto,
    /// Cash on delivery.
    Cash,
}

impl PaymentMethod {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
            Self::Pix => "pix",
            Self::Boleto => "boleto",
            Self::Cash => "cash",
        }
    }

    /// Returns true if customers may choose this method at checkout.
    #[must_use]
    pub const fn offered_at_checkout(&self) -> bool {
        matches!(self, Self::Credit | Self::Debit | Self::Pix)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment state recorded on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Not paid yet.
    Pending,
    /// Paid.
    Paid,
    /// Payment failed.
    Failed,
    /// Refunded.
    Refunded,
}

/// Delivery and contact snapshot taken at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UserInfo {
    /// Customer name.
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// Contact email.
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    /// Contact phone.
    #[serde(default)]
    pub phone: Option<String>,
    /// Street address.
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    /// City.
    #[validate(length(min = 1, message = "city is required"))]
    pub city: String,
    /// Postal code.
    #[validate(length(min = 1, message = "zip is required"))]
    pub zip: String,
    /// Chosen payment method.
    pub payment_method: PaymentMethod,
}

impl UserInfo {
    /// Address, city and zip joined as `"address, city - zip"`.
    #[must_use]
    pub fn delivery_address(&self) -> String {
        format!("{}, {} - {}", self.address, self.city, self.zip)
    }
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order id.
    pub id: OrderId,
    /// Owning customer.
    pub user_id: UserId,
    /// Line item snapshots.
    pub items: Vec<LineItem>,
    /// Amount due, shipping included.
    pub total: Decimal,
    /// Contact and delivery snapshot.
    ///
    /// Serialized as `user_info` like every other field; the storefront and
    /// the `orders.user_info` column use the snake_case name.
    pub user_info: UserInfo,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Order date.
    pub date: DateTime<Utc>,
    /// Budget this order was converted from.
    #[serde(default)]
    pub budget_id: Option<BudgetId>,
    /// Payment state.
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
    /// Payment method.
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    /// Free-form delivery address.
    #[serde(default)]
    pub delivery_address: Option<String>,
    /// Scheduled delivery date.
    #[serde(default)]
    pub delivery_date: Option<DateTime<Utc>>,
    /// Internal notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Non-status fields that may be edited after creation.
///
/// Unknown keys, including `status`, are rejected when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderPatch {
    /// New payment state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    /// New payment method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    /// New delivery address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    /// New delivery date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_date: Option<DateTime<Utc>>,
    /// New notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OrderPatch {
    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Filters for listing orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OrderFilter {
    /// Only this status.
    pub status: Option<OrderStatus>,
    /// Only this customer.
    pub user_id: Option<UserId>,
    /// Created at or after.
    pub created_from: Option<DateTime<Utc>>,
    /// Created at or before.
    pub created_to: Option<DateTime<Utc>>,
}
