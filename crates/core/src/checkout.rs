//! Cart to order assembly.

use chrono::Utc;
use jardim_shared::types::{OrderId, UserId};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::customer::{self, CustomerDetails};
use crate::hooks::run_best_effort;
use crate::notify::NotificationSender;
use crate::order::{
    LineItem, Order, PaymentStatus, UserInfo, add_amounts, items_subtotal, validate_items,
};
use crate::store::{self, EntityStore, Table};
use crate::workflow::{LifecycleError, OrderStatus};

/// A cart submitted for checkout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckoutRequest {
    /// Cart contents.
    pub items: Vec<LineItem>,
    /// Delivery, contact and payment details.
    pub user_info: UserInfo,
    /// Customer notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Item subtotal plus the flat shipping charge.
///
/// # Errors
///
/// Returns `Validation` if the total is out of range.
pub fn calculate_total(items: &[LineItem], shipping: Decimal) -> Result<Decimal, LifecycleError> {
    add_amounts(items_subtotal(items)?, shipping)
}

/// Turns carts into pending orders.
#[derive(Clone)]
pub struct CheckoutService {
    store: Arc<dyn EntityStore>,
    notifier: Arc<dyn NotificationSender>,
    shipping_cost: Decimal,
}

impl CheckoutService {
    /// Creates the service with a flat `shipping_cost`.
    #[must_use]
    pub fn new(
        store: Arc<dyn EntityStore>,
        notifier: Arc<dyn NotificationSender>,
        shipping_cost: Decimal,
    ) -> Self {
        Self {
            store,
            notifier,
            shipping_cost,
        }
    }

    /// Places an order for `customer`.
    ///
    /// The order is stored as `pending` with a pending payment; the
    /// customer registration and the confirmation email are best-effort.
    ///
    /// # Errors
    ///
    /// - `AuthenticationRequired` if `customer` is `None`
    /// - `EmptyCart` if there are no items
    /// - `Validation` if the user info or an item is invalid, or the total is out of range
    /// - `Persistence` if the store rejects the insert
    pub async fn place_order(
        &self,
        customer: Option<UserId>,
        request: CheckoutRequest,
    ) -> Result<Order, LifecycleError> {
        let customer = customer.ok_or(LifecycleError::AuthenticationRequired)?;
        if request.items.is_empty() {
            return Err(LifecycleError::EmptyCart);
        }
        request.user_info.validate()?;
        if !request.user_info.payment_method.offered_at_checkout() {
            return Err(LifecycleError::Validation(format!(
                "payment method {} is not available at checkout",
                request.user_info.payment_method
            )));
        }
        validate_items(&request.items)?;
        let total = calculate_total(&request.items, self.shipping_cost)?;

        let now = Utc::now();
        let order = Order {
            id: OrderId::new(),
            user_id: customer,
            total,
            items: request.items,
            status: OrderStatus::Pending,
            date: now,
            budget_id: None,
            payment_status: Some(PaymentStatus::Pending),
            payment_method: Some(request.user_info.payment_method),
            delivery_address: Some(request.user_info.delivery_address()),
            delivery_date: None,
            notes: request.notes,
            user_info: request.user_info,
            created_at: now,
            updated_at: now,
        };

        let order = store::create(self.store.as_ref(), Table::Orders, &order).await?;
        run_best_effort(
            "customer_registration",
            customer::register(
                self.store.as_ref(),
                customer,
                &CustomerDetails::from(&order.user_info),
            ),
        )
        .await;
        run_best_effort(
            "order_confirmation_notification",
            self.notifier.send_order_confirmation(&order),
        )
        .await;

        tracing::info!(order_id = %order.id, user_id = %customer, total = %order.total, "Order placed");
        Ok(order)
    }
}
