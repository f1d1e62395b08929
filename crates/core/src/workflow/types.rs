//! Status types for the order and budget lifecycles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status in the delivery lifecycle.
///
/// Orders start in `Pending` (checkout) or `Confirmed` (budget conversion).
/// `Delivered`, `Cancelled` and `Rejected` are terminal. See
/// [`crate::workflow::transitions`] for the full table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Awaiting review by the store.
    Pending,
    /// Customer asked for a quotation.
    Quotation,
    /// Quotation sent to the customer.
    Quoted,
    /// Order confirmed by the customer.
    Confirmed,
    /// Being prepared.
    Processing,
    /// Ready for delivery or pickup.
    Ready,
    /// Handed to the carrier.
    Shipped,
    /// Delivered to the customer (terminal).
    Delivered,
    /// Cancelled (terminal).
    Cancelled,
    /// Quotation rejected (terminal).
    Rejected,
}

impl OrderStatus {
    /// Every order status, in lifecycle order.
    pub const ALL: [Self; 10] = [
        Self::Pending,
        Self::Quotation,
        Self::Quoted,
        Self::Confirmed,
        Self::Processing,
        Self::Ready,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
        Self::Rejected,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Quotation => "quotation",
            Self::Quoted => "quoted",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Budget (quotation) status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    /// Being prepared by an employee.
    Draft,
    /// Sent to the customer for review.
    Sent,
    /// Accepted by the customer (terminal; eligible for conversion).
    Accepted,
    /// Rejected by the customer (terminal).
    Rejected,
    /// Validity date passed before a decision (terminal).
    Expired,
}

impl BudgetStatus {
    /// Every budget status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::Sent,
        Self::Accepted,
        Self::Rejected,
        Self::Expired,
    ];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Returns true if the expiry sweep may move this budget to `Expired`.
    #[must_use]
    pub const fn can_expire(&self) -> bool {
        matches!(self, Self::Draft | Self::Sent)
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_round_trip_strings() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_order_status_parse_is_case_insensitive() {
        assert_eq!(OrderStatus::parse("SHIPPED"), Some(OrderStatus::Shipped));
        assert_eq!(OrderStatus::parse(" Ready "), Some(OrderStatus::Ready));
        assert_eq!(OrderStatus::parse("lost"), None);
    }

    #[test]
    fn test_budget_status_parse() {
        assert_eq!(BudgetStatus::parse("draft"), Some(BudgetStatus::Draft));
        assert_eq!(BudgetStatus::parse("Accepted"), Some(BudgetStatus::Accepted));
        assert_eq!(BudgetStatus::parse("converted"), None);
    }

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_value(OrderStatus::Processing).unwrap(),
            serde_json::json!("processing")
        );
        let status: BudgetStatus = serde_json::from_value(serde_json::json!("expired")).unwrap();
        assert_eq!(status, BudgetStatus::Expired);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", OrderStatus::Cancelled), "cancelled");
        assert_eq!(format!("{}", BudgetStatus::Sent), "sent");
    }

    #[test]
    fn test_can_expire() {
        assert!(BudgetStatus::Draft.can_expire());
        assert!(BudgetStatus::Sent.can_expire());
        assert!(!BudgetStatus::Accepted.can_expire());
        assert!(!BudgetStatus::Rejected.can_expire());
        assert!(!BudgetStatus::Expired.can_expire());
    }
}
