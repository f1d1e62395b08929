//! Property-based tests for the transition tables.

use proptest::prelude::*;

use crate::workflow::error::LifecycleError;
use crate::workflow::transitions::{LifecycleStatus, ensure_transition};
use crate::workflow::types::{BudgetStatus, OrderStatus};

fn arb_order_status() -> impl Strategy<Value = OrderStatus> {
    proptest::sample::select(OrderStatus::ALL.to_vec())
}

fn arb_budget_status() -> impl Strategy<Value = BudgetStatus> {
    proptest::sample::select(BudgetStatus::ALL.to_vec())
}

/// Walks `steps` from `start`, always taking the first allowed edge.
fn walk<S: LifecycleStatus>(start: S, steps: usize) -> S {
    (0..steps).fold(start, |current, _| current.allowed_next()[0])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// ensure_transition agrees with the table for every pair.
    #[test]
    fn prop_order_validation_matches_table(
        from in arb_order_status(),
        to in arb_order_status()
    ) {
        let result = ensure_transition(from, to);
        if from.allowed_next().contains(&to) {
            prop_assert!(result.is_ok());
        } else {
            let is_invalid_transition = matches!(
                result,
                Err(LifecycleError::InvalidTransition { from: ref f, to: ref t })
                    if *f == from.as_str() && *t == to.as_str()
            );
            prop_assert!(is_invalid_transition);
        }
    }

    /// Same property for budgets.
    #[test]
    fn prop_budget_validation_matches_table(
        from in arb_budget_status(),
        to in arb_budget_status()
    ) {
        prop_assert_eq!(
            ensure_transition(from, to).is_ok(),
            from.allowed_next().contains(&to)
        );
    }

    /// Terminal order statuses accept only themselves.
    #[test]
    fn prop_terminal_orders_self_loop_only(from in arb_order_status(), to in arb_order_status()) {
        if from.is_terminal() {
            prop_assert_eq!(ensure_transition(from, to).is_ok(), from == to);
        }
    }

    /// Terminal budget statuses accept only themselves.
    #[test]
    fn prop_terminal_budgets_self_loop_only(from in arb_budget_status(), to in arb_budget_status()) {
        if from.is_terminal() {
            prop_assert_eq!(ensure_transition(from, to).is_ok(), from == to);
        }
    }

    /// Non-terminal statuses never list themselves.
    #[test]
    fn prop_non_terminal_have_no_self_loop(status in arb_order_status()) {
        if !status.is_terminal() {
            prop_assert!(!status.can_transition_to(status));
        }
    }

    /// Following table edges from pending always ends in a terminal status.
    #[test]
    fn prop_every_order_walk_reaches_terminal(steps in 10usize..20) {
        prop_assert!(walk(OrderStatus::Pending, steps).is_terminal());
    }

    /// Nothing leads back to pending or draft.
    #[test]
    fn prop_no_edge_returns_to_initial(order in arb_order_status(), budget in arb_budget_status()) {
        prop_assert!(!order.can_transition_to(OrderStatus::Pending));
        prop_assert!(!budget.can_transition_to(BudgetStatus::Draft));
    }
}
