//! Tests for the order lifecycle manager.

use chrono::{Duration, Utc};
use jardim_shared::types::{OrderId, PageRequest, UserId};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;

use super::service::OrderLifecycleManager;
use super::types::{Order, OrderFilter, OrderPatch, PaymentStatus};
use crate::audit::{AuditAction, AuditLogWriter};
use crate::store::{self, MemoryStore, Table};
use crate::testing::{FlakyStore, Op, RecordingNotifier, sample_order};
use crate::workflow::{LifecycleError, LifecycleStatus, OrderStatus};

struct Harness {
    store: Arc<FlakyStore>,
    notifier: Arc<RecordingNotifier>,
    manager: OrderLifecycleManager,
    audit: AuditLogWriter,
}

fn harness_with(notifier: RecordingNotifier) -> Harness {
    let store = Arc::new(FlakyStore::new());
    let notifier = Arc::new(notifier);
    Harness {
        manager: OrderLifecycleManager::new(store.clone(), notifier.clone()),
        audit: AuditLogWriter::new(store.clone()),
        store,
        notifier,
    }
}

fn harness() -> Harness {
    harness_with(RecordingNotifier::default())
}

async fn seed(h: &Harness, status: OrderStatus) -> Order {
    store::create(h.store.as_ref(), Table::Orders, &sample_order(status))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_valid_transition_persists_audits_and_notifies() {
    let h = harness();
    let order = seed(&h, OrderStatus::Pending).await;
    let actor = UserId::new();

    let updated = h
        .manager
        .update_status(order.id, OrderStatus::Confirmed, actor)
        .await
        .unwrap();

    assert_eq!(updated.status, OrderStatus::Confirmed);
    assert!(updated.updated_at >= order.updated_at);
    assert_eq!(h.manager.get(order.id).await.unwrap().status, OrderStatus::Confirmed);

    let history = h.audit.history("orders", order.id.into_inner()).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action, AuditAction::Update);
    assert_eq!(history[0].old_data, json!({ "status": "pending" }));
    assert_eq!(history[0].new_data, json!({ "status": "confirmed" }));
    assert_eq!(history[0].changed_by, actor);

    assert_eq!(
        h.notifier.events(),
        vec![format!("order_status:{}:confirmed", order.id)]
    );
}

#[tokio::test]
async fn test_invalid_transition_changes_nothing() {
    let h = harness();
    let order = seed(&h, OrderStatus::Pending).await;

    let err = h
        .manager
        .update_status(order.id, OrderStatus::Delivered, UserId::new())
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Invalid status transition from pending to delivered"
    );
    assert_eq!(h.manager.get(order.id).await.unwrap().status, OrderStatus::Pending);
    assert_eq!(h.store.inner.count(Table::AuditLogs).await, 0);
    assert!(h.notifier.events().is_empty());
}

#[tokio::test]
async fn test_full_delivery_path_and_skips() {
    let h = harness();
    let order = seed(&h, OrderStatus::Pending).await;
    let actor = UserId::new();

    h.manager
        .update_status(order.id, OrderStatus::Confirmed, actor)
        .await
        .unwrap();
    assert!(matches!(
        h.manager
            .update_status(order.id, OrderStatus::Delivered, actor)
            .await,
        Err(LifecycleError::InvalidTransition { .. })
    ));

    for next in [
        OrderStatus::Processing,
        OrderStatus::Ready,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        let updated = h.manager.update_status(order.id, next, actor).await.unwrap();
        assert_eq!(updated.status, next);
    }

    let history = h.audit.history("orders", order.id.into_inner()).await.unwrap();
    assert_eq!(history.len(), 5);
    assert_eq!(history[4].new_data, json!({ "status": "delivered" }));
}

#[tokio::test]
async fn test_missing_order_is_not_found() {
    let h = harness();
    let err = h
        .manager
        .update_status(OrderId::new(), OrderStatus::Confirmed, UserId::new())
        .await
        .unwrap_err();
    assert!(matches!(err, LifecycleError::NotFound { entity: "Order", .. }));
}

#[tokio::test]
async fn test_persist_failure_skips_audit_and_notify() {
    let h = harness();
    let order = seed(&h, OrderStatus::Pending).await;
    h.store.fail(Op::Update, Table::Orders);

    let err = h
        .manager
        .update_status(order.id, OrderStatus::Confirmed, UserId::new())
        .await
        .unwrap_err();

    assert!(matches!(err, LifecycleError::Persistence(_)));
    assert_eq!(h.store.inner.count(Table::AuditLogs).await, 0);
    assert!(h.notifier.events().is_empty());
}

#[tokio::test]
async fn test_audit_and_notify_failures_are_swallowed() {
    let h = harness_with(RecordingNotifier::failing());
    let order = seed(&h, OrderStatus::Pending).await;
    h.store.fail(Op::Insert, Table::AuditLogs);

    let updated = h
        .manager
        .update_status(order.id, OrderStatus::Cancelled, UserId::new())
        .await
        .unwrap();

    assert_eq!(updated.status, OrderStatus::Cancelled);
    assert_eq!(h.store.inner.count(Table::AuditLogs).await, 0);
    assert_eq!(h.notifier.events().len(), 1);
}

#[tokio::test]
async fn test_terminal_self_loop_is_accepted() {
    let h = harness();
    let order = seed(&h, OrderStatus::Cancelled).await;

    let updated = h
        .manager
        .update_status(order.id, OrderStatus::Cancelled, UserId::new())
        .await
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Cancelled);
    assert_eq!(h.store.inner.count(Table::AuditLogs).await, 1);
}

#[tokio::test]
async fn test_list_filters_and_orders_newest_first() {
    let h = harness();
    let customer = UserId::new();
    let now = Utc::now();

    for (days_ago, status, owner) in [
        (3, OrderStatus::Pending, customer),
        (2, OrderStatus::Confirmed, customer),
        (1, OrderStatus::Pending, UserId::new()),
        (0, OrderStatus::Pending, customer),
    ] {
        let mut order = sample_order(status);
        order.user_id = owner;
        order.created_at = now - Duration::days(days_ago);
        store::create(h.store.as_ref(), Table::Orders, &order)
            .await
            .unwrap();
    }

    let mine = h
        .manager
        .list(
            &OrderFilter {
                user_id: Some(customer),
                ..OrderFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(mine.len(), 3);
    assert!(mine.windows(2).all(|w| w[0].created_at >= w[1].created_at));

    let pending_recent = h
        .manager
        .list(
            &OrderFilter {
                status: Some(OrderStatus::Pending),
                created_from: Some(now - Duration::hours(36)),
                ..OrderFilter::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(pending_recent.len(), 2);

    let second_page = h
        .manager
        .list(&OrderFilter::default(), PageRequest::new(2, 3))
        .await
        .unwrap();
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].created_at, now - Duration::days(3));
}

#[tokio::test]
async fn test_update_details_leaves_status_alone() {
    let h = harness();
    let order = seed(&h, OrderStatus::Processing).await;

    let patch = OrderPatch {
        payment_status: Some(PaymentStatus::Paid),
        notes: Some("Entregar pela manhã".to_string()),
        ..OrderPatch::default()
    };
    let updated = h.manager.update_details(order.id, &patch).await.unwrap();

    assert_eq!(updated.payment_status, Some(PaymentStatus::Paid));
    assert_eq!(updated.notes.as_deref(), Some("Entregar pela manhã"));
    assert_eq!(updated.status, OrderStatus::Processing);
    assert_eq!(updated.items, order.items);
}

#[test]
fn test_order_patch_rejects_status() {
    let result: Result<OrderPatch, _> =
        serde_json::from_value(json!({ "status": "delivered", "notes": "x" }));
    assert!(result.is_err());
}

#[tokio::test]
async fn test_delete() {
    let h = harness();
    let order = seed(&h, OrderStatus::Pending).await;

    h.manager.delete(order.id).await.unwrap();
    assert!(matches!(
        h.manager.get(order.id).await,
        Err(LifecycleError::NotFound { .. })
    ));
    assert!(matches!(
        h.manager.delete(order.id).await,
        Err(LifecycleError::NotFound { .. })
    ));
}

fn arb_order_status() -> impl Strategy<Value = OrderStatus> {
    proptest::sample::select(OrderStatus::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Accepted transitions write exactly one audit entry; rejected ones write none
    /// and leave the stored status unchanged.
    #[test]
    fn prop_update_status_matches_table(from in arb_order_status(), to in arb_order_status()) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(async {
            let store = Arc::new(MemoryStore::new());
            let manager = OrderLifecycleManager::new(
                store.clone(),
                Arc::new(RecordingNotifier::default()),
            );
            let order = store::create(store.as_ref(), Table::Orders, &sample_order(from))
                .await
                .unwrap();

            let result = manager.update_status(order.id, to, UserId::new()).await;
            let stored = manager.get(order.id).await.unwrap();
            let audits = store.count(Table::AuditLogs).await;

            if from.can_transition_to(to) {
                assert_eq!(result.unwrap().status, to);
                assert_eq!(stored.status, to);
                assert_eq!(audits, 1);
            } else {
                let is_invalid_transition =
                    matches!(result, Err(LifecycleError::InvalidTransition { .. }));
                assert!(is_invalid_transition);
                assert_eq!(stored.status, from);
                assert_eq!(audits, 0);
            }
        });
    }
}

#[test]
fn test_order_serializes_snake_case_keys() {
    let record = serde_json::to_value(sample_order(OrderStatus::Pending)).unwrap();
    assert_eq!(record["user_info"]["email"], "maria@example.com");
    assert!(record.get("userInfo").is_none());
    assert_eq!(record["payment_status"], "pending");
}
