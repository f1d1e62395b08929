//! Test doubles and fixtures shared by the unit tests.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jardim_shared::types::{BudgetId, OrderId, UserId};
use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::budget::Budget;
use crate::notify::{NotificationSender, NotifyError};
use crate::order::{LineItem, Order, PaymentMethod, PaymentStatus, UserInfo};
use crate::store::{EntityStore, MemoryStore, Query, Record, StoreError, Table};
use crate::workflow::{BudgetStatus, OrderStatus};

pub fn sample_items() -> Vec<LineItem> {
    vec![
        LineItem {
            product_id: "pedra-sao-tome".to_string(),
            name: "Pedra São Tomé".to_string(),
            price: dec!(45.00),
            quantity: 2,
            category: "pedras".to_string(),
            unit: Some("m²".to_string()),
        },
        LineItem {
            product_id: "bloquete-16".to_string(),
            name: "Bloquete 16 faces".to_string(),
            price: dec!(22.00),
            quantity: 1,
            category: "bloquetes".to_string(),
            unit: None,
        },
    ]
}

pub fn sample_user_info() -> UserInfo {
    UserInfo {
        name: "Maria Silva".to_string(),
        email: "maria@example.com".to_string(),
        phone: Some("19 99999-0000".to_string()),
        address: "Rua das Flores 10".to_string(),
        city: "Campinas".to_string(),
        zip: "13000-000".to_string(),
        payment_method: PaymentMethod::Pix,
    }
}

pub fn sample_order(status: OrderStatus) -> Order {
    let now = Utc::now();
    let user_info = sample_user_info();
    Order {
        id: OrderId::new(),
        user_id: UserId::new(),
        items: sample_items(),
        total: dec!(162.00),
        status,
        date: now,
        budget_id: None,
        payment_status: Some(PaymentStatus::Pending),
        payment_method: Some(user_info.payment_method),
        delivery_address: Some(user_info.delivery_address()),
        delivery_date: None,
        notes: None,
        user_info,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_budget(status: BudgetStatus) -> Budget {
    let now = Utc::now();
    Budget {
        id: BudgetId::new(),
        customer_id: UserId::new(),
        items: sample_items(),
        subtotal: dec!(112.00),
        tax: None,
        total: dec!(112.00),
        status,
        valid_until: now + Duration::days(15),
        order_id: None,
        notes: None,
        created_by: UserId::new(),
        created_at: now,
        updated_at: now,
    }
}

/// Store operations that [`FlakyStore`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Get,
    Insert,
    Update,
    Delete,
    Query,
}

/// A [`MemoryStore`] whose operations can be made to fail per table.
#[derive(Debug, Clone, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    failing: Arc<Mutex<HashSet<(Op, Table)>>>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, op: Op, table: Table) {
        self.failing.lock().unwrap().insert((op, table));
    }

    pub fn heal(&self, op: Op, table: Table) {
        self.failing.lock().unwrap().remove(&(op, table));
    }

    fn check(&self, op: Op, table: Table) -> Result<(), StoreError> {
        if self.failing.lock().unwrap().contains(&(op, table)) {
            return Err(StoreError::Backend(format!("injected {op:?} failure on {table}")));
        }
        Ok(())
    }
}

#[async_trait]
impl EntityStore for FlakyStore {
    async fn get(&self, table: Table, id: Uuid) -> Result<Record, StoreError> {
        self.check(Op::Get, table)?;
        self.inner.get(table, id).await
    }

    async fn insert(&self, table: Table, record: Record) -> Result<Record, StoreError> {
        self.check(Op::Insert, table)?;
        self.inner.insert(table, record).await
    }

    async fn update(&self, table: Table, id: Uuid, patch: Record) -> Result<Record, StoreError> {
        self.check(Op::Update, table)?;
        self.inner.update(table, id, patch).await
    }

    async fn delete(&self, table: Table, id: Uuid) -> Result<(), StoreError> {
        self.check(Op::Delete, table)?;
        self.inner.delete(table, id).await
    }

    async fn query(&self, table: Table, query: &Query) -> Result<Vec<Record>, StoreError> {
        self.check(Op::Query, table)?;
        self.inner.query(table, query).await
    }
}

/// Records every notification as `"kind:id"` and optionally fails them all.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            events: Mutex::default(),
            fail: true,
        }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, kind: &str, id: impl std::fmt::Display) -> Result<(), NotifyError> {
        self.events.lock().unwrap().push(format!("{kind}:{id}"));
        if self.fail {
            return Err(NotifyError::Delivery("smtp unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationSender for RecordingNotifier {
    async fn send_order_status_update(&self, order: &Order) -> Result<(), NotifyError> {
        self.record("order_status", format!("{}:{}", order.id, order.status))
    }

    async fn send_order_confirmation(&self, order: &Order) -> Result<(), NotifyError> {
        self.record("order_confirmation", order.id)
    }

    async fn send_budget_notification(&self, budget: &Budget) -> Result<(), NotifyError> {
        self.record("budget_created", budget.id)
    }

    async fn send_budget_status_update(&self, budget: &Budget) -> Result<(), NotifyError> {
        self.record("budget_status", format!("{}:{}", budget.id, budget.status))
    }
}
