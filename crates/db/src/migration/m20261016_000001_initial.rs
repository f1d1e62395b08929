//! Initial database migration.
//!
//! Creates the customers, orders, budgets and audit_logs tables with their
//! status checks, the one-order-per-budget indexes and the append-only
//! guard on audit_logs.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(CUSTOMERS_SQL).await?;
        db.execute_unprepared(BUDGETS_SQL).await?;
        db.execute_unprepared(ORDERS_SQL).await?;
        db.execute_unprepared(AUDIT_LOGS_SQL).await?;
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const CUSTOMERS_SQL: &str = r"
CREATE TABLE customers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255),
    phone VARCHAR(50)
);
";

const BUDGETS_SQL: &str = r"
CREATE TABLE budgets (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    customer_id UUID NOT NULL REFERENCES customers(id) ON DELETE RESTRICT,
    items JSONB NOT NULL DEFAULT '[]'::jsonb,
    subtotal NUMERIC(12, 2) NOT NULL,
    tax NUMERIC(12, 2),
    total NUMERIC(12, 2) NOT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'draft',
    valid_until TIMESTAMPTZ NOT NULL,
    order_id UUID,
    notes TEXT,
    created_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_budget_status CHECK (
        status IN ('draft', 'sent', 'accepted', 'rejected', 'expired')
    ),
    CONSTRAINT chk_budget_amounts CHECK (subtotal >= 0 AND total >= 0 AND (tax IS NULL OR tax >= 0)),
    CONSTRAINT chk_budget_order_needs_acceptance CHECK (order_id IS NULL OR status = 'accepted')
);

-- A budget produces at most one order
CREATE UNIQUE INDEX idx_budgets_order ON budgets(order_id) WHERE order_id IS NOT NULL;

-- Expiry sweep
CREATE INDEX idx_budgets_expiry ON budgets(valid_until) WHERE status IN ('draft', 'sent');

CREATE INDEX idx_budgets_customer ON budgets(customer_id, created_at DESC);
";

const ORDERS_SQL: &str = r"
CREATE TABLE orders (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL,
    items JSONB NOT NULL DEFAULT '[]'::jsonb,
    total NUMERIC(12, 2) NOT NULL,
    user_info JSONB NOT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'pending',
    date TIMESTAMPTZ NOT NULL DEFAULT now(),
    budget_id UUID REFERENCES budgets(id) ON DELETE SET NULL,
    payment_status VARCHAR(20),
    payment_method VARCHAR(20),
    delivery_address TEXT,
    delivery_date TIMESTAMPTZ,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_order_status CHECK (
        status IN (
            'pending', 'quotation', 'quoted', 'confirmed', 'processing',
            'ready', 'shipped', 'delivered', 'cancelled', 'rejected'
        )
    ),
    CONSTRAINT chk_order_payment_status CHECK (
        payment_status IS NULL OR payment_status IN ('pending', 'paid', 'failed', 'refunded')
    ),
    CONSTRAINT chk_order_payment_method CHECK (
        payment_method IS NULL OR payment_method IN ('credit', 'debit', 'pix', 'boleto', 'cash')
    ),
    CONSTRAINT chk_order_total CHECK (total >= 0)
);

-- Conversion reconciliation looks orders up by budget
CREATE UNIQUE INDEX idx_orders_budget ON orders(budget_id) WHERE budget_id IS NOT NULL;

CREATE INDEX idx_orders_user ON orders(user_id, created_at DESC);
CREATE INDEX idx_orders_status ON orders(status, created_at DESC);

ALTER TABLE budgets
    ADD CONSTRAINT fk_budgets_order FOREIGN KEY (order_id) REFERENCES orders(id) ON DELETE SET NULL;
";

const AUDIT_LOGS_SQL: &str = r"
CREATE TABLE audit_logs (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    table_name VARCHAR(50) NOT NULL,
    record_id UUID NOT NULL,
    action VARCHAR(20) NOT NULL,
    old_data JSONB NOT NULL DEFAULT '{}'::jsonb,
    new_data JSONB NOT NULL DEFAULT '{}'::jsonb,
    changed_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_audit_action CHECK (action IN ('UPDATE', 'CONVERSION'))
);

-- History lookup for one record
CREATE INDEX idx_audit_logs_record ON audit_logs(table_name, record_id, created_at);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_audit_modification
-- Audit entries are append-only
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_audit_modification()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'audit_logs is append-only';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_audit_logs_append_only
BEFORE UPDATE OR DELETE ON audit_logs
FOR EACH ROW
EXECUTE FUNCTION prevent_audit_modification();
";

const DROP_ALL_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_audit_logs_append_only ON audit_logs;
DROP FUNCTION IF EXISTS prevent_audit_modification();
DROP TABLE IF EXISTS audit_logs CASCADE;
ALTER TABLE IF EXISTS budgets DROP CONSTRAINT IF EXISTS fk_budgets_order;
DROP TABLE IF EXISTS orders CASCADE;
DROP TABLE IF EXISTS budgets CASCADE;
DROP TABLE IF EXISTS customers CASCADE;
";
