use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{
    ActivityLog, Alert, AlertReason, AlertType, Chemical, Pagination, PurchaseOrder,
    PurchaseOrderLine, SeverityCounts, Supplier,
};
use sqlx::{types::Json, FromRow, PgPool, Postgres, QueryBuilder};
use std::collections::HashSet;
use uuid::Uuid;

use super::{
    ActivityLogFilter, AlertFilter, ChemicalFilter, InventoryStore, Page, PurchaseOrderFilter,
};
use crate::error::{AppError, AppResult};

const CHEMICAL_COLUMNS: &str = "id, name, formula, category, quantity, unit, batch_no, \
    expiry_date, reorder_threshold, supplier, cost_per_unit, location, status, \
    last_updated, created_at, updated_at";

const ALERT_COLUMNS: &str = "id, alert_type, title, message, chemical_id, reason, severity, \
    is_read, action_required, timestamp, resolved_at, resolved_by, created_at, updated_at";

const PURCHASE_ORDER_COLUMNS: &str = "id, po_number, supplier, lines, total_amount, \
    order_date, expected_delivery, actual_delivery, status, priority, notes, version, \
    created_at, updated_at";

const ACTIVITY_LOG_COLUMNS: &str =
    "id, action, category, severity, user_name, details, metadata, timestamp";

const SUPPLIER_COLUMNS: &str = "id, name, contact, email, phone, address, rating, chemicals, \
    last_order_date, total_orders, status, created_at, updated_at";

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromRow)]
struct ChemicalRow {
    id: Uuid,
    name: String,
    formula: Option<String>,
    category: String,
    quantity: Decimal,
    unit: String,
    batch_no: String,
    expiry_date: DateTime<Utc>,
    reorder_threshold: Decimal,
    supplier: String,
    cost_per_unit: Decimal,
    location: String,
    status: String,
    last_updated: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ChemicalRow> for Chemical {
    type Error = AppError;

    fn try_from(row: ChemicalRow) -> AppResult<Self> {
        Ok(Chemical {
            id: row.id,
            name: row.name,
            formula: row.formula,
            category: row.category.parse()?,
            quantity: row.quantity,
            unit: row.unit.parse()?,
            batch_no: row.batch_no,
            expiry_date: row.expiry_date,
            reorder_threshold: row.reorder_threshold,
            supplier: row.supplier,
            cost_per_unit: row.cost_per_unit,
            location: row.location,
            status: row.status.parse()?,
            last_updated: row.last_updated,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct AlertRow {
    id: Uuid,
    alert_type: String,
    title: String,
    message: String,
    chemical_id: Option<Uuid>,
    reason: Option<String>,
    severity: String,
    is_read: bool,
    action_required: bool,
    timestamp: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
    resolved_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AlertRow> for Alert {
    type Error = AppError;

    fn try_from(row: AlertRow) -> AppResult<Self> {
        Ok(Alert {
            id: row.id,
            alert_type: row.alert_type.parse()?,
            title: row.title,
            message: row.message,
            chemical_id: row.chemical_id,
            reason: row.reason.map(|r| r.parse::<AlertReason>()).transpose()?,
            severity: row.severity.parse()?,
            is_read: row.is_read,
            action_required: row.action_required,
            timestamp: row.timestamp,
            resolved_at: row.resolved_at,
            resolved_by: row.resolved_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct PurchaseOrderRow {
    id: Uuid,
    po_number: String,
    supplier: String,
    lines: Json<Vec<PurchaseOrderLine>>,
    total_amount: Decimal,
    order_date: DateTime<Utc>,
    expected_delivery: DateTime<Utc>,
    actual_delivery: Option<DateTime<Utc>>,
    status: String,
    priority: String,
    notes: Option<String>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PurchaseOrderRow> for PurchaseOrder {
    type Error = AppError;

    fn try_from(row: PurchaseOrderRow) -> AppResult<Self> {
        Ok(PurchaseOrder {
            id: row.id,
            po_number: row.po_number,
            supplier: row.supplier,
            lines: row.lines.0,
            total_amount: row.total_amount,
            order_date: row.order_date,
            expected_delivery: row.expected_delivery,
            actual_delivery: row.actual_delivery,
            status: row.status.parse()?,
            priority: row.priority.parse()?,
            notes: row.notes,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ActivityLogRow {
    id: Uuid,
    action: String,
    category: String,
    severity: String,
    user_name: String,
    details: String,
    metadata: serde_json::Value,
    timestamp: DateTime<Utc>,
}

impl TryFrom<ActivityLogRow> for ActivityLog {
    type Error = AppError;

    fn try_from(row: ActivityLogRow) -> AppResult<Self> {
        Ok(ActivityLog {
            id: row.id,
            action: row.action,
            category: row.category.parse()?,
            severity: row.severity.parse()?,
            user: row.user_name,
            details: row.details,
            metadata: row.metadata,
            timestamp: row.timestamp,
        })
    }
}

#[derive(Debug, FromRow)]
struct SupplierRow {
    id: Uuid,
    name: String,
    contact: String,
    email: String,
    phone: String,
    address: String,
    rating: Decimal,
    chemicals: Vec<String>,
    last_order_date: Option<DateTime<Utc>>,
    total_orders: i32,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SupplierRow> for Supplier {
    type Error = AppError;

    fn try_from(row: SupplierRow) -> AppResult<Self> {
        Ok(Supplier {
            id: row.id,
            name: row.name,
            contact: row.contact,
            email: row.email,
            phone: row.phone,
            address: row.address,
            rating: row.rating,
            chemicals: row.chemicals,
            last_order_date: row.last_order_date,
            total_orders: row.total_orders,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> AppResult<Vec<T>>
where
    T: TryFrom<R, Error = AppError>,
{
    rows.into_iter().map(T::try_from).collect()
}

fn like_pattern(term: &str) -> String {
    format!("%{}%", term.replace('%', "\\%").replace('_', "\\_"))
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn insert_chemical(&self, chemical: &Chemical) -> AppResult<()> {
        sqlx::query(&format!(
            "INSERT INTO chemicals ({CHEMICAL_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)"
        ))
        .bind(chemical.id)
        .bind(&chemical.name)
        .bind(&chemical.formula)
        .bind(chemical.category.as_str())
        .bind(chemical.quantity)
        .bind(chemical.unit.as_str())
        .bind(&chemical.batch_no)
        .bind(chemical.expiry_date)
        .bind(chemical.reorder_threshold)
        .bind(&chemical.supplier)
        .bind(chemical.cost_per_unit)
        .bind(&chemical.location)
        .bind(chemical.status.as_str())
        .bind(chemical.last_updated)
        .bind(chemical.created_at)
        .bind(chemical.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| AppError::from_unique(e, "batchNo"))?;

        Ok(())
    }

    async fn get_chemical(&self, id: Uuid) -> AppResult<Option<Chemical>> {
        sqlx::query_as::<_, ChemicalRow>(&format!(
            "SELECT {CHEMICAL_COLUMNS} FROM chemicals WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .map(Chemical::try_from)
        .transpose()
    }

    async fn list_chemicals(
        &self,
        filter: &ChemicalFilter,
        pagination: Pagination,
    ) -> AppResult<Page<Chemical>> {
        let category = filter.category.map(|c| c.as_str());
        let status = filter.status.map(|s| s.as_str());
        let search = filter.search.as_deref().map(like_pattern);

        let conditions = r#"
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL OR status = $2)
              AND ($3::text IS NULL OR name ILIKE $3 OR formula ILIKE $3 OR batch_no ILIKE $3)
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM chemicals {conditions}"
        ))
        .bind(category)
        .bind(status)
        .bind(&search)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, ChemicalRow>(&format!(
            "SELECT {CHEMICAL_COLUMNS} FROM chemicals {conditions} \
             ORDER BY created_at DESC, id LIMIT $4 OFFSET $5"
        ))
        .bind(category)
        .bind(status)
        .bind(&search)
        .bind(i64::from(pagination.limit))
        .bind(pagination.offset() as i64)
        .fetch_all(&self.db)
        .await?;

        Ok(Page {
            items: convert_all(rows)?,
            total: total as u64,
        })
    }

    async fn all_chemicals(&self) -> AppResult<Vec<Chemical>> {
        let rows = sqlx::query_as::<_, ChemicalRow>(&format!(
            "SELECT {CHEMICAL_COLUMNS} FROM chemicals ORDER BY created_at, id"
        ))
        .fetch_all(&self.db)
        .await?;

        convert_all(rows)
    }

    async fn update_chemical(&self, chemical: &Chemical) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE chemicals
            SET name = $2, formula = $3, category = $4, quantity = $5, unit = $6,
                batch_no = $7, expiry_date = $8, reorder_threshold = $9, supplier = $10,
                cost_per_unit = $11, location = $12, status = $13, last_updated = $14,
                updated_at = $15
            WHERE id = $1
            "#,
        )
        .bind(chemical.id)
        .bind(&chemical.name)
        .bind(&chemical.formula)
        .bind(chemical.category.as_str())
        .bind(chemical.quantity)
        .bind(chemical.unit.as_str())
        .bind(&chemical.batch_no)
        .bind(chemical.expiry_date)
        .bind(chemical.reorder_threshold)
        .bind(&chemical.supplier)
        .bind(chemical.cost_per_unit)
        .bind(&chemical.location)
        .bind(chemical.status.as_str())
        .bind(chemical.last_updated)
        .bind(chemical.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| AppError::from_unique(e, "batchNo"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_chemical(&self, id: Uuid) -> AppResult<Option<Chemical>> {
        sqlx::query_as::<_, ChemicalRow>(&format!(
            "DELETE FROM chemicals WHERE id = $1 RETURNING {CHEMICAL_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .map(Chemical::try_from)
        .transpose()
    }

    async fn existing_chemical_ids(&self, ids: &[Uuid]) -> AppResult<HashSet<Uuid>> {
        let found = sqlx::query_scalar::<_, Uuid>("SELECT id FROM chemicals WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.db)
            .await?;

        Ok(found.into_iter().collect())
    }

    async fn insert_alerts(&self, alerts: &[Alert]) -> AppResult<u64> {
        if alerts.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO alerts ({ALERT_COLUMNS}) "));
        builder.push_values(alerts, |mut row, alert| {
            row.push_bind(alert.id)
                .push_bind(alert.alert_type.as_str())
                .push_bind(&alert.title)
                .push_bind(&alert.message)
                .push_bind(alert.chemical_id)
                .push_bind(alert.reason.map(|r| r.as_str()))
                .push_bind(alert.severity.as_str())
                .push_bind(alert.is_read)
                .push_bind(alert.action_required)
                .push_bind(alert.timestamp)
                .push_bind(alert.resolved_at)
                .push_bind(&alert.resolved_by)
                .push_bind(alert.created_at)
                .push_bind(alert.updated_at);
        });

        let result = builder.build().execute(&self.db).await?;
        Ok(result.rows_affected())
    }

    async fn get_alert(&self, id: Uuid) -> AppResult<Option<Alert>> {
        sqlx::query_as::<_, AlertRow>(&format!("SELECT {ALERT_COLUMNS} FROM alerts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .map(Alert::try_from)
            .transpose()
    }

    async fn list_alerts(
        &self,
        filter: &AlertFilter,
        pagination: Pagination,
    ) -> AppResult<Page<Alert>> {
        let alert_type = filter.alert_type.map(|t| t.as_str());
        let severity = filter.severity.map(|s| s.as_str());

        let conditions = r#"
            WHERE ($1::text IS NULL OR alert_type = $1)
              AND ($2::text IS NULL OR severity = $2)
              AND ($3::boolean IS NULL OR is_read = $3)
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM alerts {conditions}"))
            .bind(alert_type)
            .bind(severity)
            .bind(filter.is_read)
            .fetch_one(&self.db)
            .await?;

        let rows = sqlx::query_as::<_, AlertRow>(&format!(
            "SELECT {ALERT_COLUMNS} FROM alerts {conditions} \
             ORDER BY timestamp DESC, id LIMIT $4 OFFSET $5"
        ))
        .bind(alert_type)
        .bind(severity)
        .bind(filter.is_read)
        .bind(i64::from(pagination.limit))
        .bind(pagination.offset() as i64)
        .fetch_all(&self.db)
        .await?;

        Ok(Page {
            items: convert_all(rows)?,
            total: total as u64,
        })
    }

    async fn all_alerts(&self) -> AppResult<Vec<Alert>> {
        let rows = sqlx::query_as::<_, AlertRow>(&format!(
            "SELECT {ALERT_COLUMNS} FROM alerts ORDER BY timestamp DESC, id"
        ))
        .fetch_all(&self.db)
        .await?;

        convert_all(rows)
    }

    async fn update_alert(&self, alert: &Alert) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE alerts
            SET alert_type = $2, title = $3, message = $4, chemical_id = $5, reason = $6,
                severity = $7, is_read = $8, action_required = $9, timestamp = $10,
                resolved_at = $11, resolved_by = $12, updated_at = $13
            WHERE id = $1
            "#,
        )
        .bind(alert.id)
        .bind(alert.alert_type.as_str())
        .bind(&alert.title)
        .bind(&alert.message)
        .bind(alert.chemical_id)
        .bind(alert.reason.map(|r| r.as_str()))
        .bind(alert.severity.as_str())
        .bind(alert.is_read)
        .bind(alert.action_required)
        .bind(alert.timestamp)
        .bind(alert.resolved_at)
        .bind(&alert.resolved_by)
        .bind(alert.updated_at)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_alert(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM alerts WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_unread_alert(
        &self,
        chemical_id: Uuid,
        alert_type: AlertType,
        reason: AlertReason,
    ) -> AppResult<Option<Alert>> {
        sqlx::query_as::<_, AlertRow>(&format!(
            "SELECT {ALERT_COLUMNS} FROM alerts \
             WHERE chemical_id = $1 AND alert_type = $2 AND is_read = false \
               AND (reason = $3 \
                    OR (reason IS NULL \
                        AND (alert_type <> 'expiry_warning' \
                             OR (message ILIKE '%expired%') = ($3 = 'expired')))) \
             LIMIT 1"
        ))
        .bind(chemical_id)
        .bind(alert_type.as_str())
        .bind(reason.as_str())
        .fetch_optional(&self.db)
        .await?
        .map(Alert::try_from)
        .transpose()
    }

    async fn delete_alerts_for_chemical(&self, chemical_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM alerts WHERE chemical_id = $1")
            .bind(chemical_id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_alerts(&self, ids: &[Uuid]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM alerts WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_all_alerts(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM alerts").execute(&self.db).await?;
        Ok(result.rows_affected())
    }

    async fn unread_severity_counts(&self) -> AppResult<SeverityCounts> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT severity, COUNT(*) FROM alerts WHERE is_read = false GROUP BY severity",
        )
        .fetch_all(&self.db)
        .await?;

        let mut counts = SeverityCounts::default();
        for (severity, count) in rows {
            counts.add(severity.parse()?, count as u64);
        }
        Ok(counts)
    }

    async fn insert_purchase_order(&self, order: &PurchaseOrder) -> AppResult<()> {
        sqlx::query(&format!(
            "INSERT INTO purchase_orders ({PURCHASE_ORDER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"
        ))
        .bind(order.id)
        .bind(&order.po_number)
        .bind(&order.supplier)
        .bind(Json(&order.lines))
        .bind(order.total_amount)
        .bind(order.order_date)
        .bind(order.expected_delivery)
        .bind(order.actual_delivery)
        .bind(order.status.as_str())
        .bind(order.priority.as_str())
        .bind(&order.notes)
        .bind(order.version)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| AppError::from_unique(e, "poNumber"))?;

        Ok(())
    }

    async fn get_purchase_order(&self, id: Uuid) -> AppResult<Option<PurchaseOrder>> {
        sqlx::query_as::<_, PurchaseOrderRow>(&format!(
            "SELECT {PURCHASE_ORDER_COLUMNS} FROM purchase_orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .map(PurchaseOrder::try_from)
        .transpose()
    }

    async fn list_purchase_orders(
        &self,
        filter: &PurchaseOrderFilter,
        pagination: Pagination,
    ) -> AppResult<Page<PurchaseOrder>> {
        let status = filter.status.map(|s| s.as_str());
        let supplier = filter.supplier.as_deref().map(like_pattern);

        let conditions = r#"
            WHERE ($1::text IS NULL OR status = $1)
              AND ($2::text IS NULL OR supplier ILIKE $2)
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM purchase_orders {conditions}"
        ))
        .bind(status)
        .bind(&supplier)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, PurchaseOrderRow>(&format!(
            "SELECT {PURCHASE_ORDER_COLUMNS} FROM purchase_orders {conditions} \
             ORDER BY order_date DESC, id LIMIT $3 OFFSET $4"
        ))
        .bind(status)
        .bind(&supplier)
        .bind(i64::from(pagination.limit))
        .bind(pagination.offset() as i64)
        .fetch_all(&self.db)
        .await?;

        Ok(Page {
            items: convert_all(rows)?,
            total: total as u64,
        })
    }

    async fn count_purchase_orders(&self) -> AppResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM purchase_orders")
            .fetch_one(&self.db)
            .await?;
        Ok(count as u64)
    }

    async fn update_purchase_order(
        &self,
        order: &PurchaseOrder,
        expected_version: i64,
    ) -> AppResult<Option<PurchaseOrder>> {
        let row = sqlx::query_as::<_, PurchaseOrderRow>(&format!(
            r#"
            UPDATE purchase_orders
            SET po_number = $2, supplier = $3, lines = $4, total_amount = $5,
                order_date = $6, expected_delivery = $7, actual_delivery = $8,
                status = $9, priority = $10, notes = $11, updated_at = $12,
                version = version + 1
            WHERE id = $1 AND version = $13
            RETURNING {PURCHASE_ORDER_COLUMNS}
            "#
        ))
        .bind(order.id)
        .bind(&order.po_number)
        .bind(&order.supplier)
        .bind(Json(&order.lines))
        .bind(order.total_amount)
        .bind(order.order_date)
        .bind(order.expected_delivery)
        .bind(order.actual_delivery)
        .bind(order.status.as_str())
        .bind(order.priority.as_str())
        .bind(&order.notes)
        .bind(order.updated_at)
        .bind(expected_version)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::from_unique(e, "poNumber"))?;

        row.map(PurchaseOrder::try_from).transpose()
    }

    async fn delete_purchase_order(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM purchase_orders WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn purchase_orders_due(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<PurchaseOrder>> {
        let rows = sqlx::query_as::<_, PurchaseOrderRow>(&format!(
            "SELECT {PURCHASE_ORDER_COLUMNS} FROM purchase_orders \
             WHERE expected_delivery <= $1 AND status NOT IN ('delivered', 'cancelled') \
             ORDER BY expected_delivery, id"
        ))
        .bind(cutoff)
        .fetch_all(&self.db)
        .await?;

        convert_all(rows)
    }

    async fn append_activity_logs(&self, logs: &[ActivityLog]) -> AppResult<()> {
        if logs.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("INSERT INTO activity_logs ({ACTIVITY_LOG_COLUMNS}) "));
        builder.push_values(logs, |mut row, log| {
            row.push_bind(log.id)
                .push_bind(&log.action)
                .push_bind(log.category.as_str())
                .push_bind(log.severity.as_str())
                .push_bind(&log.user)
                .push_bind(&log.details)
                .push_bind(&log.metadata)
                .push_bind(log.timestamp);
        });

        builder.build().execute(&self.db).await?;
        Ok(())
    }

    async fn list_activity_logs(
        &self,
        filter: &ActivityLogFilter,
        pagination: Pagination,
    ) -> AppResult<Page<ActivityLog>> {
        let category = filter.category.map(|c| c.as_str());
        let severity = filter.severity.map(|s| s.as_str());

        let conditions = r#"
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL OR severity = $2)
              AND ($3::text IS NULL OR user_name = $3)
              AND ($4::timestamptz IS NULL OR timestamp >= $4)
        "#;

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM activity_logs {conditions}"
        ))
        .bind(category)
        .bind(severity)
        .bind(&filter.user)
        .bind(filter.since)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, ActivityLogRow>(&format!(
            "SELECT {ACTIVITY_LOG_COLUMNS} FROM activity_logs {conditions} \
             ORDER BY timestamp DESC LIMIT $5 OFFSET $6"
        ))
        .bind(category)
        .bind(severity)
        .bind(&filter.user)
        .bind(filter.since)
        .bind(i64::from(pagination.limit))
        .bind(pagination.offset() as i64)
        .fetch_all(&self.db)
        .await?;

        Ok(Page {
            items: convert_all(rows)?,
            total: total as u64,
        })
    }

    async fn insert_supplier(&self, supplier: &Supplier) -> AppResult<()> {
        sqlx::query(&format!(
            "INSERT INTO suppliers ({SUPPLIER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"
        ))
        .bind(supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(supplier.rating)
        .bind(&supplier.chemicals)
        .bind(supplier.last_order_date)
        .bind(supplier.total_orders)
        .bind(supplier.status.as_str())
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| AppError::from_unique(e, "name"))?;

        Ok(())
    }

    async fn get_supplier(&self, id: Uuid) -> AppResult<Option<Supplier>> {
        sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .map(Supplier::try_from)
        .transpose()
    }

    async fn list_suppliers(&self, pagination: Pagination) -> AppResult<Page<Supplier>> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM suppliers")
            .fetch_one(&self.db)
            .await?;

        let rows = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers ORDER BY name LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(pagination.limit))
        .bind(pagination.offset() as i64)
        .fetch_all(&self.db)
        .await?;

        Ok(Page {
            items: convert_all(rows)?,
            total: total as u64,
        })
    }

    async fn update_supplier(&self, supplier: &Supplier) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE suppliers
            SET name = $2, contact = $3, email = $4, phone = $5, address = $6, rating = $7,
                chemicals = $8, last_order_date = $9, total_orders = $10, status = $11,
                updated_at = $12
            WHERE id = $1
            "#,
        )
        .bind(supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.address)
        .bind(supplier.rating)
        .bind(&supplier.chemicals)
        .bind(supplier.last_order_date)
        .bind(supplier.total_orders)
        .bind(supplier.status.as_str())
        .bind(supplier.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| AppError::from_unique(e, "name"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_supplier(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
