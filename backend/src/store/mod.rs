//! Persistence boundary for inventory records
//!
//! Services depend on [`InventoryStore`] only. `PgStore` backs the server,
//! `MemoryStore` backs tests and local experiments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    ActivityCategory, ActivityLog, ActivitySeverity, Alert, AlertReason, AlertSeverity,
    AlertType, Chemical, ChemicalCategory, ChemicalStatus, Pagination, PurchaseOrder,
    PurchaseOrderStatus, SeverityCounts, Supplier,
};
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::AppResult;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// One page of records plus the total matching the filter
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ChemicalFilter {
    pub category: Option<ChemicalCategory>,
    pub status: Option<ChemicalStatus>,
    /// Case-insensitive match on name, formula or batch number
    pub search: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub alert_type: Option<AlertType>,
    pub severity: Option<AlertSeverity>,
    pub is_read: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct PurchaseOrderFilter {
    pub status: Option<PurchaseOrderStatus>,
    pub supplier: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ActivityLogFilter {
    pub category: Option<ActivityCategory>,
    pub severity: Option<ActivitySeverity>,
    pub user: Option<String>,
    pub since: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Connectivity probe for the health endpoint
    async fn ping(&self) -> AppResult<()>;

    // Chemicals

    /// Fails with `DuplicateEntry` when the batch number is taken
    async fn insert_chemical(&self, chemical: &Chemical) -> AppResult<()>;
    async fn get_chemical(&self, id: Uuid) -> AppResult<Option<Chemical>>;
    async fn list_chemicals(
        &self,
        filter: &ChemicalFilter,
        pagination: Pagination,
    ) -> AppResult<Page<Chemical>>;
    async fn all_chemicals(&self) -> AppResult<Vec<Chemical>>;
    /// Returns false when the chemical no longer exists
    async fn update_chemical(&self, chemical: &Chemical) -> AppResult<bool>;
    async fn delete_chemical(&self, id: Uuid) -> AppResult<Option<Chemical>>;
    async fn existing_chemical_ids(&self, ids: &[Uuid]) -> AppResult<HashSet<Uuid>>;

    // Alerts

    async fn insert_alerts(&self, alerts: &[Alert]) -> AppResult<u64>;
    async fn get_alert(&self, id: Uuid) -> AppResult<Option<Alert>>;
    async fn list_alerts(&self, filter: &AlertFilter, pagination: Pagination)
        -> AppResult<Page<Alert>>;
    async fn all_alerts(&self) -> AppResult<Vec<Alert>>;
    async fn update_alert(&self, alert: &Alert) -> AppResult<bool>;
    async fn delete_alert(&self, id: Uuid) -> AppResult<bool>;
    async fn find_unread_alert(
        &self,
        chemical_id: Uuid,
        alert_type: AlertType,
        reason: AlertReason,
    ) -> AppResult<Option<Alert>>;
    async fn delete_alerts_for_chemical(&self, chemical_id: Uuid) -> AppResult<u64>;
    async fn delete_alerts(&self, ids: &[Uuid]) -> AppResult<u64>;
    async fn delete_all_alerts(&self) -> AppResult<u64>;
    async fn unread_severity_counts(&self) -> AppResult<SeverityCounts>;

    // Purchase orders

    /// Fails with `DuplicateEntry` when the PO number is taken
    async fn insert_purchase_order(&self, order: &PurchaseOrder) -> AppResult<()>;
    async fn get_purchase_order(&self, id: Uuid) -> AppResult<Option<PurchaseOrder>>;
    async fn list_purchase_orders(
        &self,
        filter: &PurchaseOrderFilter,
        pagination: Pagination,
    ) -> AppResult<Page<PurchaseOrder>>;
    async fn count_purchase_orders(&self) -> AppResult<u64>;
    /// Compare-and-swap on `version`.
    ///
    /// Writes `order` only if the stored version still equals
    /// `expected_version`, bumping it by one. Returns the stored order, or
    /// `None` when the order is missing or was changed in the meantime.
    async fn update_purchase_order(
        &self,
        order: &PurchaseOrder,
        expected_version: i64,
    ) -> AppResult<Option<PurchaseOrder>>;
    async fn delete_purchase_order(&self, id: Uuid) -> AppResult<bool>;
    /// Orders expected on or before `cutoff` that are neither delivered nor cancelled
    async fn purchase_orders_due(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<PurchaseOrder>>;

    // Activity logs

    async fn append_activity_logs(&self, logs: &[ActivityLog]) -> AppResult<()>;
    async fn list_activity_logs(
        &self,
        filter: &ActivityLogFilter,
        pagination: Pagination,
    ) -> AppResult<Page<ActivityLog>>;

    // Suppliers

    /// Fails with `DuplicateEntry` when the supplier name is taken
    async fn insert_supplier(&self, supplier: &Supplier) -> AppResult<()>;
    async fn get_supplier(&self, id: Uuid) -> AppResult<Option<Supplier>>;
    async fn list_suppliers(&self, pagination: Pagination) -> AppResult<Page<Supplier>>;
    async fn update_supplier(&self, supplier: &Supplier) -> AppResult<bool>;
    async fn delete_supplier(&self, id: Uuid) -> AppResult<bool>;
}
