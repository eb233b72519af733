use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    ActivityLog, Alert, AlertReason, AlertType, Chemical, Pagination, PurchaseOrder,
    PurchaseOrderStatus, SeverityCounts, Supplier,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    ActivityLogFilter, AlertFilter, ChemicalFilter, InventoryStore, Page, PurchaseOrderFilter,
};
use crate::error::{AppError, AppResult};

#[derive(Default)]
struct Tables {
    chemicals: HashMap<Uuid, Chemical>,
    alerts: HashMap<Uuid, Alert>,
    purchase_orders: HashMap<Uuid, PurchaseOrder>,
    activity_logs: Vec<ActivityLog>,
    suppliers: HashMap<Uuid, Supplier>,
}

/// In-process store with the same uniqueness and versioning rules as `PgStore`
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn paginate<T>(items: Vec<T>, pagination: Pagination) -> Page<T> {
    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(pagination.offset() as usize)
        .take(pagination.limit as usize)
        .collect();
    Page { items, total }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn insert_chemical(&self, chemical: &Chemical) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.chemicals.values().any(|c| c.batch_no == chemical.batch_no) {
            return Err(AppError::DuplicateEntry("batchNo".into()));
        }
        tables.chemicals.insert(chemical.id, chemical.clone());
        Ok(())
    }

    async fn get_chemical(&self, id: Uuid) -> AppResult<Option<Chemical>> {
        Ok(self.tables.read().await.chemicals.get(&id).cloned())
    }

    async fn list_chemicals(
        &self,
        filter: &ChemicalFilter,
        pagination: Pagination,
    ) -> AppResult<Page<Chemical>> {
        let search = filter.search.as_deref().map(str::to_lowercase);
        let tables = self.tables.read().await;
        let mut items: Vec<Chemical> = tables
            .chemicals
            .values()
            .filter(|c| filter.category.map_or(true, |cat| c.category == cat))
            .filter(|c| filter.status.map_or(true, |s| c.status == s))
            .filter(|c| {
                search.as_deref().map_or(true, |term| {
                    contains_ci(&c.name, term)
                        || contains_ci(&c.batch_no, term)
                        || c.formula.as_deref().is_some_and(|f| contains_ci(f, term))
                })
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(paginate(items, pagination))
    }

    async fn all_chemicals(&self) -> AppResult<Vec<Chemical>> {
        let mut items: Vec<Chemical> = self.tables.read().await.chemicals.values().cloned().collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn update_chemical(&self, chemical: &Chemical) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.chemicals.contains_key(&chemical.id) {
            return Ok(false);
        }
        if tables
            .chemicals
            .values()
            .any(|c| c.id != chemical.id && c.batch_no == chemical.batch_no)
        {
            return Err(AppError::DuplicateEntry("batchNo".into()));
        }
        tables.chemicals.insert(chemical.id, chemical.clone());
        Ok(true)
    }

    async fn delete_chemical(&self, id: Uuid) -> AppResult<Option<Chemical>> {
        Ok(self.tables.write().await.chemicals.remove(&id))
    }

    async fn existing_chemical_ids(&self, ids: &[Uuid]) -> AppResult<HashSet<Uuid>> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .copied()
            .filter(|id| tables.chemicals.contains_key(id))
            .collect())
    }

    async fn insert_alerts(&self, alerts: &[Alert]) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        for alert in alerts {
            tables.alerts.insert(alert.id, alert.clone());
        }
        Ok(alerts.len() as u64)
    }

    async fn get_alert(&self, id: Uuid) -> AppResult<Option<Alert>> {
        Ok(self.tables.read().await.alerts.get(&id).cloned())
    }

    async fn list_alerts(
        &self,
        filter: &AlertFilter,
        pagination: Pagination,
    ) -> AppResult<Page<Alert>> {
        let tables = self.tables.read().await;
        let mut items: Vec<Alert> = tables
            .alerts
            .values()
            .filter(|a| filter.alert_type.map_or(true, |t| a.alert_type == t))
            .filter(|a| filter.severity.map_or(true, |s| a.severity == s))
            .filter(|a| filter.is_read.map_or(true, |r| a.is_read == r))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(a.id.cmp(&b.id)));
        Ok(paginate(items, pagination))
    }

    async fn all_alerts(&self) -> AppResult<Vec<Alert>> {
        let mut items: Vec<Alert> = self.tables.read().await.alerts.values().cloned().collect();
        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn update_alert(&self, alert: &Alert) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.alerts.get_mut(&alert.id) {
            Some(existing) => {
                *existing = alert.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_alert(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.tables.write().await.alerts.remove(&id).is_some())
    }

    async fn find_unread_alert(
        &self,
        chemical_id: Uuid,
        alert_type: AlertType,
        reason: AlertReason,
    ) -> AppResult<Option<Alert>> {
        let tables = self.tables.read().await;
        Ok(tables
            .alerts
            .values()
            .find(|a| {
                !a.is_read
                    && a.chemical_id == Some(chemical_id)
                    && a.alert_type == alert_type
                    && a.condition_reason() == Some(reason)
            })
            .cloned())
    }

    async fn delete_alerts_for_chemical(&self, chemical_id: Uuid) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.alerts.len();
        tables.alerts.retain(|_, a| a.chemical_id != Some(chemical_id));
        Ok((before - tables.alerts.len()) as u64)
    }

    async fn delete_alerts(&self, ids: &[Uuid]) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        Ok(ids
            .iter()
            .filter(|id| tables.alerts.remove(*id).is_some())
            .count() as u64)
    }

    async fn delete_all_alerts(&self) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let count = tables.alerts.len() as u64;
        tables.alerts.clear();
        Ok(count)
    }

    async fn unread_severity_counts(&self) -> AppResult<SeverityCounts> {
        let tables = self.tables.read().await;
        Ok(SeverityCounts::from_unread(tables.alerts.values()))
    }

    async fn insert_purchase_order(&self, order: &PurchaseOrder) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .purchase_orders
            .values()
            .any(|o| o.po_number == order.po_number)
        {
            return Err(AppError::DuplicateEntry("poNumber".into()));
        }
        tables.purchase_orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn get_purchase_order(&self, id: Uuid) -> AppResult<Option<PurchaseOrder>> {
        Ok(self.tables.read().await.purchase_orders.get(&id).cloned())
    }

    async fn list_purchase_orders(
        &self,
        filter: &PurchaseOrderFilter,
        pagination: Pagination,
    ) -> AppResult<Page<PurchaseOrder>> {
        let supplier = filter.supplier.as_deref().map(str::to_lowercase);
        let tables = self.tables.read().await;
        let mut items: Vec<PurchaseOrder> = tables
            .purchase_orders
            .values()
            .filter(|o| filter.status.map_or(true, |s| o.status == s))
            .filter(|o| {
                supplier
                    .as_deref()
                    .map_or(true, |term| contains_ci(&o.supplier, term))
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| b.order_date.cmp(&a.order_date).then(a.id.cmp(&b.id)));
        Ok(paginate(items, pagination))
    }

    async fn count_purchase_orders(&self) -> AppResult<u64> {
        Ok(self.tables.read().await.purchase_orders.len() as u64)
    }

    async fn update_purchase_order(
        &self,
        order: &PurchaseOrder,
        expected_version: i64,
    ) -> AppResult<Option<PurchaseOrder>> {
        let mut tables = self.tables.write().await;
        if tables
            .purchase_orders
            .values()
            .any(|o| o.id != order.id && o.po_number == order.po_number)
        {
            return Err(AppError::DuplicateEntry("poNumber".into()));
        }
        let Some(stored) = tables.purchase_orders.get_mut(&order.id) else {
            return Ok(None);
        };
        if stored.version != expected_version {
            return Ok(None);
        }
        let mut next = order.clone();
        next.version = expected_version + 1;
        *stored = next.clone();
        Ok(Some(next))
    }

    async fn delete_purchase_order(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.tables.write().await.purchase_orders.remove(&id).is_some())
    }

    async fn purchase_orders_due(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<PurchaseOrder>> {
        let tables = self.tables.read().await;
        let mut items: Vec<PurchaseOrder> = tables
            .purchase_orders
            .values()
            .filter(|o| o.expected_delivery <= cutoff)
            .filter(|o| {
                !matches!(
                    o.status,
                    PurchaseOrderStatus::Delivered | PurchaseOrderStatus::Cancelled
                )
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| a.expected_delivery.cmp(&b.expected_delivery).then(a.id.cmp(&b.id)));
        Ok(items)
    }

    async fn append_activity_logs(&self, logs: &[ActivityLog]) -> AppResult<()> {
        self.tables
            .write()
            .await
            .activity_logs
            .extend(logs.iter().cloned());
        Ok(())
    }

    async fn list_activity_logs(
        &self,
        filter: &ActivityLogFilter,
        pagination: Pagination,
    ) -> AppResult<Page<ActivityLog>> {
        let tables = self.tables.read().await;
        let mut items: Vec<ActivityLog> = tables
            .activity_logs
            .iter()
            .filter(|l| filter.category.map_or(true, |c| l.category == c))
            .filter(|l| filter.severity.map_or(true, |s| l.severity == s))
            .filter(|l| filter.user.as_deref().map_or(true, |u| l.user == u))
            .filter(|l| filter.since.map_or(true, |since| l.timestamp >= since))
            .cloned()
            .collect();
        // Stable sort keeps insertion order for entries written in one flow
        items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(paginate(items, pagination))
    }

    async fn insert_supplier(&self, supplier: &Supplier) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        if tables.suppliers.values().any(|s| s.name == supplier.name) {
            return Err(AppError::DuplicateEntry("name".into()));
        }
        tables.suppliers.insert(supplier.id, supplier.clone());
        Ok(())
    }

    async fn get_supplier(&self, id: Uuid) -> AppResult<Option<Supplier>> {
        Ok(self.tables.read().await.suppliers.get(&id).cloned())
    }

    async fn list_suppliers(&self, pagination: Pagination) -> AppResult<Page<Supplier>> {
        let mut items: Vec<Supplier> = self.tables.read().await.suppliers.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(paginate(items, pagination))
    }

    async fn update_supplier(&self, supplier: &Supplier) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.suppliers.contains_key(&supplier.id) {
            return Ok(false);
        }
        if tables
            .suppliers
            .values()
            .any(|s| s.id != supplier.id && s.name == supplier.name)
        {
            return Err(AppError::DuplicateEntry("name".into()));
        }
        tables.suppliers.insert(supplier.id, supplier.clone());
        Ok(true)
    }

    async fn delete_supplier(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.tables.write().await.suppliers.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use shared::{PurchaseOrderLine, PurchaseOrderPriority};

    fn order(po_number: &str) -> PurchaseOrder {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        let mut order = PurchaseOrder {
            id: Uuid::new_v4(),
            po_number: po_number.to_string(),
            supplier: "ChemSupply Co".to_string(),
            lines: vec![PurchaseOrderLine::new(
                Uuid::new_v4(),
                "Sodium Chloride",
                Decimal::from(10),
                Decimal::from(2),
            )],
            total_amount: Decimal::ZERO,
            order_date: now,
            expected_delivery: now + Duration::days(3),
            actual_delivery: None,
            status: PurchaseOrderStatus::Pending,
            priority: PurchaseOrderPriority::Medium,
            notes: None,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        order.recompute_totals();
        order
    }

    #[tokio::test]
    async fn test_purchase_order_version_check() {
        let store = MemoryStore::new();
        let original = order("PO-1-0001");
        store.insert_purchase_order(&original).await.unwrap();

        let mut first = original.clone();
        first.status = PurchaseOrderStatus::Approved;
        let saved = store.update_purchase_order(&first, 0).await.unwrap().unwrap();
        assert_eq!(saved.version, 1);

        // A writer still holding version 0 loses
        let mut stale = original.clone();
        stale.status = PurchaseOrderStatus::Cancelled;
        assert!(store.update_purchase_order(&stale, 0).await.unwrap().is_none());

        let stored = store.get_purchase_order(original.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PurchaseOrderStatus::Approved);
    }

    #[tokio::test]
    async fn test_duplicate_po_number_rejected() {
        let store = MemoryStore::new();
        store.insert_purchase_order(&order("PO-1-0001")).await.unwrap();
        let err = store.insert_purchase_order(&order("PO-1-0001")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEntry(_)));
    }

    #[test]
    fn test_paginate_reports_total() {
        let page = paginate((0..25).collect::<Vec<_>>(), Pagination { page: 3, limit: 10 });
        assert_eq!(page.total, 25);
        assert_eq!(page.items, vec![20, 21, 22, 23, 24]);
    }
}
