//! Audit trail writes and queries

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use shared::{ActivityLog, PaginatedResponse, Pagination};
use std::sync::Arc;

use super::parse_filter;
use crate::error::AppResult;
use crate::store::{ActivityLogFilter, InventoryStore};

const DEFAULT_PAGE_SIZE: u32 = 50;

/// Activity log service
#[derive(Clone)]
pub struct ActivityLogService {
    store: Arc<dyn InventoryStore>,
}

/// Query parameters for listing activity
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLogQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub severity: Option<String>,
    pub user: Option<String>,
    /// Only entries from the last N days
    pub days: Option<i64>,
}

impl ActivityLogService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Append one entry. Audit writes never fail the calling flow.
    pub async fn record(&self, log: ActivityLog) {
        self.record_all(vec![log]).await;
    }

    /// Append entries in order. Audit writes never fail the calling flow.
    pub async fn record_all(&self, logs: Vec<ActivityLog>) {
        if logs.is_empty() {
            return;
        }
        if let Err(e) = self.store.append_activity_logs(&logs).await {
            tracing::warn!(error = %e, count = logs.len(), "Failed to write activity log");
        }
    }

    pub async fn list(
        &self,
        query: ActivityLogQuery,
        now: DateTime<Utc>,
    ) -> AppResult<PaginatedResponse<ActivityLog>> {
        let pagination = Pagination::new(query.page, query.limit, DEFAULT_PAGE_SIZE);
        let filter = ActivityLogFilter {
            category: parse_filter("category", query.category.as_deref())?,
            severity: parse_filter("severity", query.severity.as_deref())?,
            user: query.user.filter(|u| !u.trim().is_empty()),
            since: query
                .days
                .filter(|d| *d > 0)
                .map(|d| now - Duration::days(d)),
        };

        let page = self.store.list_activity_logs(&filter, pagination).await?;
        Ok(PaginatedResponse::new(page.items, pagination, page.total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::TimeZone;
    use shared::{ActivityCategory, SYSTEM_USER};

    #[tokio::test]
    async fn test_list_filters_by_category_and_age() {
        let store: Arc<dyn InventoryStore> = Arc::new(MemoryStore::new());
        let service = ActivityLogService::new(store);
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();

        service
            .record_all(vec![
                ActivityLog::supplier_added("Acme Chemicals", SYSTEM_USER, now - Duration::days(10)),
                ActivityLog::po_delivered("PO-1-0001", 2, SYSTEM_USER, now - Duration::days(1)),
                ActivityLog::po_delivered("PO-1-0002", 1, SYSTEM_USER, now - Duration::days(20)),
            ])
            .await;

        let recent = service
            .list(
                ActivityLogQuery {
                    category: Some("purchase_order".into()),
                    days: Some(7),
                    ..Default::default()
                },
                now,
            )
            .await
            .unwrap();

        assert_eq!(recent.pagination.total, 1);
        assert_eq!(recent.data[0].category, ActivityCategory::PurchaseOrder);
        assert!(recent.data[0].details.contains("PO-1-0001"));
    }
}
