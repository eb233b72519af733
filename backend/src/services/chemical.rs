//! Chemical inventory management
//!
//! Every write re-derives the stored status. Updates resync the chemical's
//! alerts and deletes cascade to them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    validate_chemical, Chemical, ChemicalCategory, ChemicalStatus, ChemicalUnit,
    PaginatedResponse, Pagination,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::alert::ResyncOutcome;
use super::{parse_filter, AlertService};
use crate::error::{AppError, AppResult};
use crate::store::{ChemicalFilter, InventoryStore};

const DEFAULT_PAGE_SIZE: u32 = 50;

/// Chemical service
#[derive(Clone)]
pub struct ChemicalService {
    store: Arc<dyn InventoryStore>,
    alerts: AlertService,
}

/// Query parameters for listing chemicals
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChemicalQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

/// Input for creating a chemical
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateChemicalInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 50))]
    pub formula: Option<String>,
    pub category: ChemicalCategory,
    pub quantity: Decimal,
    pub unit: ChemicalUnit,
    #[validate(length(min = 1, max = 100))]
    pub batch_no: String,
    pub expiry_date: DateTime<Utc>,
    pub reorder_threshold: Decimal,
    #[validate(length(min = 1, max = 100))]
    pub supplier: String,
    pub cost_per_unit: Decimal,
    #[validate(length(min = 1, max = 100))]
    pub location: String,
}

/// Input for updating a chemical. `status` is never accepted; it is derived.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChemicalInput {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 50))]
    pub formula: Option<String>,
    pub category: Option<ChemicalCategory>,
    pub quantity: Option<Decimal>,
    pub unit: Option<ChemicalUnit>,
    #[validate(length(min = 1, max = 100))]
    pub batch_no: Option<String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub reorder_threshold: Option<Decimal>,
    #[validate(length(min = 1, max = 100))]
    pub supplier: Option<String>,
    pub cost_per_unit: Option<Decimal>,
    #[validate(length(min = 1, max = 100))]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChemicalUpdate {
    pub chemical: Chemical,
    pub alerts_updated: ResyncOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChemicalDeletion {
    pub chemical: Chemical,
    pub deleted_alerts: u64,
}

impl ChemicalService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self {
            alerts: AlertService::new(store.clone()),
            store,
        }
    }

    pub async fn list(&self, query: ChemicalQuery) -> AppResult<PaginatedResponse<Chemical>> {
        let pagination = Pagination::new(query.page, query.limit, DEFAULT_PAGE_SIZE);
        let filter = ChemicalFilter {
            category: parse_filter("category", query.category.as_deref())?,
            status: parse_filter("status", query.status.as_deref())?,
            search: query.search.filter(|s| !s.trim().is_empty()),
        };

        let page = self.store.list_chemicals(&filter, pagination).await?;
        Ok(PaginatedResponse::new(page.items, pagination, page.total))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Chemical> {
        self.store
            .get_chemical(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Chemical".to_string()))
    }

    pub async fn create(&self, input: CreateChemicalInput, now: DateTime<Utc>) -> AppResult<Chemical> {
        input.validate()?;

        let mut chemical = Chemical {
            id: Uuid::new_v4(),
            name: input.name,
            formula: input.formula.filter(|f| !f.trim().is_empty()),
            category: input.category,
            quantity: input.quantity,
            unit: input.unit,
            batch_no: input.batch_no,
            expiry_date: input.expiry_date,
            reorder_threshold: input.reorder_threshold,
            supplier: input.supplier,
            cost_per_unit: input.cost_per_unit,
            location: input.location,
            status: ChemicalStatus::Active,
            last_updated: now,
            created_at: now,
            updated_at: now,
        };
        chemical.refresh_status(now);
        validate_chemical(&chemical)?;

        self.store.insert_chemical(&chemical).await?;
        tracing::info!(chemical_id = %chemical.id, status = %chemical.status, "Chemical created");
        Ok(chemical)
    }

    /// Apply an edit, re-derive status and reset the chemical's alerts
    #[tracing::instrument(skip(self, input), fields(chemical_id = %id))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateChemicalInput,
        now: DateTime<Utc>,
    ) -> AppResult<ChemicalUpdate> {
        input.validate()?;
        let mut chemical = self.get(id).await?;

        if let Some(name) = input.name {
            chemical.name = name;
        }
        if let Some(formula) = input.formula {
            chemical.formula = Some(formula).filter(|f| !f.trim().is_empty());
        }
        if let Some(category) = input.category {
            chemical.category = category;
        }
        if let Some(quantity) = input.quantity {
            chemical.quantity = quantity;
        }
        if let Some(unit) = input.unit {
            chemical.unit = unit;
        }
        if let Some(batch_no) = input.batch_no {
            chemical.batch_no = batch_no;
        }
        if let Some(expiry_date) = input.expiry_date {
            chemical.expiry_date = expiry_date;
        }
        if let Some(reorder_threshold) = input.reorder_threshold {
            chemical.reorder_threshold = reorder_threshold;
        }
        if let Some(supplier) = input.supplier {
            chemical.supplier = supplier;
        }
        if let Some(cost_per_unit) = input.cost_per_unit {
            chemical.cost_per_unit = cost_per_unit;
        }
        if let Some(location) = input.location {
            chemical.location = location;
        }

        chemical.refresh_status(now);
        validate_chemical(&chemical)?;

        if !self.store.update_chemical(&chemical).await? {
            return Err(AppError::NotFound("Chemical".to_string()));
        }

        let alerts_updated = self.alerts.resync_chemical(&chemical, now).await?;
        Ok(ChemicalUpdate {
            chemical,
            alerts_updated,
        })
    }

    /// Delete a chemical and every alert that references it
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> AppResult<ChemicalDeletion> {
        let chemical = self
            .store
            .delete_chemical(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Chemical".to_string()))?;

        let deleted_alerts = self.alerts.cascade_delete(id).await?;
        Ok(ChemicalDeletion {
            chemical,
            deleted_alerts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap()
    }

    fn input(batch_no: &str, quantity: i64) -> CreateChemicalInput {
        CreateChemicalInput {
            name: "Hydrochloric Acid".into(),
            formula: Some("HCl".into()),
            category: ChemicalCategory::Acid,
            quantity: Decimal::from(quantity),
            unit: ChemicalUnit::Litre,
            batch_no: batch_no.into(),
            expiry_date: now() + Duration::days(200),
            reorder_threshold: Decimal::from(25),
            supplier: "ChemSupply Co".into(),
            cost_per_unit: Decimal::new(1850, 2),
            location: "Acid cabinet 2".into(),
        }
    }

    fn service() -> ChemicalService {
        ChemicalService::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_create_derives_status() {
        let service = service();
        let low = service.create(input("HCL-001", 10), now()).await.unwrap();
        assert_eq!(low.status, ChemicalStatus::LowStock);

        let empty = service.create(input("HCL-002", 0), now()).await.unwrap();
        assert_eq!(empty.status, ChemicalStatus::OutOfStock);
    }

    #[tokio::test]
    async fn test_duplicate_batch_rejected() {
        let service = service();
        service.create(input("HCL-001", 100), now()).await.unwrap();
        let err = service.create(input("HCL-001", 100), now()).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateEntry(_)));
    }

    #[tokio::test]
    async fn test_negative_quantity_rejected() {
        let service = service();
        let err = service.create(input("HCL-003", -5), now()).await.unwrap_err();
        match err {
            AppError::Validation { field, .. } => assert_eq!(field, "quantity"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_reports_alert_changes() {
        let service = service();
        let chem = service.create(input("HCL-004", 10), now()).await.unwrap();

        let first = service
            .update(chem.id, UpdateChemicalInput::default(), now())
            .await
            .unwrap();
        assert_eq!(first.alerts_updated, ResyncOutcome { deleted: 0, created: 1 });

        let restocked = service
            .update(
                chem.id,
                UpdateChemicalInput {
                    quantity: Some(Decimal::from(500)),
                    ..Default::default()
                },
                now(),
            )
            .await
            .unwrap();
        assert_eq!(restocked.chemical.status, ChemicalStatus::Active);
        assert_eq!(restocked.alerts_updated, ResyncOutcome { deleted: 1, created: 0 });
    }

    #[tokio::test]
    async fn test_missing_chemical_is_not_found() {
        let service = service();
        assert!(matches!(
            service.get(Uuid::new_v4()).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            service.delete(Uuid::new_v4()).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }
}
