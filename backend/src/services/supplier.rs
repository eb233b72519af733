//! Supplier directory

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    validate_supplier, ActivityLog, PaginatedResponse, Pagination, Supplier, SupplierStatus,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::ActivityLogService;
use crate::error::{AppError, AppResult};
use crate::store::InventoryStore;

const DEFAULT_PAGE_SIZE: u32 = 50;

/// Supplier service
#[derive(Clone)]
pub struct SupplierService {
    store: Arc<dyn InventoryStore>,
    activity: ActivityLogService,
}

#[derive(Debug, Default, Deserialize)]
pub struct SupplierQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Input for creating a supplier
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 50))]
    pub contact: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 50))]
    pub phone: String,
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    pub rating: Option<Decimal>,
    #[serde(default)]
    pub chemicals: Vec<String>,
    pub status: Option<SupplierStatus>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSupplierInput {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub contact: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub address: Option<String>,
    pub rating: Option<Decimal>,
    pub chemicals: Option<Vec<String>>,
    pub last_order_date: Option<DateTime<Utc>>,
    pub total_orders: Option<i32>,
    pub status: Option<SupplierStatus>,
}

/// Supplier plus its derived performance score
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierView {
    #[serde(flatten)]
    pub supplier: Supplier,
    pub performance_score: u32,
}

impl From<Supplier> for SupplierView {
    fn from(supplier: Supplier) -> Self {
        Self {
            performance_score: supplier.performance_score(),
            supplier,
        }
    }
}

impl SupplierService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self {
            activity: ActivityLogService::new(store.clone()),
            store,
        }
    }

    pub async fn list(&self, query: SupplierQuery) -> AppResult<PaginatedResponse<SupplierView>> {
        let pagination = Pagination::new(query.page, query.limit, DEFAULT_PAGE_SIZE);
        let page = self.store.list_suppliers(pagination).await?;
        let data = page.items.into_iter().map(SupplierView::from).collect();
        Ok(PaginatedResponse::new(data, pagination, page.total))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<SupplierView> {
        Ok(self.find(id).await?.into())
    }

    async fn find(&self, id: Uuid) -> AppResult<Supplier> {
        self.store
            .get_supplier(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    pub async fn create(
        &self,
        input: CreateSupplierInput,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<SupplierView> {
        input.validate()?;

        let supplier = Supplier {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            contact: input.contact,
            email: input.email.to_lowercase(),
            phone: input.phone,
            address: input.address,
            rating: input.rating.unwrap_or(Decimal::ZERO),
            chemicals: input.chemicals,
            last_order_date: None,
            total_orders: 0,
            status: input.status.unwrap_or(SupplierStatus::Active),
            created_at: now,
            updated_at: now,
        };
        validate_supplier(&supplier)?;

        self.store.insert_supplier(&supplier).await?;
        self.activity
            .record(ActivityLog::supplier_added(&supplier.name, actor, now))
            .await;

        Ok(supplier.into())
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateSupplierInput,
        now: DateTime<Utc>,
    ) -> AppResult<SupplierView> {
        input.validate()?;
        let mut supplier = self.find(id).await?;

        if let Some(name) = input.name {
            supplier.name = name.trim().to_string();
        }
        if let Some(contact) = input.contact {
            supplier.contact = contact;
        }
        if let Some(email) = input.email {
            supplier.email = email.to_lowercase();
        }
        if let Some(phone) = input.phone {
            supplier.phone = phone;
        }
        if let Some(address) = input.address {
            supplier.address = address;
        }
        if let Some(rating) = input.rating {
            supplier.rating = rating;
        }
        if let Some(chemicals) = input.chemicals {
            supplier.chemicals = chemicals;
        }
        if input.last_order_date.is_some() {
            supplier.last_order_date = input.last_order_date;
        }
        if let Some(total_orders) = input.total_orders {
            supplier.total_orders = total_orders;
        }
        if let Some(status) = input.status {
            supplier.status = status;
        }
        supplier.updated_at = now;
        validate_supplier(&supplier)?;

        if !self.store.update_supplier(&supplier).await? {
            return Err(AppError::NotFound("Supplier".to_string()));
        }
        Ok(supplier.into())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete_supplier(id).await? {
            return Err(AppError::NotFound("Supplier".to_string()));
        }
        Ok(())
    }
}
