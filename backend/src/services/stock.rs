//! Stock mutations applied when purchase-order lines are received

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::{extend_expiry, ActivityLog, ChemicalStatus, PurchaseOrderLine};
use std::sync::Arc;
use uuid::Uuid;

use super::ActivityLogService;
use crate::error::{AppError, AppResult};
use crate::store::InventoryStore;

/// Stock service
#[derive(Clone)]
pub struct StockService {
    store: Arc<dyn InventoryStore>,
    activity: ActivityLogService,
}

/// One chemical's stock change from a delivered line
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
    pub chemical_id: Uuid,
    pub chemical_name: String,
    pub quantity_added: Decimal,
    pub old_quantity: Decimal,
    pub new_quantity: Decimal,
    pub new_status: ChemicalStatus,
    pub po_number: String,
}

impl StockService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self {
            activity: ActivityLogService::new(store.clone()),
            store,
        }
    }

    /// Receive one delivered line into stock.
    ///
    /// Adds the quantity, takes the line's unit price as the new cost, pushes
    /// the expiry date out by the shelf-life extension and re-derives status,
    /// all in a single write. Returns `Ok(None)` when the chemical no longer
    /// exists, so the caller can skip the line.
    #[tracing::instrument(skip(self, line), fields(chemical_id = %line.chemical_id))]
    pub async fn receive_line(
        &self,
        line: &PurchaseOrderLine,
        po_number: &str,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<StockUpdate>> {
        let Some(mut chemical) = self.store.get_chemical(line.chemical_id).await? else {
            tracing::warn!(po_number, "Chemical on delivered line not found, skipping");
            return Ok(None);
        };

        if line.quantity < Decimal::ZERO {
            return Err(AppError::Validation {
                field: "quantity".to_string(),
                message: format!("Delivered quantity for {} cannot be negative", line.chemical_name),
            });
        }

        let previous = chemical.clone();
        chemical.expiry_date = extend_expiry(previous.expiry_date).ok_or_else(|| {
            AppError::Internal(format!(
                "Expiry date of {} cannot be extended",
                previous.name
            ))
        })?;
        chemical.quantity += line.quantity;
        chemical.cost_per_unit = line.unit_price;
        chemical.refresh_status(now);

        if !self.store.update_chemical(&chemical).await? {
            tracing::warn!(po_number, "Chemical deleted while receiving stock, skipping");
            return Ok(None);
        }

        let mut logs = vec![ActivityLog::stock_increased(
            &chemical.name,
            chemical.id,
            previous.quantity,
            chemical.quantity,
            &format!("PO {} delivered", po_number),
            actor,
            now,
        )];
        if previous.cost_per_unit != chemical.cost_per_unit {
            logs.push(ActivityLog::price_updated(
                &chemical.name,
                chemical.id,
                previous.cost_per_unit,
                chemical.cost_per_unit,
                actor,
                now,
            ));
        }
        logs.push(ActivityLog::expiry_extended(
            &chemical.name,
            chemical.id,
            previous.expiry_date,
            chemical.expiry_date,
            actor,
            now,
        ));
        if previous.status != chemical.status {
            logs.push(ActivityLog::status_changed(
                &chemical.name,
                chemical.id,
                previous.status,
                chemical.status,
                actor,
                now,
            ));
        }
        self.activity.record_all(logs).await;

        Ok(Some(StockUpdate {
            chemical_id: chemical.id,
            chemical_name: chemical.name,
            quantity_added: line.quantity,
            old_quantity: previous.quantity,
            new_quantity: chemical.quantity,
            new_status: chemical.status,
            po_number: po_number.to_string(),
        }))
    }
}
