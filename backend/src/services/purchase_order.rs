//! Purchase order lifecycle and delivery handling
//!
//! Moving an order into `delivered` receives every line into stock, resyncs
//! the alerts of the chemicals it touched and writes the audit trail. Writes
//! are compare-and-swap on the order's `version`, so an order can only be
//! received once even when two requests race.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    generate_po_number, validate_purchase_order, ActivityLog, PaginatedResponse, Pagination,
    PurchaseOrder, PurchaseOrderLine, PurchaseOrderPriority, PurchaseOrderStatus,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::stock::StockUpdate;
use super::{parse_filter, ActivityLogService, AlertService, ItemFailure, StockService};
use crate::error::{AppError, AppResult};
use crate::store::{InventoryStore, PurchaseOrderFilter};

const DEFAULT_PAGE_SIZE: u32 = 50;

/// Purchase order service
#[derive(Clone)]
pub struct PurchaseOrderService {
    store: Arc<dyn InventoryStore>,
    stock: StockService,
    alerts: AlertService,
    activity: ActivityLogService,
}

/// Query parameters for listing orders
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub supplier: Option<String>,
}

/// One ordered chemical as submitted by the client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineInput {
    pub chemical_id: Uuid,
    pub chemical_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl From<LineInput> for PurchaseOrderLine {
    fn from(input: LineInput) -> Self {
        PurchaseOrderLine::new(
            input.chemical_id,
            input.chemical_name,
            input.quantity,
            input.unit_price,
        )
    }
}

/// Input for creating a purchase order
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseOrderInput {
    /// Generated when absent
    #[validate(length(min = 1, max = 100))]
    pub po_number: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub supplier: String,
    #[validate(length(min = 1))]
    pub chemicals: Vec<LineInput>,
    pub order_date: Option<DateTime<Utc>>,
    pub expected_delivery: DateTime<Utc>,
    pub status: Option<PurchaseOrderStatus>,
    pub priority: Option<PurchaseOrderPriority>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

/// Input for updating a purchase order
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePurchaseOrderInput {
    #[validate(length(min = 1, max = 100))]
    pub supplier: Option<String>,
    #[validate(length(min = 1))]
    pub chemicals: Option<Vec<LineInput>>,
    pub expected_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub status: Option<PurchaseOrderStatus>,
    pub priority: Option<PurchaseOrderPriority>,
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    /// Version the client last read; the update is rejected if it is stale
    pub version: Option<i64>,
}

/// Updated order plus the stock it received, if this update delivered it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderUpdate {
    pub order: PurchaseOrder,
    pub stock_updates: Vec<StockUpdate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ItemFailure>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeliveredOrder {
    pub po_number: String,
    pub supplier: String,
    pub status: PurchaseOrderStatus,
}

/// Result of the auto-delivery sweep
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoDeliveryReport {
    pub orders_updated: usize,
    pub updates: Vec<DeliveredOrder>,
    pub stock_updates: Vec<StockUpdate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ItemFailure>,
}

/// Stock received for one order
struct Receipt {
    stock_updates: Vec<StockUpdate>,
    warnings: Vec<ItemFailure>,
}

fn distinct_chemicals(updates: &[StockUpdate]) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = Vec::with_capacity(updates.len());
    for update in updates {
        if !ids.contains(&update.chemical_id) {
            ids.push(update.chemical_id);
        }
    }
    ids
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| Utc.from_utc_datetime(&midnight))
        .unwrap_or(now)
}

impl PurchaseOrderService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self {
            stock: StockService::new(store.clone()),
            alerts: AlertService::new(store.clone()),
            activity: ActivityLogService::new(store.clone()),
            store,
        }
    }

    pub async fn list(&self, query: PurchaseOrderQuery) -> AppResult<PaginatedResponse<PurchaseOrder>> {
        let pagination = Pagination::new(query.page, query.limit, DEFAULT_PAGE_SIZE);
        let filter = PurchaseOrderFilter {
            status: parse_filter("status", query.status.as_deref())?,
            supplier: query.supplier.filter(|s| !s.trim().is_empty()),
        };

        let page = self.store.list_purchase_orders(&filter, pagination).await?;
        Ok(PaginatedResponse::new(page.items, pagination, page.total))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<PurchaseOrder> {
        self.store
            .get_purchase_order(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Purchase order".to_string()))
    }

    /// Create an order. Orders start open; delivery always goes through
    /// [`Self::update`] so stock is received exactly once.
    #[tracing::instrument(skip(self, input))]
    pub async fn create(
        &self,
        input: CreatePurchaseOrderInput,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<PurchaseOrder> {
        input.validate()?;

        let status = input.status.unwrap_or(PurchaseOrderStatus::Pending);
        if status.is_terminal() {
            return Err(AppError::InvalidStateTransition(format!(
                "A new purchase order cannot start as {}",
                status
            )));
        }

        let po_number = match input.po_number {
            Some(number) => number,
            None => {
                let sequence = self.store.count_purchase_orders().await? + 1;
                generate_po_number(now, sequence)
            }
        };

        let mut order = PurchaseOrder {
            id: Uuid::new_v4(),
            po_number,
            supplier: input.supplier,
            lines: input.chemicals.into_iter().map(Into::into).collect(),
            total_amount: Decimal::ZERO,
            order_date: input.order_date.unwrap_or(now),
            expected_delivery: input.expected_delivery,
            actual_delivery: None,
            status,
            priority: input.priority.unwrap_or_default(),
            notes: input.notes,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        order.recompute_totals();
        validate_purchase_order(&order)?;

        self.store.insert_purchase_order(&order).await?;

        self.activity
            .record(ActivityLog::po_created(
                &order.po_number,
                &order.supplier,
                order.total_amount,
                actor,
                now,
            ))
            .await;

        tracing::info!(po_number = %order.po_number, "Purchase order created");
        Ok(order)
    }

    /// Update an order. Moving it into `delivered` receives its lines into
    /// stock and resyncs the affected chemicals' alerts; re-saving an order
    /// that is already delivered changes no stock.
    #[tracing::instrument(skip(self, input), fields(order_id = %id))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdatePurchaseOrderInput,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<PurchaseOrderUpdate> {
        input.validate()?;

        let current = self.get(id).await?;
        let expected_version = input.version.unwrap_or(current.version);
        let mut order = current.clone();

        if let Some(status) = input.status {
            if !current.status.can_transition_to(status) {
                return Err(AppError::InvalidStateTransition(format!(
                    "Purchase order {} is {} and cannot become {}",
                    current.po_number, current.status, status
                )));
            }
            order.status = status;
        }
        if let Some(lines) = input.chemicals {
            if current.status.is_terminal() {
                return Err(AppError::InvalidStateTransition(format!(
                    "Line items of {} purchase order {} cannot change",
                    current.status, current.po_number
                )));
            }
            order.lines = lines.into_iter().map(Into::into).collect();
        }
        if let Some(supplier) = input.supplier {
            order.supplier = supplier;
        }
        if let Some(expected_delivery) = input.expected_delivery {
            order.expected_delivery = expected_delivery;
        }
        if let Some(priority) = input.priority {
            order.priority = priority;
        }
        if input.notes.is_some() {
            order.notes = input.notes;
        }
        if input.actual_delivery.is_some() {
            order.actual_delivery = input.actual_delivery;
        }

        let delivering = !current.is_delivered() && order.is_delivered();
        if delivering && order.actual_delivery.is_none() {
            order.actual_delivery = Some(now);
        }
        order.recompute_totals();
        order.updated_at = now;
        validate_purchase_order(&order)?;

        let saved = self.save(&order, expected_version).await?;

        if !delivering {
            return Ok(PurchaseOrderUpdate {
                order: saved,
                stock_updates: Vec::new(),
                warnings: Vec::new(),
            });
        }

        let mut receipt = self.receive(&saved, actor, now).await;
        let (_, resync_failures) = self
            .alerts
            .resync_chemicals(&distinct_chemicals(&receipt.stock_updates), now)
            .await;
        receipt.warnings.extend(resync_failures);

        self.activity
            .record(ActivityLog::po_delivered(
                &saved.po_number,
                saved.lines.len(),
                actor,
                now,
            ))
            .await;

        tracing::info!(
            po_number = %saved.po_number,
            received = receipt.stock_updates.len(),
            warnings = receipt.warnings.len(),
            "Purchase order delivered"
        );

        Ok(PurchaseOrderUpdate {
            order: saved,
            stock_updates: receipt.stock_updates,
            warnings: receipt.warnings,
        })
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete_purchase_order(id).await? {
            return Err(AppError::NotFound("Purchase order".to_string()));
        }
        Ok(())
    }

    /// Deliver every open order expected on or before today.
    ///
    /// Each order is claimed with its own compare-and-swap, so an order a
    /// concurrent request already delivered is reported as a failure instead
    /// of being received twice. Alerts are resynced once at the end over all
    /// chemicals that received stock.
    #[tracing::instrument(skip(self))]
    pub async fn auto_deliver_due(
        &self,
        actor: &str,
        now: DateTime<Utc>,
    ) -> AppResult<AutoDeliveryReport> {
        let due = self.store.purchase_orders_due(start_of_day(now)).await?;

        let mut updates = Vec::new();
        let mut stock_updates = Vec::new();
        let mut failures = Vec::new();

        for mut order in due {
            let expected_version = order.version;
            order.status = PurchaseOrderStatus::Delivered;
            order.actual_delivery = Some(now);
            order.updated_at = now;

            let saved = match self.save(&order, expected_version).await {
                Ok(saved) => saved,
                Err(e) => {
                    tracing::warn!(po_number = %order.po_number, error = %e, "Skipping order in auto-delivery");
                    failures.push(ItemFailure::new(order.id, &order.po_number, e));
                    continue;
                }
            };

            let receipt = self.receive(&saved, actor, now).await;
            stock_updates.extend(receipt.stock_updates);
            failures.extend(receipt.warnings);

            self.activity
                .record(ActivityLog::po_delivered(
                    &saved.po_number,
                    saved.lines.len(),
                    actor,
                    now,
                ))
                .await;

            updates.push(DeliveredOrder {
                po_number: saved.po_number,
                supplier: saved.supplier,
                status: saved.status,
            });
        }

        let (_, resync_failures) = self
            .alerts
            .resync_chemicals(&distinct_chemicals(&stock_updates), now)
            .await;
        failures.extend(resync_failures);

        tracing::info!(
            orders = updates.len(),
            stock_updates = stock_updates.len(),
            failures = failures.len(),
            "Auto-delivery sweep completed"
        );

        Ok(AutoDeliveryReport {
            orders_updated: updates.len(),
            updates,
            stock_updates,
            failures,
        })
    }

    async fn save(&self, order: &PurchaseOrder, expected_version: i64) -> AppResult<PurchaseOrder> {
        self.store
            .update_purchase_order(order, expected_version)
            .await?
            .ok_or_else(|| AppError::Conflict {
                resource: "purchaseOrder".to_string(),
                message: format!(
                    "Purchase order {} was changed by another request; reload and retry",
                    order.po_number
                ),
            })
    }

    /// Receive each line into stock. A line that cannot be received is
    /// reported as a warning and the rest still go through.
    async fn receive(&self, order: &PurchaseOrder, actor: &str, now: DateTime<Utc>) -> Receipt {
        let mut receipt = Receipt {
            stock_updates: Vec::with_capacity(order.lines.len()),
            warnings: Vec::new(),
        };

        for line in &order.lines {
            match self.stock.receive_line(line, &order.po_number, actor, now).await {
                Ok(Some(update)) => receipt.stock_updates.push(update),
                Ok(None) => receipt.warnings.push(ItemFailure::new(
                    line.chemical_id,
                    &line.chemical_name,
                    "chemical not found",
                )),
                Err(e) => {
                    tracing::warn!(
                        po_number = %order.po_number,
                        chemical_id = %line.chemical_id,
                        error = %e,
                        "Failed to receive line"
                    );
                    receipt
                        .warnings
                        .push(ItemFailure::new(line.chemical_id, &line.chemical_name, e));
                }
            }
        }

        receipt
    }
}
