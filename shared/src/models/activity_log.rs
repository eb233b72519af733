//! Activity log (audit trail) models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::ChemicalStatus;
use crate::types::string_enum;

/// Actor recorded for changes made by the platform itself
pub const SYSTEM_USER: &str = "System";

string_enum! {
    pub enum ActivityCategory {
        StockUpdate => "stock_update",
        PurchaseOrder => "purchase_order",
        Supplier => "supplier",
        Alert => "alert",
        User => "user",
        System => "system",
    }
}

string_enum! {
    pub enum ActivitySeverity {
        Info => "info",
        Warning => "warning",
        Error => "error",
        Success => "success",
    }
}

/// Append-only audit entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: Uuid,
    pub action: String,
    pub category: ActivityCategory,
    pub severity: ActivitySeverity,
    pub user: String,
    pub details: String,
    pub metadata: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl ActivityLog {
    pub fn new(
        action: impl Into<String>,
        category: ActivityCategory,
        severity: ActivitySeverity,
        user: impl Into<String>,
        details: impl Into<String>,
        metadata: serde_json::Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action: action.into(),
            category,
            severity,
            user: user.into(),
            details: details.into(),
            metadata,
            timestamp,
        }
    }

    pub fn stock_increased(
        chemical_name: &str,
        chemical_id: Uuid,
        old_quantity: Decimal,
        new_quantity: Decimal,
        reason: &str,
        user: &str,
        at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            "Stock Increased",
            ActivityCategory::StockUpdate,
            ActivitySeverity::Success,
            user,
            format!(
                "{}: Stock increased from {} to {} ({})",
                chemical_name,
                old_quantity.normalize(),
                new_quantity.normalize(),
                reason
            ),
            json!({
                "chemicalId": chemical_id,
                "chemicalName": chemical_name,
                "oldValue": old_quantity,
                "newValue": new_quantity,
                "quantityChange": new_quantity - old_quantity,
                "reason": reason,
            }),
            at,
        )
    }

    pub fn price_updated(
        chemical_name: &str,
        chemical_id: Uuid,
        old_price: Decimal,
        new_price: Decimal,
        user: &str,
        at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            "Price Updated",
            ActivityCategory::StockUpdate,
            ActivitySeverity::Info,
            user,
            format!(
                "{}: Price updated from {} to {}",
                chemical_name,
                old_price.normalize(),
                new_price.normalize()
            ),
            json!({
                "chemicalId": chemical_id,
                "chemicalName": chemical_name,
                "oldValue": old_price,
                "newValue": new_price,
            }),
            at,
        )
    }

    pub fn expiry_extended(
        chemical_name: &str,
        chemical_id: Uuid,
        old_expiry: DateTime<Utc>,
        new_expiry: DateTime<Utc>,
        user: &str,
        at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            "Expiry Date Extended",
            ActivityCategory::StockUpdate,
            ActivitySeverity::Info,
            user,
            format!(
                "{}: Expiry extended from {} to {}",
                chemical_name,
                old_expiry.format("%Y-%m-%d"),
                new_expiry.format("%Y-%m-%d")
            ),
            json!({
                "chemicalId": chemical_id,
                "chemicalName": chemical_name,
                "oldValue": old_expiry,
                "newValue": new_expiry,
            }),
            at,
        )
    }

    pub fn status_changed(
        chemical_name: &str,
        chemical_id: Uuid,
        old_status: ChemicalStatus,
        new_status: ChemicalStatus,
        user: &str,
        at: DateTime<Utc>,
    ) -> Self {
        // Recovering from a blocking status is good news
        let severity = match old_status {
            ChemicalStatus::Expired | ChemicalStatus::OutOfStock => ActivitySeverity::Success,
            _ => ActivitySeverity::Info,
        };
        Self::new(
            "Chemical Status Changed",
            ActivityCategory::StockUpdate,
            severity,
            user,
            format!(
                "{}: Status changed from \"{}\" to \"{}\"",
                chemical_name, old_status, new_status
            ),
            json!({
                "chemicalId": chemical_id,
                "chemicalName": chemical_name,
                "oldValue": old_status,
                "newValue": new_status,
            }),
            at,
        )
    }

    pub fn po_created(
        po_number: &str,
        supplier: &str,
        total_amount: Decimal,
        user: &str,
        at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            "Purchase Order Created",
            ActivityCategory::PurchaseOrder,
            ActivitySeverity::Success,
            user,
            format!(
                "Created PO {} for supplier {} with total amount {}",
                po_number,
                supplier,
                total_amount.normalize()
            ),
            json!({
                "poNumber": po_number,
                "supplier": supplier,
                "totalAmount": total_amount,
            }),
            at,
        )
    }

    pub fn po_delivered(po_number: &str, item_count: usize, user: &str, at: DateTime<Utc>) -> Self {
        Self::new(
            "Purchase Order Delivered",
            ActivityCategory::PurchaseOrder,
            ActivitySeverity::Success,
            user,
            format!("PO {} marked as delivered with {} item(s)", po_number, item_count),
            json!({ "poNumber": po_number, "itemCount": item_count }),
            at,
        )
    }

    pub fn alert_cleared(
        alert_type: &str,
        subject: &str,
        reason: &str,
        user: &str,
        at: DateTime<Utc>,
    ) -> Self {
        Self::new(
            "Alert Cleared",
            ActivityCategory::Alert,
            ActivitySeverity::Success,
            user,
            format!("Alert cleared: {} for {} ({})", alert_type, subject, reason),
            json!({ "alertType": alert_type, "subject": subject, "reason": reason }),
            at,
        )
    }

    pub fn supplier_added(supplier_name: &str, user: &str, at: DateTime<Utc>) -> Self {
        Self::new(
            "Supplier Added",
            ActivityCategory::Supplier,
            ActivitySeverity::Success,
            user,
            format!("New supplier added: {}", supplier_name),
            json!({ "supplierName": supplier_name }),
            at,
        )
    }
}
