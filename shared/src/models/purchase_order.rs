//! Purchase order models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::string_enum;

string_enum! {
    /// Purchase order status
    pub enum PurchaseOrderStatus {
        Pending => "pending",
        Approved => "approved",
        Shipped => "shipped",
        Delivered => "delivered",
        Cancelled => "cancelled",
    }
}

impl PurchaseOrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Delivered and cancelled orders are final. Re-saving the same status is
    /// always accepted.
    pub fn can_transition_to(&self, next: PurchaseOrderStatus) -> bool {
        *self == next || !self.is_terminal()
    }
}

string_enum! {
    /// Purchase order priority
    #[derive(Default)]
    pub enum PurchaseOrderPriority {
        Low => "low",
        #[default]
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

/// One ordered chemical
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderLine {
    pub chemical_id: Uuid,
    pub chemical_name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub total: Decimal,
}

impl PurchaseOrderLine {
    pub fn new(
        chemical_id: Uuid,
        chemical_name: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
    ) -> Self {
        Self {
            chemical_id,
            chemical_name: chemical_name.into(),
            quantity,
            unit_price,
            total: quantity * unit_price,
        }
    }
}

/// An order placed with a supplier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub id: Uuid,
    /// Unique across all orders
    pub po_number: String,
    pub supplier: String,
    #[serde(rename = "chemicals")]
    pub lines: Vec<PurchaseOrderLine>,
    /// Always the sum of line totals
    pub total_amount: Decimal,
    pub order_date: DateTime<Utc>,
    pub expected_delivery: DateTime<Utc>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub status: PurchaseOrderStatus,
    pub priority: PurchaseOrderPriority,
    pub notes: Option<String>,
    /// Optimistic concurrency token, bumped on every write
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PurchaseOrder {
    /// Recompute every line total and the order total
    pub fn recompute_totals(&mut self) {
        for line in &mut self.lines {
            line.total = line.quantity * line.unit_price;
        }
        self.total_amount = self.lines.iter().map(|l| l.total).sum();
    }

    pub fn is_delivered(&self) -> bool {
        self.status == PurchaseOrderStatus::Delivered
    }

}

/// Generate a PO number, e.g. "PO-1718441400000-0007"
pub fn generate_po_number(now: DateTime<Utc>, sequence: u64) -> String {
    format!("PO-{}-{:04}", now.timestamp_millis(), sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn order(lines: Vec<PurchaseOrderLine>) -> PurchaseOrder {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        PurchaseOrder {
            id: Uuid::new_v4(),
            po_number: "PO-1".to_string(),
            supplier: "ChemSupply Co".to_string(),
            lines,
            total_amount: Decimal::ZERO,
            order_date: now,
            expected_delivery: now,
            actual_delivery: None,
            status: PurchaseOrderStatus::Pending,
            priority: PurchaseOrderPriority::default(),
            notes: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_terminal_statuses() {
        use PurchaseOrderStatus::*;
        assert!(Pending.can_transition_to(Delivered));
        assert!(Shipped.can_transition_to(Cancelled));
        assert!(Approved.can_transition_to(Pending));
        assert!(Delivered.can_transition_to(Delivered));
        assert!(!Delivered.can_transition_to(Shipped));
        assert!(!Cancelled.can_transition_to(Delivered));
    }

    #[test]
    fn test_recompute_totals() {
        let id = Uuid::new_v4();
        let mut po = order(vec![
            PurchaseOrderLine::new(id, "Acetone", Decimal::from(10), Decimal::new(250, 2)),
            PurchaseOrderLine::new(Uuid::new_v4(), "Ethanol", Decimal::from(4), Decimal::from(3)),
        ]);
        po.lines[0].quantity = Decimal::from(20);
        po.recompute_totals();
        assert_eq!(po.lines[0].total, Decimal::from(50));
        assert_eq!(po.total_amount, Decimal::from(62));
    }

    #[test]
    fn test_default_priority_is_medium() {
        assert_eq!(PurchaseOrderPriority::default(), PurchaseOrderPriority::Medium);
    }

    #[test]
    fn test_po_number_format() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap();
        let number = generate_po_number(now, 7);
        assert_eq!(number, format!("PO-{}-0007", now.timestamp_millis()));
    }

    #[test]
    fn test_lines_serialize_as_chemicals() {
        let po = order(vec![]);
        let json = serde_json::to_value(&po).unwrap();
        assert!(json["chemicals"].is_array());
        assert_eq!(json["status"], "pending");
        assert_eq!(json["priority"], "medium");
    }

    proptest! {
        /// Total amount equals the sum of quantity * unit price
        #[test]
        fn prop_total_is_sum_of_lines(
            items in prop::collection::vec((1i64..1000, 1i64..100000), 0..10)
        ) {
            let lines = items
                .iter()
                .map(|(q, p)| {
                    let mut line = PurchaseOrderLine::new(
                        Uuid::new_v4(), "X", Decimal::from(*q), Decimal::new(*p, 2));
                    line.total = Decimal::ZERO;
                    line
                })
                .collect();
            let mut po = order(lines);
            po.recompute_totals();

            let expected: Decimal = items
                .iter()
                .map(|(q, p)| Decimal::from(*q) * Decimal::new(*p, 2))
                .sum();
            prop_assert_eq!(po.total_amount, expected);
        }
    }
}
