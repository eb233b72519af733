//! Alert models and the chemical condition to alert mapping

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Chemical, ChemicalStatus};
use crate::types::string_enum;
use crate::validation::ValidationFailure;

/// Expiring-soon alerts at or under this many days are escalated
pub const URGENT_EXPIRY_DAYS: i64 = 7;

string_enum! {
    /// Alert type
    pub enum AlertType {
        LowStock => "low_stock",
        OutOfStock => "out_of_stock",
        ExpiryWarning => "expiry_warning",
        System => "system",
        General => "general",
        QualityIssue => "quality_issue",
        DeliveryDelay => "delivery_delay",
    }
}

string_enum! {
    /// Alert severity
    pub enum AlertSeverity {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

string_enum! {
    /// Stock condition an automatically generated alert reports.
    ///
    /// Separates the two flavours of `expiry_warning` so deduplication never
    /// has to look at message text.
    pub enum AlertReason {
        OutOfStock => "out_of_stock",
        Expired => "expired",
        LowStock => "low_stock",
        ExpiringSoon => "expiring_soon",
    }
}

/// A notification shown to inventory managers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub title: String,
    pub message: String,
    /// Weak reference; the chemical may have been deleted since
    pub chemical_id: Option<Uuid>,
    /// Set on alerts raised from a chemical's stock condition
    pub reason: Option<AlertReason>,
    pub severity: AlertSeverity,
    pub is_read: bool,
    pub action_required: bool,
    pub timestamp: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Alert {
    /// Stock condition this alert reports.
    ///
    /// Alerts stored without a reason (entered by hand, or written before
    /// reasons existed) are classified by type, and expiry warnings by
    /// whether the message says "expired".
    pub fn condition_reason(&self) -> Option<AlertReason> {
        if self.reason.is_some() {
            return self.reason;
        }
        match self.alert_type {
            AlertType::OutOfStock => Some(AlertReason::OutOfStock),
            AlertType::LowStock => Some(AlertReason::LowStock),
            AlertType::ExpiryWarning if self.message.to_lowercase().contains("expired") => {
                Some(AlertReason::Expired)
            }
            AlertType::ExpiryWarning => Some(AlertReason::ExpiringSoon),
            _ => None,
        }
    }
}

/// The alert-worthy condition of a chemical at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertCondition {
    pub reason: AlertReason,
    pub days_until_expiry: i64,
}

impl AlertCondition {
    /// Evaluate a chemical with the same priority order as status derivation.
    /// `Ok(None)` means the chemical is healthy.
    pub fn evaluate(
        chemical: &Chemical,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, ValidationFailure> {
        chemical.check_integrity()?;

        let days_until_expiry = chemical.days_until_expiry(now);
        let reason = match chemical.derived_status(now) {
            ChemicalStatus::OutOfStock => AlertReason::OutOfStock,
            ChemicalStatus::Expired => AlertReason::Expired,
            ChemicalStatus::LowStock => AlertReason::LowStock,
            ChemicalStatus::ExpiringSoon => AlertReason::ExpiringSoon,
            ChemicalStatus::Active => return Ok(None),
        };

        Ok(Some(Self {
            reason,
            days_until_expiry,
        }))
    }

    pub fn alert_type(&self) -> AlertType {
        match self.reason {
            AlertReason::OutOfStock => AlertType::OutOfStock,
            AlertReason::LowStock => AlertType::LowStock,
            AlertReason::Expired | AlertReason::ExpiringSoon => AlertType::ExpiryWarning,
        }
    }

    pub fn severity(&self) -> AlertSeverity {
        match self.reason {
            AlertReason::OutOfStock | AlertReason::Expired => AlertSeverity::Critical,
            AlertReason::LowStock => AlertSeverity::High,
            AlertReason::ExpiringSoon if self.days_until_expiry <= URGENT_EXPIRY_DAYS => {
                AlertSeverity::High
            }
            AlertReason::ExpiringSoon => AlertSeverity::Medium,
        }
    }

    pub fn action_required(&self) -> bool {
        match self.reason {
            AlertReason::ExpiringSoon => self.days_until_expiry <= URGENT_EXPIRY_DAYS,
            _ => true,
        }
    }

    pub fn title(&self, chemical: &Chemical) -> String {
        match self.reason {
            AlertReason::OutOfStock => format!("OUT OF STOCK: {}", chemical.name),
            AlertReason::Expired => format!("EXPIRED: {}", chemical.name),
            AlertReason::LowStock => format!("Low Stock: {}", chemical.name),
            AlertReason::ExpiringSoon => format!("Expiring Soon: {}", chemical.name),
        }
    }

    pub fn message(&self, chemical: &Chemical) -> String {
        let expiry = chemical.expiry_date.format("%Y-%m-%d");
        match self.reason {
            AlertReason::OutOfStock => format!(
                "{} (Batch: {}) is completely out of stock. Immediate reorder required.",
                chemical.name, chemical.batch_no
            ),
            AlertReason::Expired => format!(
                "{} (Batch: {}) has expired on {}. Remove from inventory immediately.",
                chemical.name, chemical.batch_no, expiry
            ),
            AlertReason::LowStock => format!(
                "{} (Batch: {}) is running low. Current: {} {}, Threshold: {} {}. Reorder recommended.",
                chemical.name,
                chemical.batch_no,
                chemical.quantity.normalize(),
                chemical.unit,
                chemical.reorder_threshold.normalize(),
                chemical.unit
            ),
            AlertReason::ExpiringSoon => format!(
                "{} (Batch: {}) will expire in {} days on {}. Plan usage or disposal.",
                chemical.name, chemical.batch_no, self.days_until_expiry, expiry
            ),
        }
    }

    /// Build the unread alert this condition calls for
    pub fn to_alert(&self, chemical: &Chemical, now: DateTime<Utc>) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            alert_type: self.alert_type(),
            title: self.title(chemical),
            message: self.message(chemical),
            chemical_id: Some(chemical.id),
            reason: Some(self.reason),
            severity: self.severity(),
            is_read: false,
            action_required: self.action_required(),
            timestamp: now,
            resolved_at: None,
            resolved_by: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Unread alert totals per severity
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeverityCounts {
    pub critical: u64,
    pub high: u64,
    pub medium: u64,
    pub low: u64,
    pub total: u64,
}

impl SeverityCounts {
    pub fn add(&mut self, severity: AlertSeverity, count: u64) {
        match severity {
            AlertSeverity::Critical => self.critical += count,
            AlertSeverity::High => self.high += count,
            AlertSeverity::Medium => self.medium += count,
            AlertSeverity::Low => self.low += count,
        }
        self.total += count;
    }

    /// Tally only the unread alerts
    pub fn from_unread<'a>(alerts: impl IntoIterator<Item = &'a Alert>) -> Self {
        let mut counts = Self::default();
        for alert in alerts.into_iter().filter(|a| !a.is_read) {
            counts.add(alert.severity, 1);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChemicalCategory, ChemicalUnit};
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 9, 30, 0).unwrap()
    }

    fn chemical(quantity: i64, threshold: i64, expiry_in_days: i64) -> Chemical {
        let now = now();
        Chemical {
            id: Uuid::new_v4(),
            name: "Sodium Chloride".to_string(),
            formula: Some("NaCl".to_string()),
            category: ChemicalCategory::InorganicSalt,
            quantity: Decimal::from(quantity),
            unit: ChemicalUnit::Kilogram,
            batch_no: "NACL-001".to_string(),
            expiry_date: now + Duration::days(expiry_in_days),
            reorder_threshold: Decimal::from(threshold),
            supplier: "ChemSupply Co".to_string(),
            cost_per_unit: Decimal::from(12),
            location: "Shelf A1".to_string(),
            status: ChemicalStatus::Active,
            last_updated: now,
            created_at: now,
            updated_at: now,
        }
    }

    fn evaluate(c: &Chemical) -> Option<AlertCondition> {
        AlertCondition::evaluate(c, now()).unwrap()
    }

    #[test]
    fn test_out_of_stock_condition() {
        let cond = evaluate(&chemical(0, 10, -5)).unwrap();
        assert_eq!(cond.reason, AlertReason::OutOfStock);
        assert_eq!(cond.alert_type(), AlertType::OutOfStock);
        assert_eq!(cond.severity(), AlertSeverity::Critical);
        assert!(cond.action_required());
    }

    #[test]
    fn test_expired_condition() {
        let c = chemical(20, 10, 0);
        let cond = evaluate(&c).unwrap();
        assert_eq!(cond.reason, AlertReason::Expired);
        assert_eq!(cond.alert_type(), AlertType::ExpiryWarning);
        assert_eq!(cond.severity(), AlertSeverity::Critical);
        assert!(cond.message(&c).contains("expired"));
    }

    #[test]
    fn test_low_stock_condition() {
        let c = chemical(5, 50, 400);
        let cond = evaluate(&c).unwrap();
        assert_eq!(cond.alert_type(), AlertType::LowStock);
        assert_eq!(cond.severity(), AlertSeverity::High);
        assert!(cond.action_required());
        assert!(cond.message(&c).contains("Current: 5 kg, Threshold: 50 kg"));
    }

    #[test]
    fn test_expiring_soon_severity_boundary() {
        let seven = evaluate(&chemical(100, 10, 7)).unwrap();
        assert_eq!(seven.reason, AlertReason::ExpiringSoon);
        assert_eq!(seven.severity(), AlertSeverity::High);
        assert!(seven.action_required());

        let eight = evaluate(&chemical(100, 10, 8)).unwrap();
        assert_eq!(eight.severity(), AlertSeverity::Medium);
        assert!(!eight.action_required());
        assert!(eight.message(&chemical(100, 10, 8)).contains("expire in 8 days"));
    }

    #[test]
    fn test_healthy_chemical_has_no_condition() {
        assert_eq!(evaluate(&chemical(100, 10, 120)), None);
    }

    #[test]
    fn test_negative_quantity_is_rejected() {
        let mut c = chemical(5, 10, 100);
        c.quantity = Decimal::from(-3);
        let err = AlertCondition::evaluate(&c, now()).unwrap_err();
        assert_eq!(err.field, "quantity");
    }

    #[test]
    fn test_to_alert_links_chemical() {
        let c = chemical(0, 10, 100);
        let alert = evaluate(&c).unwrap().to_alert(&c, now());
        assert_eq!(alert.chemical_id, Some(c.id));
        assert_eq!(alert.reason, Some(AlertReason::OutOfStock));
        assert!(!alert.is_read);
        assert_eq!(alert.title, "OUT OF STOCK: Sodium Chloride");
    }

    #[test]
    fn test_severity_counts_skip_read_alerts() {
        let c = chemical(0, 10, 100);
        let mut read = evaluate(&c).unwrap().to_alert(&c, now());
        read.is_read = true;
        let unread = evaluate(&c).unwrap().to_alert(&c, now());
        let low = evaluate(&chemical(5, 10, 100)).unwrap().to_alert(&c, now());

        let counts = SeverityCounts::from_unread([&read, &unread, &low]);
        assert_eq!(counts.critical, 1);
        assert_eq!(counts.high, 1);
        assert_eq!(counts.total, 2);
    }

    #[test]
    fn test_condition_reason_without_stored_reason() {
        let c = chemical(0, 10, 100);
        let mut alert = evaluate(&c).unwrap().to_alert(&c, now());
        alert.reason = None;
        assert_eq!(alert.condition_reason(), Some(AlertReason::OutOfStock));

        alert.alert_type = AlertType::ExpiryWarning;
        alert.message = "Batch NACL-001 has EXPIRED".to_string();
        assert_eq!(alert.condition_reason(), Some(AlertReason::Expired));

        alert.message = "Batch NACL-001 is expiring next week".to_string();
        assert_eq!(alert.condition_reason(), Some(AlertReason::ExpiringSoon));

        alert.alert_type = AlertType::General;
        assert_eq!(alert.condition_reason(), None);
    }

    #[test]
    fn test_alert_serializes_type_field() {
        let c = chemical(0, 10, 100);
        let alert = evaluate(&c).unwrap().to_alert(&c, now());
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["type"], "out_of_stock");
        assert_eq!(json["isRead"], false);
        assert_eq!(json["actionRequired"], true);
    }
}
