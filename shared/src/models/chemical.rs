//! Chemical inventory models and the stock status rule

use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::string_enum;
use crate::validation::ValidationFailure;

/// Window (in days) inside which a chemical counts as expiring soon
pub const EXPIRING_SOON_DAYS: i64 = 30;

/// Shelf life granted to a chemical when a new delivery arrives
pub const DELIVERY_SHELF_LIFE_EXTENSION_MONTHS: u32 = 2;

const MILLIS_PER_DAY: i64 = 86_400_000;

string_enum! {
    /// Chemical category
    pub enum ChemicalCategory {
        InorganicSalt => "Inorganic Salt",
        OrganicSolvent => "Organic Solvent",
        Acid => "Acid",
        Base => "Base",
        Alcohol => "Alcohol",
        Polymer => "Polymer",
        Catalyst => "Catalyst",
        Dye => "Dye",
        SpecialtyChemical => "Specialty Chemical",
    }
}

string_enum! {
    /// Unit a chemical is stocked in
    pub enum ChemicalUnit {
        Kilogram => "kg",
        Litre => "L",
        Gram => "g",
        Millilitre => "mL",
        Tonne => "tons",
    }
}

string_enum! {
    /// Lifecycle status derived from quantity, threshold and expiry
    pub enum ChemicalStatus {
        Active => "active",
        LowStock => "low_stock",
        OutOfStock => "out_of_stock",
        Expired => "expired",
        ExpiringSoon => "expiring_soon",
    }
}

/// A stocked chemical batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Chemical {
    pub id: Uuid,
    pub name: String,
    pub formula: Option<String>,
    pub category: ChemicalCategory,
    pub quantity: Decimal,
    pub unit: ChemicalUnit,
    /// Unique across the inventory
    pub batch_no: String,
    pub expiry_date: DateTime<Utc>,
    pub reorder_threshold: Decimal,
    pub supplier: String,
    pub cost_per_unit: Decimal,
    pub location: String,
    pub status: ChemicalStatus,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chemical {
    /// Whole days until expiry as seen from `now`
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        days_until_expiry(self.expiry_date, now)
    }

    /// Status this record should carry as of `now`
    pub fn derived_status(&self, now: DateTime<Utc>) -> ChemicalStatus {
        derive_status(self.quantity, self.reorder_threshold, self.expiry_date, now)
    }

    /// Recompute `status` and stamp `last_updated`. Called before every write.
    pub fn refresh_status(&mut self, now: DateTime<Utc>) {
        self.status = self.derived_status(now);
        self.last_updated = now;
        self.updated_at = now;
    }

    /// Reject records that break the numeric invariants, e.g. legacy rows
    /// written before validation existed.
    pub fn check_integrity(&self) -> Result<(), ValidationFailure> {
        if self.quantity < Decimal::ZERO {
            return Err(ValidationFailure::new(
                "quantity",
                format!("Chemical {} has a negative quantity", self.id),
            ));
        }
        if self.reorder_threshold < Decimal::ZERO {
            return Err(ValidationFailure::new(
                "reorderThreshold",
                format!("Chemical {} has a negative reorder threshold", self.id),
            ));
        }
        Ok(())
    }
}

/// Ceiling of `(expiry - now)` in whole days. Zero or negative means expired
/// (or expiring today).
pub fn days_until_expiry(expiry: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = expiry.signed_duration_since(now).num_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) > 0 {
        days + 1
    } else {
        days
    }
}

/// Derive a chemical's status. First match wins:
///
/// 1. quantity is zero: `out_of_stock` (even when also expired)
/// 2. expiry reached: `expired`
/// 3. quantity at or under the reorder threshold: `low_stock`
/// 4. expiry within [`EXPIRING_SOON_DAYS`]: `expiring_soon`
/// 5. otherwise `active`
pub fn derive_status(
    quantity: Decimal,
    reorder_threshold: Decimal,
    expiry_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ChemicalStatus {
    let days = days_until_expiry(expiry_date, now);

    if quantity.is_zero() {
        ChemicalStatus::OutOfStock
    } else if days <= 0 {
        ChemicalStatus::Expired
    } else if quantity <= reorder_threshold {
        ChemicalStatus::LowStock
    } else if days <= EXPIRING_SOON_DAYS {
        ChemicalStatus::ExpiringSoon
    } else {
        ChemicalStatus::Active
    }
}

/// Push an expiry date forward by the delivery shelf-life extension.
///
/// Month arithmetic clamps to the end of the target month, so Dec 31 becomes
/// the last day of February. Returns `None` only past chrono's date range.
pub fn extend_expiry(expiry_date: DateTime<Utc>) -> Option<DateTime<Utc>> {
    expiry_date.checked_add_months(Months::new(DELIVERY_SHELF_LIFE_EXTENSION_MONTHS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn dec(n: i64) -> Decimal {
        Decimal::from(n)
    }

    #[test]
    fn test_days_until_expiry_rounds_up() {
        let now = now();
        assert_eq!(days_until_expiry(now, now), 0);
        assert_eq!(days_until_expiry(now + Duration::seconds(1), now), 1);
        assert_eq!(days_until_expiry(now + Duration::days(1), now), 1);
        assert_eq!(days_until_expiry(now + Duration::days(1) + Duration::hours(1), now), 2);
        assert_eq!(days_until_expiry(now - Duration::hours(5), now), 0);
        assert_eq!(days_until_expiry(now - Duration::days(3), now), -3);
    }

    #[test]
    fn test_out_of_stock_beats_expired() {
        let status = derive_status(dec(0), dec(10), now() - Duration::days(30), now());
        assert_eq!(status, ChemicalStatus::OutOfStock);
    }

    #[test]
    fn test_expired_beats_low_stock() {
        let status = derive_status(dec(2), dec(10), now() - Duration::days(1), now());
        assert_eq!(status, ChemicalStatus::Expired);
    }

    #[test]
    fn test_expiring_today_is_expired() {
        let status = derive_status(dec(100), dec(10), now(), now());
        assert_eq!(status, ChemicalStatus::Expired);
    }

    #[test]
    fn test_low_stock_beats_expiring_soon() {
        let status = derive_status(dec(10), dec(10), now() + Duration::days(5), now());
        assert_eq!(status, ChemicalStatus::LowStock);
    }

    #[test]
    fn test_expiring_soon_window() {
        let now = now();
        assert_eq!(
            derive_status(dec(100), dec(10), now + Duration::days(30), now),
            ChemicalStatus::ExpiringSoon
        );
        assert_eq!(
            derive_status(dec(100), dec(10), now + Duration::days(31), now),
            ChemicalStatus::Active
        );
        assert_eq!(
            derive_status(dec(100), dec(10), now + Duration::days(1), now),
            ChemicalStatus::ExpiringSoon
        );
    }

    #[test]
    fn test_extend_expiry_adds_two_months() {
        let expiry = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        assert_eq!(
            extend_expiry(expiry),
            Some(Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_extend_expiry_clamps_month_end() {
        let expiry = Utc.with_ymd_and_hms(2023, 12, 31, 8, 0, 0).unwrap();
        assert_eq!(
            extend_expiry(expiry),
            Some(Utc.with_ymd_and_hms(2024, 2, 29, 8, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_category_round_trips_display_name() {
        assert_eq!(ChemicalCategory::InorganicSalt.as_str(), "Inorganic Salt");
        assert_eq!(
            "Specialty Chemical".parse::<ChemicalCategory>(),
            Ok(ChemicalCategory::SpecialtyChemical)
        );
        assert!("Gas".parse::<ChemicalCategory>().is_err());
        assert_eq!(ChemicalCategory::ALL.len(), 9);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ChemicalStatus::ExpiringSoon).unwrap();
        assert_eq!(json, "\"expiring_soon\"");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Every input maps to exactly the status the priority table predicts
        #[test]
        fn prop_status_follows_priority_order(
            quantity in 0i64..500,
            threshold in 0i64..500,
            offset_hours in -2000i64..2000,
        ) {
            let now = now();
            let expiry = now + Duration::hours(offset_hours);
            let days = days_until_expiry(expiry, now);
            let status = derive_status(dec(quantity), dec(threshold), expiry, now);

            let expected = if quantity == 0 {
                ChemicalStatus::OutOfStock
            } else if days <= 0 {
                ChemicalStatus::Expired
            } else if quantity <= threshold {
                ChemicalStatus::LowStock
            } else if days <= EXPIRING_SOON_DAYS {
                ChemicalStatus::ExpiringSoon
            } else {
                ChemicalStatus::Active
            };
            prop_assert_eq!(status, expected);
            prop_assert!(ChemicalStatus::ALL.contains(&status));
        }

        /// Zero stock is never reported as expired
        #[test]
        fn prop_zero_quantity_is_out_of_stock(
            threshold in 0i64..500,
            offset_days in -400i64..400,
        ) {
            let now = now();
            let status = derive_status(dec(0), dec(threshold), now + Duration::days(offset_days), now);
            prop_assert_eq!(status, ChemicalStatus::OutOfStock);
        }
    }
}
