//! Supplier models

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::string_enum;

string_enum! {
    pub enum SupplierStatus {
        Active => "active",
        Inactive => "inactive",
    }
}

/// A chemical supplier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    /// Unique across suppliers
    pub name: String,
    pub contact: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// 0 to 5
    pub rating: Decimal,
    pub chemicals: Vec<String>,
    pub last_order_date: Option<DateTime<Utc>>,
    pub total_orders: i32,
    pub status: SupplierStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Supplier {
    /// Score out of 100: 30% order volume (saturating at 10 orders), 70% rating
    pub fn performance_score(&self) -> u32 {
        let ten = Decimal::from(10);
        let orders = Decimal::from(self.total_orders.max(0));
        let volume = if orders > ten { Decimal::ONE } else { orders / ten };
        let rating = self.rating / Decimal::from(5);

        let score = (volume * Decimal::new(3, 1) + rating * Decimal::new(7, 1)) * Decimal::from(100);
        score.round().to_u32().unwrap_or(0)
    }
}
