//! Business logic services for the ChemTrack inventory platform

use serde::Serialize;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub mod activity_log;
pub mod alert;
pub mod chemical;
pub mod purchase_order;
pub mod stock;
pub mod supplier;

pub use activity_log::ActivityLogService;
pub use alert::AlertService;
pub use chemical::ChemicalService;
pub use purchase_order::PurchaseOrderService;
pub use stock::StockService;
pub use supplier::SupplierService;

/// One item a batch operation skipped, reported alongside the batch result
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemFailure {
    pub id: Uuid,
    pub label: String,
    pub reason: String,
}

impl ItemFailure {
    pub fn new(id: Uuid, label: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            id,
            label: label.into(),
            reason: reason.to_string(),
        }
    }
}

/// Parse an optional query filter; absent, empty and "all" mean no filter
pub(crate) fn parse_filter<T>(field: &str, value: Option<&str>) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|e: T::Err| AppError::Validation {
            field: field.to_string(),
            message: e.to_string(),
        }),
    }
}
