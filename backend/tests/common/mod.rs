//! Fixtures shared by the integration tests
#![allow(dead_code)]

use chemtrack_backend::services::purchase_order::{CreatePurchaseOrderInput, LineInput};
use chemtrack_backend::store::{InventoryStore, MemoryStore};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use shared::{Chemical, ChemicalCategory, ChemicalStatus, ChemicalUnit};
use std::sync::Arc;
use uuid::Uuid;

/// Fixed clock for every test: 2024-06-15 09:00 UTC
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap()
}

pub fn memory_store() -> Arc<dyn InventoryStore> {
    Arc::new(MemoryStore::new())
}

/// A chemical whose stored status is consistent as of `now()`
pub fn chemical(name: &str, quantity: i64, threshold: i64, expiry_in_days: i64) -> Chemical {
    let now = now();
    let mut chemical = Chemical {
        id: Uuid::new_v4(),
        name: name.to_string(),
        formula: None,
        category: ChemicalCategory::OrganicSolvent,
        quantity: Decimal::from(quantity),
        unit: ChemicalUnit::Litre,
        batch_no: format!("{}-{}", name.to_uppercase().replace(' ', "-"), Uuid::new_v4()),
        expiry_date: now + Duration::days(expiry_in_days),
        reorder_threshold: Decimal::from(threshold),
        supplier: "ChemSupply Co".to_string(),
        cost_per_unit: Decimal::from(10),
        location: "Store Room B".to_string(),
        status: ChemicalStatus::Active,
        last_updated: now,
        created_at: now,
        updated_at: now,
    };
    chemical.refresh_status(now);
    chemical
}

pub async fn seed(store: &Arc<dyn InventoryStore>, chemicals: &[Chemical]) {
    for chemical in chemicals {
        store.insert_chemical(chemical).await.unwrap();
    }
}

pub fn line(chemical: &Chemical, quantity: i64, unit_price: i64) -> LineInput {
    LineInput {
        chemical_id: chemical.id,
        chemical_name: chemical.name.clone(),
        quantity: Decimal::from(quantity),
        unit_price: Decimal::from(unit_price),
    }
}

pub fn order_input(lines: Vec<LineInput>, expected_delivery: DateTime<Utc>) -> CreatePurchaseOrderInput {
    CreatePurchaseOrderInput {
        po_number: None,
        supplier: "ChemSupply Co".to_string(),
        chemicals: lines,
        order_date: None,
        expected_delivery,
        status: None,
        priority: None,
        notes: None,
    }
}

pub async fn alerts_for(store: &Arc<dyn InventoryStore>, chemical_id: Uuid) -> Vec<shared::Alert> {
    store
        .all_alerts()
        .await
        .unwrap()
        .into_iter()
        .filter(|a| a.chemical_id == Some(chemical_id))
        .collect()
}
