//! Alert synchronization tests
//!
//! Tests for keeping alerts consistent with chemical state:
//! - Property 2: No duplicate unread alerts across repeated syncs
//! - Property 3: Targeted resync is a hard reset
//! - Property 4: Cascade delete removes every referencing alert
//! - Property 5: Orphan cleanup is exhaustive
//! - Property 8: Expiring-soon severity boundary

mod common;

use chemtrack_backend::services::alert::CreateAlertInput;
use chemtrack_backend::services::chemical::UpdateChemicalInput;
use chemtrack_backend::services::{AlertService, ChemicalService};
use chrono::Duration;
use common::{alerts_for, chemical, memory_store, now, seed};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{Alert, AlertReason, AlertSeverity, AlertType};
use uuid::Uuid;

fn manual_alert(chemical_id: Option<Uuid>, title: &str) -> Alert {
    let now = now();
    Alert {
        id: Uuid::new_v4(),
        alert_type: AlertType::General,
        title: title.to_string(),
        message: "Checked by operator".to_string(),
        chemical_id,
        reason: None,
        severity: AlertSeverity::Low,
        is_read: false,
        action_required: false,
        timestamp: now,
        resolved_at: None,
        resolved_by: None,
        created_at: now,
        updated_at: now,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Property 2: a second sync with no changes creates nothing
    #[tokio::test]
    async fn test_repeated_sync_creates_no_duplicates() {
        let store = memory_store();
        seed(
            &store,
            &[
                chemical("Acetone", 0, 10, 300),
                chemical("Ethanol", 3, 10, 300),
                chemical("Methanol", 100, 10, 12),
                chemical("Toluene", 100, 10, 300),
            ],
        )
        .await;
        let service = AlertService::new(store.clone());

        let first = service.sync_all(now()).await.unwrap();
        assert_eq!(first.new_alerts_count, 3);

        let second = service.sync_all(now()).await.unwrap();
        assert_eq!(second.new_alerts_count, 0);
        assert_eq!(second.severity_counts.total, 3);
        assert_eq!(store.all_alerts().await.unwrap().len(), 3);
    }

    /// Property 3: low stock to active clears the chemical's alert only
    #[tokio::test]
    async fn test_resync_after_edit_is_hard_reset() {
        let store = memory_store();
        let edited = chemical("Ethanol", 3, 10, 300);
        let other = chemical("Isopropanol", 2, 10, 300);
        seed(&store, &[edited.clone(), other.clone()]).await;

        AlertService::new(store.clone()).sync_all(now()).await.unwrap();
        assert_eq!(alerts_for(&store, edited.id).await.len(), 1);

        let update = ChemicalService::new(store.clone())
            .update(
                edited.id,
                UpdateChemicalInput {
                    quantity: Some(Decimal::from(250)),
                    ..Default::default()
                },
                now(),
            )
            .await
            .unwrap();

        assert_eq!(update.alerts_updated.deleted, 1);
        assert_eq!(update.alerts_updated.created, 0);
        assert!(alerts_for(&store, edited.id).await.is_empty());
        assert_eq!(alerts_for(&store, other.id).await.len(), 1);
    }

    /// Property 3: read alerts are reset too
    #[tokio::test]
    async fn test_resync_removes_read_alerts() {
        let store = memory_store();
        let chem = chemical("Ethanol", 3, 10, 300);
        seed(&store, &[chem.clone()]).await;

        let service = AlertService::new(store.clone());
        service.sync_all(now()).await.unwrap();
        let mut alert = alerts_for(&store, chem.id).await.remove(0);
        alert.is_read = true;
        store.update_alert(&alert).await.unwrap();

        let outcome = service.resync_chemical(&chem, now()).await.unwrap();
        assert_eq!(outcome.deleted, 1);
        assert_eq!(outcome.created, 1);

        let remaining = alerts_for(&store, chem.id).await;
        assert_eq!(remaining.len(), 1);
        assert!(!remaining[0].is_read);
    }

    /// Property 4: deleting a chemical reports every alert it removed
    #[tokio::test]
    async fn test_cascade_delete_counts_alerts() {
        let store = memory_store();
        let doomed = chemical("Benzene", 0, 10, 300);
        let kept = chemical("Xylene", 0, 10, 300);
        seed(&store, &[doomed.clone(), kept.clone()]).await;

        AlertService::new(store.clone()).sync_all(now()).await.unwrap();
        store
            .insert_alerts(&[
                manual_alert(Some(doomed.id), "Drum dented"),
                manual_alert(Some(doomed.id), "Label faded"),
            ])
            .await
            .unwrap();

        let deletion = ChemicalService::new(store.clone())
            .delete(doomed.id)
            .await
            .unwrap();

        assert_eq!(deletion.deleted_alerts, 3);
        assert!(alerts_for(&store, doomed.id).await.is_empty());
        assert_eq!(alerts_for(&store, kept.id).await.len(), 1);
    }

    /// Property 5: dangling references go, live and unreferenced alerts stay
    #[tokio::test]
    async fn test_orphan_cleanup_is_exhaustive() {
        let store = memory_store();
        let live = chemical("Acetone", 0, 10, 300);
        seed(&store, &[live.clone()]).await;
        AlertService::new(store.clone()).sync_all(now()).await.unwrap();

        let ghost_a = Uuid::new_v4();
        let ghost_b = Uuid::new_v4();
        store
            .insert_alerts(&[
                manual_alert(Some(ghost_a), "Ghost A"),
                manual_alert(Some(ghost_b), "Ghost B1"),
                manual_alert(Some(ghost_b), "Ghost B2"),
                manual_alert(None, "Fume hood inspection"),
            ])
            .await
            .unwrap();

        let report = AlertService::new(store.clone()).cleanup_orphans().await.unwrap();

        assert_eq!(report.deleted_count, 3);
        assert_eq!(report.orphaned_alerts.len(), 3);
        assert!(report
            .orphaned_alerts
            .iter()
            .all(|o| o.chemical_id == ghost_a || o.chemical_id == ghost_b));

        let remaining = store.all_alerts().await.unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().any(|a| a.chemical_id.is_none()));
        assert!(remaining.iter().any(|a| a.chemical_id == Some(live.id)));
    }

    #[tokio::test]
    async fn test_delete_all_alerts() {
        let store = memory_store();
        seed(&store, &[chemical("Acetone", 0, 10, 300)]).await;
        let service = AlertService::new(store.clone());
        service.sync_all(now()).await.unwrap();
        store
            .insert_alerts(&[manual_alert(None, "Fire drill")])
            .await
            .unwrap();

        let report = service.delete_all().await.unwrap();
        assert_eq!(report.deleted_count, 2);
        assert!(store.all_alerts().await.unwrap().is_empty());
    }

    /// Property 8: 7 days is urgent, 8 is not, 0 is expired
    #[tokio::test]
    async fn test_expiring_soon_severity_boundary() {
        let store = memory_store();
        let seven = chemical("Seven", 100, 10, 7);
        let eight = chemical("Eight", 100, 10, 8);
        let zero = chemical("Zero", 100, 10, 0);
        seed(&store, &[seven.clone(), eight.clone(), zero.clone()]).await;

        AlertService::new(store.clone()).sync_all(now()).await.unwrap();

        let seven_alert = alerts_for(&store, seven.id).await.remove(0);
        assert_eq!(seven_alert.reason, Some(AlertReason::ExpiringSoon));
        assert_eq!(seven_alert.severity, AlertSeverity::High);
        assert!(seven_alert.action_required);

        let eight_alert = alerts_for(&store, eight.id).await.remove(0);
        assert_eq!(eight_alert.severity, AlertSeverity::Medium);
        assert!(!eight_alert.action_required);

        let zero_alert = alerts_for(&store, zero.id).await.remove(0);
        assert_eq!(zero_alert.reason, Some(AlertReason::Expired));
        assert_eq!(zero_alert.alert_type, AlertType::ExpiryWarning);
        assert_eq!(zero_alert.severity, AlertSeverity::Critical);
    }

    /// A hand-entered low stock alert already covers the chemical
    #[tokio::test]
    async fn test_manual_stock_alert_is_not_duplicated() {
        let store = memory_store();
        let chem = chemical("Ethanol", 3, 10, 300);
        seed(&store, &[chem.clone()]).await;
        let service = AlertService::new(store.clone());

        service
            .create(
                CreateAlertInput {
                    alert_type: AlertType::LowStock,
                    title: "Ethanol low".to_string(),
                    message: "Bench stock nearly gone".to_string(),
                    chemical_id: Some(chem.id),
                    severity: None,
                    action_required: None,
                },
                now(),
            )
            .await
            .unwrap();

        let report = service.sync_all(now()).await.unwrap();

        assert_eq!(report.new_alerts_count, 0);
        let unread_low: Vec<_> = alerts_for(&store, chem.id)
            .await
            .into_iter()
            .filter(|a| !a.is_read && a.alert_type == AlertType::LowStock)
            .collect();
        assert_eq!(unread_low.len(), 1);
    }

    /// Rows stored without a reason still suppress duplicates, and expiry
    /// warnings are told apart by their message
    #[tokio::test]
    async fn test_reasonless_alerts_are_deduplicated() {
        let store = memory_store();
        let empty = chemical("Acetone", 0, 10, 300);
        let expired = chemical("Chloroform", 100, 10, -3);
        let expiring = chemical("Peroxide", 100, 10, 5);
        seed(&store, &[empty.clone(), expired.clone(), expiring.clone()]).await;

        let mut legacy_out = manual_alert(Some(empty.id), "Acetone out");
        legacy_out.alert_type = AlertType::OutOfStock;
        let mut legacy_expired = manual_alert(Some(expired.id), "Chloroform");
        legacy_expired.alert_type = AlertType::ExpiryWarning;
        legacy_expired.message = "Chloroform has expired".to_string();
        // Says "expiring", so it does not cover the expired condition
        let mut legacy_expiring = manual_alert(Some(expiring.id), "Peroxide");
        legacy_expiring.alert_type = AlertType::ExpiryWarning;
        legacy_expiring.message = "Peroxide is expiring soon".to_string();
        store
            .insert_alerts(&[legacy_out, legacy_expired, legacy_expiring])
            .await
            .unwrap();

        let report = AlertService::new(store.clone()).sync_all(now()).await.unwrap();

        assert_eq!(report.new_alerts_count, 0);
        assert_eq!(alerts_for(&store, empty.id).await.len(), 1);
        assert_eq!(alerts_for(&store, expired.id).await.len(), 1);
        assert_eq!(alerts_for(&store, expiring.id).await.len(), 1);

        let later = AlertService::new(store.clone())
            .sync_all(now() + Duration::days(6))
            .await
            .unwrap();
        assert_eq!(later.new_alerts_count, 1);
        let reasons: Vec<_> = alerts_for(&store, expiring.id)
            .await
            .into_iter()
            .filter_map(|a| a.reason)
            .collect();
        assert_eq!(reasons, vec![AlertReason::Expired]);
    }

    /// Zero stock and expired reports out of stock
    #[tokio::test]
    async fn test_out_of_stock_wins_over_expired() {
        let store = memory_store();
        let chem = chemical("Chloroform", 0, 10, -30);
        seed(&store, &[chem.clone()]).await;

        AlertService::new(store.clone()).sync_all(now()).await.unwrap();

        let alerts = alerts_for(&store, chem.id).await;
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::OutOfStock);
    }

    /// A malformed record is reported and the sweep carries on
    #[tokio::test]
    async fn test_sync_reports_failures_and_continues() {
        let store = memory_store();
        let mut broken = chemical("Legacy Import", 5, 10, 300);
        broken.quantity = Decimal::from(-4);
        let healthy = chemical("Acetone", 0, 10, 300);
        seed(&store, &[broken.clone(), healthy.clone()]).await;

        let report = AlertService::new(store.clone()).sync_all(now()).await.unwrap();

        assert_eq!(report.new_alerts_count, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, broken.id);
        assert!(report.failures[0].reason.contains("negative quantity"));
        assert_eq!(alerts_for(&store, healthy.id).await.len(), 1);
    }

    /// One clock per sweep: a chemical crossing into "expired" later gets a
    /// fresh expiry warning
    #[tokio::test]
    async fn test_sync_uses_given_clock() {
        let store = memory_store();
        let chem = chemical("Peroxide", 100, 10, 3);
        seed(&store, &[chem.clone()]).await;
        let service = AlertService::new(store.clone());

        service.sync_all(now()).await.unwrap();
        let later = service.sync_all(now() + Duration::days(5)).await.unwrap();

        assert_eq!(later.new_alerts_count, 1);
        let reasons: Vec<_> = alerts_for(&store, chem.id)
            .await
            .into_iter()
            .filter_map(|a| a.reason)
            .collect();
        assert!(reasons.contains(&AlertReason::ExpiringSoon));
        assert!(reasons.contains(&AlertReason::Expired));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    /// (quantity, threshold, days until expiry)
    fn inventory_strategy() -> impl Strategy<Value = Vec<(i64, i64, i64)>> {
        prop::collection::vec((0i64..200, 0i64..100, -60i64..400), 0..25)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// Property 2: sync is idempotent for any inventory
        #[test]
        fn prop_sync_twice_creates_nothing_new(inventory in inventory_strategy()) {
            let rt = runtime();
            let (first, second, unhealthy) = rt.block_on(async {
                let store = memory_store();
                let chemicals: Vec<_> = inventory
                    .iter()
                    .enumerate()
                    .map(|(i, (q, t, d))| chemical(&format!("Chem {i}"), *q, *t, *d))
                    .collect();
                seed(&store, &chemicals).await;
                let unhealthy = chemicals
                    .iter()
                    .filter(|c| c.status != shared::ChemicalStatus::Active)
                    .count() as u64;

                let service = AlertService::new(store);
                let first = service.sync_all(now()).await.unwrap();
                let second = service.sync_all(now()).await.unwrap();
                (first, second, unhealthy)
            });

            prop_assert_eq!(first.new_alerts_count, unhealthy);
            prop_assert_eq!(second.new_alerts_count, 0);
            prop_assert_eq!(second.severity_counts.total, unhealthy);
        }

        /// Property 5: cleanup deletes exactly the M orphans and keeps the K live alerts
        #[test]
        fn prop_orphan_cleanup_exact(orphans in 0usize..15, live in 0usize..15) {
            let rt = runtime();
            let (report, remaining) = rt.block_on(async {
                let store = memory_store();
                let chem = chemical("Acetone", 100, 10, 300);
                seed(&store, &[chem.clone()]).await;

                let mut alerts: Vec<Alert> = (0..orphans)
                    .map(|i| manual_alert(Some(Uuid::new_v4()), &format!("Orphan {i}")))
                    .collect();
                alerts.extend((0..live).map(|i| manual_alert(Some(chem.id), &format!("Live {i}"))));
                store.insert_alerts(&alerts).await.unwrap();

                let report = AlertService::new(store.clone()).cleanup_orphans().await.unwrap();
                let remaining = store.all_alerts().await.unwrap().len();
                (report, remaining)
            });

            prop_assert_eq!(report.deleted_count, orphans as u64);
            prop_assert_eq!(report.orphaned_alerts.len(), orphans);
            prop_assert_eq!(remaining, live);
        }
    }
}
