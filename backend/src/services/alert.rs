//! Alert synchronization and alert maintenance
//!
//! Keeps the alert collection in step with chemical state:
//! - full sync sweeps every chemical and adds missing unread alerts
//! - targeted resync resets one chemical's alerts after it changes
//! - cascade delete, orphan cleanup and bulk delete remove stale alerts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    ActivityLog, Alert, AlertCondition, AlertSeverity, AlertType, Chemical, PaginatedResponse,
    Pagination, SeverityCounts,
};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::{parse_filter, ActivityLogService, ItemFailure};
use crate::error::{AppError, AppResult};
use crate::store::{AlertFilter, InventoryStore};

const DEFAULT_PAGE_SIZE: u32 = 50;

/// Alert service
#[derive(Clone)]
pub struct AlertService {
    store: Arc<dyn InventoryStore>,
}

/// Result of a full sync sweep
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSyncReport {
    pub new_alerts_count: u64,
    /// Totals over every unread alert after the sweep
    pub severity_counts: SeverityCounts,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ItemFailure>,
}

/// Alerts removed and added while resyncing chemicals
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ResyncOutcome {
    pub deleted: u64,
    pub created: u64,
}

impl std::ops::AddAssign for ResyncOutcome {
    fn add_assign(&mut self, other: Self) {
        self.deleted += other.deleted;
        self.created += other.created;
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrphanedAlert {
    pub alert_id: Uuid,
    pub chemical_id: Uuid,
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrphanCleanupReport {
    pub deleted_count: u64,
    pub orphaned_alerts: Vec<OrphanedAlert>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAllReport {
    pub deleted_count: u64,
}

/// Query parameters for listing alerts
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(rename = "type")]
    pub alert_type: Option<String>,
    pub severity: Option<String>,
    pub is_read: Option<bool>,
}

/// Input for a manually raised alert
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertInput {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 1000))]
    pub message: String,
    pub chemical_id: Option<Uuid>,
    pub severity: Option<AlertSeverity>,
    pub action_required: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlertInput {
    pub is_read: Option<bool>,
    pub action_required: Option<bool>,
    pub severity: Option<AlertSeverity>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 1000))]
    pub message: Option<String>,
    /// Resolves the alert on behalf of this user
    #[validate(length(min = 1, max = 100))]
    pub resolved_by: Option<String>,
}

impl AlertService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Sweep every chemical and insert the alerts it calls for, skipping any
    /// chemical that already has a matching unread alert. A chemical that
    /// fails evaluation is reported in `failures` and the sweep moves on.
    #[tracing::instrument(skip(self))]
    pub async fn sync_all(&self, now: DateTime<Utc>) -> AppResult<AlertSyncReport> {
        let chemicals = self.store.all_chemicals().await?;

        let mut pending = Vec::new();
        let mut failures = Vec::new();
        for chemical in &chemicals {
            match self.missing_alert(chemical, now).await {
                Ok(Some(alert)) => pending.push(alert),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        chemical_id = %chemical.id,
                        error = %e,
                        "Skipping chemical during alert sync"
                    );
                    failures.push(ItemFailure::new(chemical.id, &chemical.name, e));
                }
            }
        }

        let new_alerts_count = self.store.insert_alerts(&pending).await?;
        let severity_counts = self.store.unread_severity_counts().await?;

        tracing::info!(
            scanned = chemicals.len(),
            created = new_alerts_count,
            failed = failures.len(),
            "Alert sync completed"
        );

        Ok(AlertSyncReport {
            new_alerts_count,
            severity_counts,
            failures,
        })
    }

    /// The alert a chemical needs that is not already present as unread
    async fn missing_alert(
        &self,
        chemical: &Chemical,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Alert>> {
        let Some(condition) = AlertCondition::evaluate(chemical, now)? else {
            return Ok(None);
        };

        let existing = self
            .store
            .find_unread_alert(chemical.id, condition.alert_type(), condition.reason)
            .await?;

        Ok(existing
            .is_none()
            .then(|| condition.to_alert(chemical, now)))
    }

    /// Drop every alert for the chemical, read or not, then raise at most one
    /// alert for its current condition.
    #[tracing::instrument(skip(self, chemical), fields(chemical_id = %chemical.id))]
    pub async fn resync_chemical(
        &self,
        chemical: &Chemical,
        now: DateTime<Utc>,
    ) -> AppResult<ResyncOutcome> {
        // Evaluate first so a malformed record keeps its existing alerts
        let condition = AlertCondition::evaluate(chemical, now)?;

        let deleted = self.store.delete_alerts_for_chemical(chemical.id).await?;
        let created = match condition {
            Some(condition) => {
                self.store
                    .insert_alerts(&[condition.to_alert(chemical, now)])
                    .await?
            }
            None => 0,
        };

        tracing::debug!(deleted, created, "Chemical alerts resynced");
        Ok(ResyncOutcome { deleted, created })
    }

    /// Resync each chemical by id. Missing chemicals are skipped; failures are
    /// collected rather than returned.
    pub async fn resync_chemicals(
        &self,
        ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> (ResyncOutcome, Vec<ItemFailure>) {
        let mut outcome = ResyncOutcome::default();
        let mut failures = Vec::new();

        for &id in ids {
            let result = match self.store.get_chemical(id).await {
                Ok(Some(chemical)) => self.resync_chemical(&chemical, now).await,
                Ok(None) => continue,
                Err(e) => Err(e),
            };
            match result {
                Ok(o) => outcome += o,
                Err(e) => {
                    tracing::warn!(chemical_id = %id, error = %e, "Alert resync failed");
                    failures.push(ItemFailure::new(id, "alert resync", e));
                }
            }
        }

        (outcome, failures)
    }

    /// Remove all alerts referencing a deleted chemical
    pub async fn cascade_delete(&self, chemical_id: Uuid) -> AppResult<u64> {
        let deleted = self.store.delete_alerts_for_chemical(chemical_id).await?;
        tracing::info!(chemical_id = %chemical_id, deleted, "Cascaded alert delete");
        Ok(deleted)
    }

    /// Delete alerts whose chemical no longer exists. Alerts without a
    /// chemical reference are left alone.
    #[tracing::instrument(skip(self))]
    pub async fn cleanup_orphans(&self) -> AppResult<OrphanCleanupReport> {
        let alerts = self.store.all_alerts().await?;

        let referenced: Vec<Uuid> = alerts
            .iter()
            .filter_map(|a| a.chemical_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let existing = self.store.existing_chemical_ids(&referenced).await?;

        let orphaned_alerts: Vec<OrphanedAlert> = alerts
            .iter()
            .filter_map(|alert| {
                let chemical_id = alert.chemical_id?;
                (!existing.contains(&chemical_id)).then(|| OrphanedAlert {
                    alert_id: alert.id,
                    chemical_id,
                    title: alert.title.clone(),
                })
            })
            .collect();

        let ids: Vec<Uuid> = orphaned_alerts.iter().map(|o| o.alert_id).collect();
        let deleted_count = self.store.delete_alerts(&ids).await?;

        tracing::info!(deleted_count, "Orphaned alerts removed");
        Ok(OrphanCleanupReport {
            deleted_count,
            orphaned_alerts,
        })
    }

    /// Delete every alert unconditionally
    pub async fn delete_all(&self) -> AppResult<DeleteAllReport> {
        let deleted_count = self.store.delete_all_alerts().await?;
        tracing::warn!(deleted_count, "All alerts deleted");
        Ok(DeleteAllReport { deleted_count })
    }

    pub async fn list(&self, query: AlertQuery) -> AppResult<PaginatedResponse<Alert>> {
        let pagination = Pagination::new(query.page, query.limit, DEFAULT_PAGE_SIZE);
        let filter = AlertFilter {
            alert_type: parse_filter("type", query.alert_type.as_deref())?,
            severity: parse_filter("severity", query.severity.as_deref())?,
            is_read: query.is_read,
        };

        let page = self.store.list_alerts(&filter, pagination).await?;
        Ok(PaginatedResponse::new(page.items, pagination, page.total))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Alert> {
        self.store
            .get_alert(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Alert".to_string()))
    }

    pub async fn create(&self, input: CreateAlertInput, now: DateTime<Utc>) -> AppResult<Alert> {
        input.validate()?;

        let mut alert = Alert {
            id: Uuid::new_v4(),
            alert_type: input.alert_type,
            title: input.title,
            message: input.message,
            chemical_id: input.chemical_id,
            reason: None,
            severity: input.severity.unwrap_or(AlertSeverity::Medium),
            is_read: false,
            action_required: input.action_required.unwrap_or(false),
            timestamp: now,
            resolved_at: None,
            resolved_by: None,
            created_at: now,
            updated_at: now,
        };
        // A hand-entered stock alert counts as that condition's alert
        if alert.chemical_id.is_some() {
            alert.reason = alert.condition_reason();
        }

        self.store.insert_alerts(std::slice::from_ref(&alert)).await?;
        Ok(alert)
    }

    /// Apply read/resolve flags and edits to an alert. Resolving also marks
    /// it read and writes an audit entry.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateAlertInput,
        now: DateTime<Utc>,
    ) -> AppResult<Alert> {
        input.validate()?;
        let mut alert = self.get(id).await?;

        if let Some(is_read) = input.is_read {
            alert.is_read = is_read;
        }
        if let Some(action_required) = input.action_required {
            alert.action_required = action_required;
        }
        if let Some(severity) = input.severity {
            alert.severity = severity;
        }
        if let Some(title) = input.title {
            alert.title = title;
        }
        if let Some(message) = input.message {
            alert.message = message;
        }

        let resolved_by = input.resolved_by.filter(|_| alert.resolved_at.is_none());
        if let Some(user) = &resolved_by {
            alert.resolved_at = Some(now);
            alert.resolved_by = Some(user.clone());
            alert.is_read = true;
            alert.action_required = false;
        }
        alert.updated_at = now;

        if !self.store.update_alert(&alert).await? {
            return Err(AppError::NotFound("Alert".to_string()));
        }

        if let Some(user) = resolved_by {
            ActivityLogService::new(self.store.clone())
                .record(ActivityLog::alert_cleared(
                    alert.alert_type.as_str(),
                    &alert.title,
                    "Resolved",
                    &user,
                    now,
                ))
                .await;
        }

        Ok(alert)
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.store.delete_alert(id).await? {
            return Err(AppError::NotFound("Alert".to_string()));
        }
        Ok(())
    }
}
