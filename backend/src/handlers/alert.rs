//! HTTP handlers for alert endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use shared::{Alert, ApiResponse, PaginatedResponse};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::alert::{
    AlertQuery, AlertService, AlertSyncReport, CreateAlertInput, DeleteAllReport,
    OrphanCleanupReport, UpdateAlertInput,
};
use crate::AppState;

/// List alerts
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertQuery>,
) -> AppResult<Json<PaginatedResponse<Alert>>> {
    let service = AlertService::new(state.store);
    Ok(Json(service.list(query).await?))
}

/// Get an alert by ID
pub async fn get_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Alert>>> {
    let service = AlertService::new(state.store);
    Ok(Json(ApiResponse::ok(service.get(id).await?)))
}

/// Raise an alert manually
pub async fn create_alert(
    State(state): State<AppState>,
    Json(input): Json<CreateAlertInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<Alert>>)> {
    let service = AlertService::new(state.store);
    let alert = service.create(input, Utc::now()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(alert, "Alert created successfully")),
    ))
}

/// Mark read, resolve or edit an alert
pub async fn update_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateAlertInput>,
) -> AppResult<Json<ApiResponse<Alert>>> {
    let service = AlertService::new(state.store);
    let alert = service.update(id, input, Utc::now()).await?;
    Ok(Json(ApiResponse::with_message(alert, "Alert updated successfully")))
}

/// Delete one alert
pub async fn delete_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let service = AlertService::new(state.store);
    service.delete(id).await?;
    Ok(Json(ApiResponse::with_message((), "Alert deleted successfully")))
}

/// Run a full alert sync over the inventory
pub async fn sync_alerts(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<AlertSyncReport>>> {
    let service = AlertService::new(state.store);
    let report = service.sync_all(Utc::now()).await?;
    let message = format!(
        "Alert sync completed. {} new alert(s) created",
        report.new_alerts_count
    );
    Ok(Json(ApiResponse::with_message(report, message)))
}

/// Remove alerts whose chemical no longer exists
pub async fn cleanup_orphaned_alerts(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<OrphanCleanupReport>>> {
    let service = AlertService::new(state.store);
    let report = service.cleanup_orphans().await?;
    let message = format!("Cleaned up {} orphaned alert(s)", report.deleted_count);
    Ok(Json(ApiResponse::with_message(report, message)))
}

/// Delete every alert
pub async fn delete_all_alerts(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<DeleteAllReport>>> {
    let service = AlertService::new(state.store);
    let report = service.delete_all().await?;
    let message = format!("Deleted all {} alert(s)", report.deleted_count);
    Ok(Json(ApiResponse::with_message(report, message)))
}
