//! HTTP handlers for the activity log

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use shared::{ActivityLog, PaginatedResponse};

use crate::error::AppResult;
use crate::services::activity_log::{ActivityLogQuery, ActivityLogService};
use crate::AppState;

/// List activity log entries, newest first
pub async fn list_activity_logs(
    State(state): State<AppState>,
    Query(query): Query<ActivityLogQuery>,
) -> AppResult<Json<PaginatedResponse<ActivityLog>>> {
    let service = ActivityLogService::new(state.store);
    Ok(Json(service.list(query, Utc::now()).await?))
}
