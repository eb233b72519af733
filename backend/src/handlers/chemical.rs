//! HTTP handlers for chemical endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use shared::{ApiResponse, Chemical, PaginatedResponse};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::chemical::{
    ChemicalDeletion, ChemicalQuery, ChemicalService, ChemicalUpdate, CreateChemicalInput,
    UpdateChemicalInput,
};
use crate::AppState;

/// List chemicals
pub async fn list_chemicals(
    State(state): State<AppState>,
    Query(query): Query<ChemicalQuery>,
) -> AppResult<Json<PaginatedResponse<Chemical>>> {
    let service = ChemicalService::new(state.store);
    Ok(Json(service.list(query).await?))
}

/// Get a chemical by ID
pub async fn get_chemical(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Chemical>>> {
    let service = ChemicalService::new(state.store);
    let chemical = service.get(id).await?;
    Ok(Json(ApiResponse::ok(chemical)))
}

/// Create a chemical
pub async fn create_chemical(
    State(state): State<AppState>,
    Json(input): Json<CreateChemicalInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<Chemical>>)> {
    let service = ChemicalService::new(state.store);
    let chemical = service.create(input, Utc::now()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(chemical, "Chemical created successfully")),
    ))
}

/// Update a chemical and resync its alerts
pub async fn update_chemical(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateChemicalInput>,
) -> AppResult<Json<ApiResponse<ChemicalUpdate>>> {
    let service = ChemicalService::new(state.store);
    let update = service.update(id, input, Utc::now()).await?;
    let message = format!(
        "Chemical updated successfully. Alerts: {} removed, {} created",
        update.alerts_updated.deleted, update.alerts_updated.created
    );
    Ok(Json(ApiResponse::with_message(update, message)))
}

/// Delete a chemical and its alerts
pub async fn delete_chemical(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ChemicalDeletion>>> {
    let service = ChemicalService::new(state.store);
    let deletion = service.delete(id).await?;
    let message = format!(
        "Chemical deleted successfully along with {} related alert(s)",
        deletion.deleted_alerts
    );
    Ok(Json(ApiResponse::with_message(deletion, message)))
}
