//! HTTP handlers for supplier endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use shared::{ApiResponse, PaginatedResponse, SYSTEM_USER};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::supplier::{
    CreateSupplierInput, SupplierQuery, SupplierService, SupplierView, UpdateSupplierInput,
};
use crate::AppState;

pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(query): Query<SupplierQuery>,
) -> AppResult<Json<PaginatedResponse<SupplierView>>> {
    let service = SupplierService::new(state.store);
    Ok(Json(service.list(query).await?))
}

pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<SupplierView>>> {
    let service = SupplierService::new(state.store);
    Ok(Json(ApiResponse::ok(service.get(id).await?)))
}

pub async fn create_supplier(
    State(state): State<AppState>,
    Json(input): Json<CreateSupplierInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<SupplierView>>)> {
    let service = SupplierService::new(state.store);
    let supplier = service.create(input, SYSTEM_USER, Utc::now()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(supplier, "Supplier created successfully")),
    ))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateSupplierInput>,
) -> AppResult<Json<ApiResponse<SupplierView>>> {
    let service = SupplierService::new(state.store);
    let supplier = service.update(id, input, Utc::now()).await?;
    Ok(Json(ApiResponse::with_message(supplier, "Supplier updated successfully")))
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let service = SupplierService::new(state.store);
    service.delete(id).await?;
    Ok(Json(ApiResponse::with_message((), "Supplier deleted successfully")))
}
