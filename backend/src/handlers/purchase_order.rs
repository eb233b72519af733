//! HTTP handlers for purchase order endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use shared::{ApiResponse, PaginatedResponse, PurchaseOrder, SYSTEM_USER};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::purchase_order::{
    AutoDeliveryReport, CreatePurchaseOrderInput, PurchaseOrderQuery, PurchaseOrderService,
    PurchaseOrderUpdate, UpdatePurchaseOrderInput,
};
use crate::AppState;

/// List purchase orders
pub async fn list_purchase_orders(
    State(state): State<AppState>,
    Query(query): Query<PurchaseOrderQuery>,
) -> AppResult<Json<PaginatedResponse<PurchaseOrder>>> {
    let service = PurchaseOrderService::new(state.store);
    Ok(Json(service.list(query).await?))
}

/// Get a purchase order by ID
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PurchaseOrder>>> {
    let service = PurchaseOrderService::new(state.store);
    Ok(Json(ApiResponse::ok(service.get(id).await?)))
}

/// Create a purchase order
pub async fn create_purchase_order(
    State(state): State<AppState>,
    Json(input): Json<CreatePurchaseOrderInput>,
) -> AppResult<(StatusCode, Json<ApiResponse<PurchaseOrder>>)> {
    let service = PurchaseOrderService::new(state.store);
    let order = service.create(input, SYSTEM_USER, Utc::now()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(order, "Purchase order created successfully")),
    ))
}

/// Update a purchase order, receiving stock when it becomes delivered
pub async fn update_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePurchaseOrderInput>,
) -> AppResult<Json<ApiResponse<PurchaseOrderUpdate>>> {
    let service = PurchaseOrderService::new(state.store);
    let update = service.update(id, input, SYSTEM_USER, Utc::now()).await?;
    let message = if update.stock_updates.is_empty() {
        "Purchase order updated successfully".to_string()
    } else {
        format!(
            "Purchase order delivered. Stock updated for {} chemical(s)",
            update.stock_updates.len()
        )
    };
    Ok(Json(ApiResponse::with_message(update, message)))
}

/// Delete a purchase order
pub async fn delete_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<()>>> {
    let service = PurchaseOrderService::new(state.store);
    service.delete(id).await?;
    Ok(Json(ApiResponse::with_message((), "Purchase order deleted successfully")))
}

/// Deliver every open order that is due
pub async fn auto_update_purchase_order_status(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<AutoDeliveryReport>>> {
    let service = PurchaseOrderService::new(state.store);
    let report = service.auto_deliver_due(SYSTEM_USER, Utc::now()).await?;
    let message = format!(
        "Auto-updated {} purchase order(s) to delivered status",
        report.orders_updated
    );
    Ok(Json(ApiResponse::with_message(report, message)))
}
