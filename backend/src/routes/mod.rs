//! Route definitions for the ChemTrack API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/chemicals", chemical_routes())
        .nest("/alerts", alert_routes())
        .nest("/purchase-orders", purchase_order_routes())
        .nest("/suppliers", supplier_routes())
        .route("/activity-logs", get(handlers::list_activity_logs))
}

/// Chemical inventory routes
fn chemical_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_chemicals).post(handlers::create_chemical),
        )
        .route(
            "/:id",
            get(handlers::get_chemical)
                .put(handlers::update_chemical)
                .delete(handlers::delete_chemical),
        )
}

/// Alert routes, including sync and maintenance
fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_alerts).post(handlers::create_alert))
        .route("/sync", post(handlers::sync_alerts))
        .route(
            "/cleanup",
            post(handlers::cleanup_orphaned_alerts).delete(handlers::delete_all_alerts),
        )
        .route(
            "/:id",
            get(handlers::get_alert)
                .put(handlers::update_alert)
                .delete(handlers::delete_alert),
        )
}

/// Purchase order routes
fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_purchase_orders).post(handlers::create_purchase_order),
        )
        .route(
            "/auto-update-status",
            post(handlers::auto_update_purchase_order_status),
        )
        .route(
            "/:id",
            get(handlers::get_purchase_order)
                .put(handlers::update_purchase_order)
                .delete(handlers::delete_purchase_order),
        )
}

/// Supplier routes
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route(
            "/:id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
}
