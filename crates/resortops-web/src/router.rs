//! Axum router: maps all URL paths to handlers.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::require_session;
use crate::handlers::{
    auth::{create_user, list_users, login, logout, me, update_user},
    bills::{create_bill, get_bill, list_bills, record_payment},
    dashboard::dashboard,
    exports::export,
    inventory::{
        adjust_stock, create_item, delete_item, get_item, list_items, list_movements, stock_alerts, update_item,
    },
    kitchen::{create_dish, create_report, get_report, list_dishes, list_reports, update_dish},
    leave::{create_request, decide_request, leave_balance, list_requests},
    revenue::{create_kot, revenue},
    staff::{create_staff, deactivate_staff, get_staff, list_staff, staff_payroll, update_staff},
    system::health,
    uploads::{list_documents, upload_document},
    vendors::{create_vendor, delete_vendor, get_vendor, list_vendors, update_vendor},
};
use crate::sse::sse_handler;
use crate::state::{AppState, SharedState};

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();
    let upload_limit = state.drive.max_upload_bytes() + MULTIPART_OVERHEAD;
    let shared: SharedState = Arc::new(state);

    // Everything here needs a live session
    let api = Router::new()
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me",     get(me))
        .route("/api/users",       get(list_users).post(create_user))
        .route("/api/users/{id}",  put(update_user))

        .route("/api/vendors",      get(list_vendors).post(create_vendor))
        .route("/api/vendors/{id}", get(get_vendor).put(update_vendor).delete(delete_vendor))

        .route("/api/bills",               get(list_bills).post(create_bill))
        .route("/api/bills/{id}",          get(get_bill))
        .route("/api/bills/{id}/payments", post(record_payment))

        .route("/api/staff",              get(list_staff).post(create_staff))
        .route("/api/staff/{id}",         get(get_staff).put(update_staff).delete(deactivate_staff))
        .route("/api/staff/{id}/payroll", get(staff_payroll))

        .route("/api/inventory",                get(list_items).post(create_item))
        .route("/api/inventory/alerts",         get(stock_alerts))
        .route("/api/inventory/{id}",           get(get_item).put(update_item).delete(delete_item))
        .route("/api/inventory/{id}/stock",     post(adjust_stock))
        .route("/api/inventory/{id}/movements", get(list_movements))

        .route("/api/dishes",              get(list_dishes).post(create_dish))
        .route("/api/dishes/{id}",         put(update_dish))
        .route("/api/kitchen/reports",     get(list_reports).post(create_report))
        .route("/api/kitchen/reports/{id}", get(get_report))

        .route("/api/leave",                   get(list_requests).post(create_request))
        .route("/api/leave/{id}/decision",     post(decide_request))
        .route("/api/leave/balance/{staff_id}", get(leave_balance))

        .route("/api/kots",    post(create_kot))
        .route("/api/revenue", get(revenue))

        .route(
            "/api/uploads",
            post(upload_document).get(list_documents).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/exports/{file}", get(export))

        // SSE streaming
        .route("/api/events", get(sse_handler))
        .route_layer(middleware::from_fn_with_state(shared.clone(), require_session));

    Router::new()
        // Public
        .route("/",               get(dashboard))
        .route("/health",         get(health))
        .route("/api/auth/login", post(login))
        .merge(api)

        // Static files
        .nest_service("/static", ServeDir::new(static_dir))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
