//! Inventory endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use resortops_common::inventory::{alerts, InventoryItem, ItemInput, MovementKind, StockAdjustment, StockMovement, StockStatus};
use resortops_common::ApiError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::state::{AppEvent, SharedState};

#[derive(Debug, Deserialize)]
pub struct InventoryQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MovementQuery {
    pub limit: Option<i64>,
}

/// An item with its derived stock status and value.
#[derive(Debug, Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub status: StockStatus,
    pub value: f64,
}

impl From<InventoryItem> for ItemView {
    fn from(item: InventoryItem) -> Self {
        Self { status: item.status(), value: item.value(), item }
    }
}

#[derive(Debug, Serialize)]
pub struct AdjustmentResult {
    pub item: ItemView,
    pub movement: StockMovement,
}

/// GET /api/inventory
pub async fn list_items(
    State(state): State<SharedState>,
    Query(query): Query<InventoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let items = state.inventory().list(query.category.as_deref()).await?;
    Ok(Json(items.into_iter().map(ItemView::from).collect::<Vec<_>>()))
}

/// GET /api/inventory/alerts
pub async fn stock_alerts(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let items = state.inventory().list(None).await?;
    let low: Vec<ItemView> = alerts(&items).into_iter().cloned().map(ItemView::from).collect();
    Ok(Json(low))
}

/// GET /api/inventory/{id}
pub async fn get_item(State(state): State<SharedState>, Path(id): Path<Uuid>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(ItemView::from(state.inventory().get(id).await?)))
}

/// POST /api/inventory
pub async fn create_item(
    State(state): State<SharedState>,
    Json(input): Json<ItemInput>,
) -> Result<impl IntoResponse, ApiError> {
    let item = state.inventory().insert(&input).await?;
    Ok((StatusCode::CREATED, Json(ItemView::from(item))))
}

/// PUT /api/inventory/{id}
pub async fn update_item(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ItemInput>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(ItemView::from(state.inventory().update(id, &input).await?)))
}

/// DELETE /api/inventory/{id}
pub async fn delete_item(
    State(state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    user.require_manager()?;
    state.inventory().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/inventory/{id}/stock
pub async fn adjust_stock(
    State(state): State<SharedState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(adjustment): Json<StockAdjustment>,
) -> Result<impl IntoResponse, ApiError> {
    let (item, movement) = state.inventory().adjust_stock(id, &adjustment, Some(user.0.id)).await?;

    if adjustment.kind == MovementKind::Remove && item.status() != StockStatus::InStock {
        tracing::warn!(item_id = %item.id, name = %item.name, quantity = item.quantity, "Stock below threshold");
        state.publish(AppEvent::StockAlert {
            item_id: item.id,
            name: item.name.clone(),
            quantity: item.quantity,
            min_threshold: item.min_threshold,
        });
    }

    Ok(Json(AdjustmentResult { item: item.into(), movement }))
}

/// GET /api/inventory/{id}/movements
pub async fn list_movements(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(query): Query<MovementQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    Ok(Json(state.inventory().movements(id, limit).await?))
}
