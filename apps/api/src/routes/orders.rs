//! Order handlers.
//!
//! Placement is public (cash on delivery, no account needed). Listing and
//! status management are admin-only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use velora_core::validation::validate_new_order;
use velora_core::{CoreError, NewOrder, OrderDetail, ValidationError};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub message: String,
    pub order_id: String,
}

/// `POST /api/orders`
///
/// Validates the submitted cart, then hands it to the order repository,
/// which reserves stock and records the order in one transaction.
pub async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<NewOrder>,
) -> Result<(StatusCode, Json<PlaceOrderResponse>), ApiError> {
    validate_new_order(&body)?;

    let detail = state.db.orders().place_order(&body).await?;

    Ok((
        StatusCode::CREATED,
        Json(PlaceOrderResponse {
            message: "Order placed successfully".to_string(),
            order_id: detail.order.id,
        }),
    ))
}

/// `GET /api/admin/orders`
///
/// Every order with its line items, newest first.
pub async fn list_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderDetail>>, ApiError> {
    let orders = state.db.orders().list_all().await?;
    Ok(Json(orders))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// `PUT /api/admin/orders/:id`
///
/// Applies one step of the order state machine. An unknown status string
/// is a 400; a move the state machine forbids is a 409.
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<OrderDetail>, ApiError> {
    let next: velora_core::OrderStatus = body.status.parse().map_err(|_| {
        ValidationError::NotAllowed {
            field: "status".to_string(),
            allowed: ["pending", "processing", "shipped", "delivered", "cancelled"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    })?;

    let detail = state
        .db
        .orders()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Order not found: {}", id)))?;

    let current = detail.order.status;
    if !current.can_transition_to(next) {
        return Err(CoreError::InvalidTransition {
            order_id: id,
            from: current,
            to: next,
        }
        .into());
    }

    // Guarded write: a concurrent admin may have moved the order already
    let applied = state.db.orders().set_status(&id, current, next).await?;
    if !applied {
        return Err(ApiError::conflict(format!(
            "Order {} was updated concurrently, retry",
            id
        )));
    }

    info!(order_id = %id, from = %current, to = %next, "Order status changed");

    let detail = state
        .db
        .orders()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Order not found: {}", id)))?;

    Ok(Json(detail))
}
