// HTTP handlers for order endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::orders::{
    CheckoutRequest, CheckoutResponse, CreateOrderRequest, CreateOrderResponse,
    LineStatusMachine, OrderError, OrderItemResponse, UpdateLineStatusRequest,
};
use crate::orders::router::{OrderHistoryResponse, OrderView};

/// Query parameters for order history and ticket lookup
#[derive(Debug, Deserialize, Validate)]
pub struct RoomQuery {
    #[validate(custom = "crate::validation::validate_room_number")]
    pub room_number: String,
}

/// Handler for POST /api/orders
/// Places an order for a room; the active mode decides whether this creates
/// a discrete order or appends to the room's ticket
pub async fn create_order_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), OrderError> {
    request
        .validate()
        .map_err(|e| OrderError::ValidationError(e.to_string()))?;

    // Rejected before any transaction opens
    for item in &request.items {
        if crate::validation::validate_quantity(item.quantity).is_err() {
            return Err(OrderError::ValidationError(format!(
                "Invalid quantity: {}",
                item.quantity
            )));
        }
    }

    let response = state.order_router.create_order(&request).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET /api/orders
/// Retrieves order history for a room
pub async fn get_order_history_handler(
    State(state): State<crate::AppState>,
    Query(query): Query<RoomQuery>,
) -> Result<Json<OrderHistoryResponse>, OrderError> {
    query
        .validate()
        .map_err(|e| OrderError::ValidationError(e.to_string()))?;

    let history = state
        .order_router
        .get_orders_by_room(query.room_number.trim())
        .await?;

    Ok(Json(history))
}

/// Handler for GET /api/orders/{id}
/// Retrieves a specific order (or ticket) by identifier
pub async fn get_order_by_id_handler(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> Result<Json<OrderView>, OrderError> {
    let view = state.order_router.get_order(&id).await?;
    Ok(Json(view))
}

/// Handler for POST /api/checkout
/// Completes everything open for the room; calling it again is a no-op
pub async fn checkout_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, OrderError> {
    request
        .validate()
        .map_err(|e| OrderError::ValidationError(e.to_string()))?;

    let response = state
        .order_router
        .complete_orders_on_checkout(request.room_number.trim())
        .await?;

    Ok(Json(response))
}

/// Handler for PATCH /api/order-items/{id}/status
/// Kitchen display transitions for a single line
pub async fn update_line_status_handler(
    State(state): State<crate::AppState>,
    Path(line_id): Path<i32>,
    Json(request): Json<UpdateLineStatusRequest>,
) -> Result<Json<OrderItemResponse>, OrderError> {
    let line = state
        .order_items_repo
        .find_by_id(line_id)
        .await?
        .ok_or(OrderError::NotFound)?;

    LineStatusMachine::transition(line.line_status, request.status)
        .map_err(OrderError::InvalidTransition)?;

    let updated = state
        .order_items_repo
        .update_line_status(line_id, request.status)
        .await?;

    Ok(Json(updated.into()))
}

/// Request DTO for opening a ticket when a guest links their account
#[derive(Debug, Deserialize, Validate)]
pub struct OpenTicketRequest {
    #[validate(custom = "crate::validation::validate_room_number")]
    pub room_number: String,
    pub guest_name: Option<String>,
    pub messenger_user_id: Option<String>,
}

/// Handler for POST /api/tickets
/// Opens a room ticket ahead of the first order (open-ticket mode only)
pub async fn open_ticket_handler(
    State(state): State<crate::AppState>,
    Json(request): Json<OpenTicketRequest>,
) -> Result<(StatusCode, Json<crate::tickets::TicketResponse>), OrderError> {
    request
        .validate()
        .map_err(|e| OrderError::ValidationError(e.to_string()))?;

    let ticket = state
        .order_router
        .open_room_ticket(
            request.room_number.trim(),
            request.guest_name.as_deref(),
            request.messenger_user_id.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ticket)))
}

/// Handler for GET /api/tickets
/// Returns the room's active ticket, if any (open-ticket mode only)
pub async fn get_active_ticket_handler(
    State(state): State<crate::AppState>,
    Query(query): Query<RoomQuery>,
) -> Result<Json<Option<crate::tickets::TicketResponse>>, OrderError> {
    query
        .validate()
        .map_err(|e| OrderError::ValidationError(e.to_string()))?;

    let ticket = state
        .order_router
        .get_active_ticket(query.room_number.trim())
        .await?;

    Ok(Json(ticket))
}
