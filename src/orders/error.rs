use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::provider::ProviderError;
use crate::tickets::TicketError;

/// Error types for order operations
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Order not found")]
    NotFound,

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("Category is closed for orders: {0}")]
    CategoryClosed(String),

    #[error("Insufficient stock for product {product_id}")]
    StockConflict { product_id: i32 },

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Provider error: {0}")]
    Provider(String),
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::DatabaseError(err.to_string())
    }
}

impl From<crate::catalog::CatalogError> for OrderError {
    fn from(err: crate::catalog::CatalogError) -> Self {
        OrderError::DatabaseError(err.to_string())
    }
}

impl From<ProviderError> for OrderError {
    fn from(err: ProviderError) -> Self {
        OrderError::Provider(err.to_string())
    }
}

impl From<TicketError> for OrderError {
    fn from(err: TicketError) -> Self {
        match err {
            TicketError::DatabaseError(msg) => OrderError::DatabaseError(msg),
            TicketError::NotFound => OrderError::NotFound,
            TicketError::Provider(msg) => OrderError::Provider(msg),
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            OrderError::DatabaseError(msg) => {
                tracing::error!("Order database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            OrderError::NotFound => (StatusCode::NOT_FOUND, "Order not found".to_string()),
            OrderError::ProductNotFound(id) => (
                StatusCode::BAD_REQUEST,
                format!("Product {} not found", id),
            ),
            OrderError::CategoryClosed(name) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("{} is not accepting orders right now", name),
            ),
            OrderError::StockConflict { product_id } => (
                StatusCode::CONFLICT,
                format!("Product {} is out of stock", product_id),
            ),
            OrderError::InvalidTransition(msg) => (StatusCode::BAD_REQUEST, msg),
            OrderError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            OrderError::Provider(msg) => {
                tracing::warn!("Provider failure during order operation: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "The order could not be placed right now".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
