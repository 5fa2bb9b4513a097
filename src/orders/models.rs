use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_room_number;

/// Order status enum representing the lifecycle of a catalog-mode order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Open,
    Completed,
    Canceled,
    Test,
}

impl OrderStatus {
    /// Convert status to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "open",
            OrderStatus::Completed => "completed",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Test => "test",
        }
    }

    /// Parse status from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "open" => Ok(OrderStatus::Open),
            "completed" => Ok(OrderStatus::Completed),
            "canceled" => Ok(OrderStatus::Canceled),
            "test" => Ok(OrderStatus::Test),
            _ => Err(format!("Invalid order status: {}", s)),
        }
    }

    /// Whether the order can still accept appended lines
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Canceled)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Open
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kitchen workflow status of a single order line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LineStatus {
    Ordered,
    Ready,
    Delivered,
    Cancelled,
}

impl LineStatus {
    /// Convert status to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            LineStatus::Ordered => "ordered",
            LineStatus::Ready => "ready",
            LineStatus::Delivered => "delivered",
            LineStatus::Cancelled => "cancelled",
        }
    }

    /// Parse status from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "ordered" => Ok(LineStatus::Ordered),
            "ready" => Ok(LineStatus::Ready),
            "delivered" => Ok(LineStatus::Delivered),
            "cancelled" => Ok(LineStatus::Cancelled),
            _ => Err(format!("Invalid line status: {}", s)),
        }
    }
}

impl Default for LineStatus {
    fn default() -> Self {
        LineStatus::Ordered
    }
}

impl std::fmt::Display for LineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain model representing a catalog-mode order
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub room_number: String,
    pub guest_name: String,
    pub messenger_user_id: Option<String>,
    pub status: OrderStatus,
    pub total: Decimal,
    pub note: Option<String>,
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub checkout_at: Option<DateTime<Utc>>,
}

/// Domain model representing one line within an order
///
/// Lines are immutable once written; corrections are new lines. Only
/// `line_status` changes afterwards, driven by the kitchen display.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: Uuid,
    pub session_id: Uuid,
    pub provider_item_id: String,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub subtotal: Decimal,
    pub note: Option<String>,
    pub line_status: LineStatus,
}

/// Request DTO for one ordered item
///
/// Items may be addressed by local product id or by the provider's item id;
/// at least one of the two must be present. Quantities are checked in the
/// handler before any transaction opens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRequest {
    pub product_id: Option<i32>,
    pub provider_item_id: Option<String>,
    pub quantity: i32,
    pub note: Option<String>,
}

/// Request DTO for creating an order (either mode)
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(custom = "validate_room_number")]
    pub room_number: String,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<OrderItemRequest>,
    pub guest_name: Option<String>,
    pub note: Option<String>,
    pub messenger_user_id: Option<String>,
    /// Correlates multiple calls into one logical order while it is OPEN
    pub session_id: Option<Uuid>,
}

/// Request DTO for a kitchen line-status transition
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateLineStatusRequest {
    pub status: LineStatus,
}

/// Request DTO for checkout
#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    #[validate(custom = "validate_room_number")]
    pub room_number: String,
}

/// Response DTO for a created order, uniform across both modes
#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub success: bool,
    pub mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
}

/// Response DTO for an order with its lines
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub room_number: String,
    pub guest_name: String,
    pub status: OrderStatus,
    pub total: Decimal,
    pub note: Option<String>,
    pub session_id: Uuid,
    pub items: Vec<OrderItemResponse>,
    pub created_at: DateTime<Utc>,
    pub checkout_at: Option<DateTime<Utc>>,
}

/// Response DTO for one order line
#[derive(Debug, Serialize)]
pub struct OrderItemResponse {
    pub id: i32,
    pub provider_item_id: String,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub subtotal: Decimal,
    pub note: Option<String>,
    pub line_status: LineStatus,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        Self {
            id: item.id,
            provider_item_id: item.provider_item_id,
            product_name: item.product_name,
            unit_price: item.unit_price,
            quantity: item.quantity,
            subtotal: item.subtotal,
            note: item.note,
            line_status: item.line_status,
        }
    }
}

impl OrderResponse {
    pub fn from_order(order: Order, items: Vec<OrderItem>) -> Self {
        Self {
            id: order.id,
            room_number: order.room_number,
            guest_name: order.guest_name,
            status: order.status,
            total: order.total,
            note: order.note,
            session_id: order.session_id,
            items: items.into_iter().map(|item| item.into()).collect(),
            created_at: order.created_at,
            checkout_at: order.checkout_at,
        }
    }
}

/// Response DTO for checkout, identical in both modes
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub success: bool,
    /// Orders (or tickets) moved to a terminal state by this call; zero on
    /// an idempotent repeat
    pub completed: u64,
}
