use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Domain model for a menu category
///
/// The identifier is the provider's opaque id. Categories are created and
/// updated only by the sync engine and are never deleted, only deactivated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub sort_order: i32,
    pub active: bool,
    pub open_order_time: Option<String>,
    pub last_order_time: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Domain model for a product
///
/// `stock_qty` is NULL for products that are not stock-tracked.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i32,
    pub provider_id: String,
    pub category_id: String,
    pub name: String,
    pub price: Decimal,
    pub active: bool,
    pub stock_qty: Option<i32>,
    pub sort_order: i32,
    pub pickup: bool,
    pub label1: Option<String>,
    pub label2: Option<String>,
    pub image_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Per-run sync counters, persisted as the latest snapshot per
/// (provider, table) pair
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncStats {
    pub added: i32,
    pub updated: i32,
    pub skipped: i32,
    pub errors: i32,
}

/// Result of one sync invocation
#[derive(Debug, Clone, Serialize)]
pub struct SyncOutcome {
    pub success: bool,
    pub stats: SyncStats,
    pub message: String,
}

impl SyncOutcome {
    pub fn ok(stats: SyncStats, message: impl Into<String>) -> Self {
        Self {
            success: true,
            stats,
            message: message.into(),
        }
    }

    pub fn failed(stats: SyncStats, message: impl Into<String>) -> Self {
        Self {
            success: false,
            stats,
            message: message.into(),
        }
    }
}

/// Response DTO for one menu category with its products
#[derive(Debug, Serialize)]
pub struct MenuCategory {
    pub id: String,
    pub name: String,
    pub sort_order: i32,
    /// Whether the category currently accepts orders per business hours
    pub open: bool,
    pub products: Vec<MenuProduct>,
}

/// Response DTO for one orderable product
#[derive(Debug, Serialize)]
pub struct MenuProduct {
    pub id: i32,
    pub provider_id: String,
    pub name: String,
    pub price: Decimal,
    pub stock_qty: Option<i32>,
    pub pickup: bool,
    pub label1: Option<String>,
    pub label2: Option<String>,
    pub image_url: Option<String>,
}

impl From<Product> for MenuProduct {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            provider_id: product.provider_id,
            name: product.name,
            price: product.price,
            stock_qty: product.stock_qty,
            pickup: product.pickup,
            label1: product.label1,
            label2: product.label2,
            image_url: product.image_url,
        }
    }
}
