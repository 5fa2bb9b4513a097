use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category record as published by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCategory {
    pub id: String,
    pub name: String,
}

/// Product record as published by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderProduct {
    pub id: String,
    pub category_id: String,
    pub name: String,
    pub price: Decimal,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub image_ref: Option<String>,
}

fn default_active() -> bool {
    true
}

/// One line appended to a provider-side ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketItem {
    pub item_id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    #[serde(default)]
    pub note: Option<String>,
}
