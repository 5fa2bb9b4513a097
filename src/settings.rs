// Persisted operating configuration
//
// Loaded from the app_settings table once at startup. The operating mode in
// particular is fixed for the process lifetime: flipping open_ticket_mode
// requires a restart, which keeps every in-flight request on one consistent
// mode. This is a deliberate trade-off, not a defect.

use sqlx::PgPool;

use crate::hours::BusinessHours;

/// Operating configuration resolved at startup
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// When true, orders accumulate on a single provider-mirrored room
    /// ticket instead of creating discrete local orders.
    pub open_ticket_mode: bool,
    /// When false, the stock ledger neither locks nor checks quantities
    /// (the provider is the authoritative stock source).
    pub stock_tracking: bool,
    /// Default business-hours schedule; per-category overrides live on the
    /// category rows.
    pub business_hours: BusinessHours,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            open_ticket_mode: false,
            stock_tracking: true,
            business_hours: BusinessHours::default(),
        }
    }
}

impl AppSettings {
    /// Load settings from the app_settings table.
    ///
    /// Missing keys fall back to defaults; an unparseable value is logged
    /// and falls back rather than refusing to start.
    pub async fn load(pool: &PgPool) -> Result<Self, sqlx::Error> {
        let mut settings = AppSettings::default();

        if let Some(value) = fetch_setting(pool, "open_ticket_mode").await? {
            match serde_json::from_value::<bool>(value) {
                Ok(flag) => settings.open_ticket_mode = flag,
                Err(e) => tracing::warn!("Invalid open_ticket_mode setting, using default: {}", e),
            }
        }

        if let Some(value) = fetch_setting(pool, "stock_tracking").await? {
            match serde_json::from_value::<bool>(value) {
                Ok(flag) => settings.stock_tracking = flag,
                Err(e) => tracing::warn!("Invalid stock_tracking setting, using default: {}", e),
            }
        }

        if let Some(value) = fetch_setting(pool, "business_hours").await? {
            match serde_json::from_value::<BusinessHours>(value) {
                Ok(hours) => settings.business_hours = hours,
                Err(e) => tracing::warn!("Invalid business_hours setting, using default: {}", e),
            }
        }

        tracing::info!(
            "Settings loaded: open_ticket_mode={}, stock_tracking={}",
            settings.open_ticket_mode,
            settings.stock_tracking
        );
        Ok(settings)
    }
}

async fn fetch_setting(pool: &PgPool, key: &str) -> Result<Option<serde_json::Value>, sqlx::Error> {
    sqlx::query_scalar("SELECT value FROM app_settings WHERE key = $1")
        .bind(key)
        .fetch_optional(pool)
        .await
}
