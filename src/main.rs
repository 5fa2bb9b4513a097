mod catalog;
mod db;
mod error;
mod hours;
mod orders;
mod provider;
mod settings;
mod stock;
mod tickets;
mod validation;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use catalog::{CatalogSyncEngine, CategoryRepository, ProductRepository};
use error::ApiError;
use hours::BusinessHoursGate;
use orders::{CatalogOrderManager, OrderItemsRepository, OrderMode, OrderModeRouter};
use provider::{CatalogProvider, PosClient, PosClientConfig};
use settings::AppSettings;
use stock::StockLedger;
use tickets::RoomTicketManager;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        catalog::handlers::sync_categories_handler,
        catalog::handlers::sync_products_handler,
        catalog::handlers::get_menu_handler,
    ),
    tags(
        (name = "catalog", description = "Catalog sync and guest menu endpoints"),
        (name = "orders", description = "Room order and checkout endpoints")
    ),
    info(
        title = "Room Service API",
        version = "1.0.0",
        description = "In-room ordering backend: catalog synchronization, room orders and tickets"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub order_router: Arc<OrderModeRouter>,
    pub order_items_repo: OrderItemsRepository,
    pub sync_engine: Arc<CatalogSyncEngine>,
    pub category_repo: CategoryRepository,
    pub product_repo: ProductRepository,
    pub hours: Arc<BusinessHoursGate>,
}

/// Build the application state for one process lifetime.
///
/// The operating mode is decided here, once: requests never re-read the
/// mode flag, so a configuration flip requires a restart.
pub fn build_state(
    db: PgPool,
    pos: Arc<dyn CatalogProvider>,
    provider_name: String,
    app_settings: &AppSettings,
) -> AppState {
    let hours = Arc::new(BusinessHoursGate::new(
        db.clone(),
        app_settings.business_hours.clone(),
    ));
    let stock = StockLedger::new(app_settings.stock_tracking);

    let mode = if app_settings.open_ticket_mode {
        tracing::info!("Operating mode: open ticket (one provider-mirrored ticket per room)");
        OrderMode::OpenTicket(RoomTicketManager::new(db.clone(), pos.clone()))
    } else {
        tracing::info!("Operating mode: catalog (discrete locally priced orders)");
        OrderMode::Catalog(CatalogOrderManager::new(db.clone(), hours.clone(), stock))
    };

    let order_router = Arc::new(OrderModeRouter::new(
        mode,
        ProductRepository::new(db.clone()),
    ));
    let sync_engine = Arc::new(CatalogSyncEngine::new(db.clone(), pos, provider_name));

    AppState {
        order_items_repo: OrderItemsRepository::new(db.clone()),
        category_repo: CategoryRepository::new(db.clone()),
        product_repo: ProductRepository::new(db.clone()),
        hours,
        order_router,
        sync_engine,
        db,
    }
}

/// Row from the sync status cache, one per (provider, table) pair
#[derive(serde::Serialize, sqlx::FromRow)]
struct SyncStatusRow {
    provider: String,
    table_name: String,
    added: i32,
    updated: i32,
    skipped: i32,
    errors: i32,
    ran_at: chrono::DateTime<chrono::Utc>,
}

/// Handler for GET /api/sync/status
/// Returns the latest sync snapshot per (provider, table)
async fn get_sync_status(
    State(state): State<AppState>,
) -> Result<Json<Vec<SyncStatusRow>>, ApiError> {
    let rows = sqlx::query_as::<_, SyncStatusRow>(
        r#"
        SELECT provider, table_name, added, updated, skipped, errors, ran_at
        FROM sync_stats
        ORDER BY provider, table_name
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows))
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
pub fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Guest ordering
        .route("/api/orders", post(orders::create_order_handler))
        .route("/api/orders", get(orders::get_order_history_handler))
        .route("/api/orders/:id", get(orders::get_order_by_id_handler))
        .route("/api/checkout", post(orders::checkout_handler))
        // Kitchen display
        .route(
            "/api/order-items/:id/status",
            patch(orders::update_line_status_handler),
        )
        // Open-ticket mode
        .route("/api/tickets", post(orders::open_ticket_handler))
        .route("/api/tickets", get(orders::get_active_ticket_handler))
        // Catalog
        .route("/api/menu", get(catalog::handlers::get_menu_handler))
        .route(
            "/api/sync/categories",
            post(catalog::handlers::sync_categories_handler),
        )
        .route(
            "/api/sync/products",
            post(catalog::handlers::sync_products_handler),
        )
        .route("/api/sync/status", get(get_sync_status))
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing with a daily-rolling file sink next to stdout.
    // Rotation keeps any single log file bounded.
    use tracing_subscriber::fmt::writer::MakeWriterExt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
    let file_appender = tracing_appender::rolling::daily(log_dir, "room-service.log");
    let (file_writer, _log_guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stdout.and(file_writer))
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Room Service API - Starting...");

    // Get configuration from environment variables
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    // Load persisted operating configuration (read once per process)
    let app_settings = AppSettings::load(&db_pool)
        .await
        .expect("Failed to load settings");

    // Point-of-sale provider client with a bounded per-request timeout
    let pos_base_url =
        std::env::var("POS_BASE_URL").unwrap_or_else(|_| "http://localhost:9090".to_string());
    let pos_api_key = std::env::var("POS_API_KEY").unwrap_or_default();
    let provider_name = std::env::var("POS_PROVIDER_NAME").unwrap_or_else(|_| "pos".to_string());

    let mut pos_config = PosClientConfig::new(pos_base_url, pos_api_key);
    if let Ok(secs) = std::env::var("POS_TIMEOUT_SECS") {
        if let Ok(secs) = secs.parse::<u64>() {
            pos_config.timeout = Duration::from_secs(secs);
        }
    }
    let pos: Arc<dyn CatalogProvider> =
        Arc::new(PosClient::new(pos_config).expect("Failed to build provider client"));

    // Create the application router
    let state = build_state(db_pool, pos, provider_name, &app_settings);
    let app = create_router(state);

    // Start the Axum server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Room Service API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}

#[cfg(test)]
mod tests;
