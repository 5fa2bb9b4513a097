// HTTP handlers for catalog sync and the guest menu

use axum::{extract::State, Json};

use crate::catalog::{CatalogError, MenuCategory, SyncOutcome};

/// Handler for POST /api/sync/categories
/// Triggers a category sync run; the outcome is returned as a structured
/// result rather than an HTTP error so schedulers can record the stats
#[utoipa::path(
    post,
    path = "/api/sync/categories",
    responses(
        (status = 200, description = "Sync outcome with per-run counters; success=false on a rolled-back run")
    ),
    tag = "catalog"
)]
pub async fn sync_categories_handler(
    State(state): State<crate::AppState>,
) -> Json<SyncOutcome> {
    tracing::info!("Category sync triggered");
    Json(state.sync_engine.sync_categories().await)
}

/// Handler for POST /api/sync/products
/// Triggers a product sync run (including the best-effort image pass)
#[utoipa::path(
    post,
    path = "/api/sync/products",
    responses(
        (status = 200, description = "Sync outcome with per-run counters; success=false on a rolled-back run")
    ),
    tag = "catalog"
)]
pub async fn sync_products_handler(State(state): State<crate::AppState>) -> Json<SyncOutcome> {
    tracing::info!("Product sync triggered");
    Json(state.sync_engine.sync_products().await)
}

/// Handler for GET /api/menu
/// Returns active categories with their active products, annotated with the
/// business-hours open flag the front end uses to grey out sections
#[utoipa::path(
    get,
    path = "/api/menu",
    responses(
        (status = 200, description = "Active categories with their active products"),
        (status = 500, description = "Internal server error")
    ),
    tag = "catalog"
)]
pub async fn get_menu_handler(
    State(state): State<crate::AppState>,
) -> Result<Json<Vec<MenuCategory>>, CatalogError> {
    let categories = state.category_repo.list_active().await?;

    let mut menu = Vec::with_capacity(categories.len());
    for category in categories {
        let products = state
            .product_repo
            .list_active_by_category(&category.id)
            .await?;
        let open = state
            .hours
            .is_category_open(&category.id)
            .await
            .map_err(|e| CatalogError::DatabaseError(e.to_string()))?;

        menu.push(MenuCategory {
            id: category.id,
            name: category.name,
            sort_order: category.sort_order,
            open,
            products: products.into_iter().map(|p| p.into()).collect(),
        });
    }

    Ok(Json(menu))
}
