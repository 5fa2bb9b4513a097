use sqlx::PgPool;

use crate::catalog::error::CatalogError;
use crate::catalog::models::{Category, Product, SyncStats};

/// Repository for category reads
#[derive(Clone)]
pub struct CategoryRepository {
    pool: PgPool,
}

impl CategoryRepository {
    /// Create a new CategoryRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List active categories in display order
    pub async fn list_active(&self) -> Result<Vec<Category>, CatalogError> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, sort_order, active, open_order_time, last_order_time,
                   created_at, updated_at
            FROM categories
            WHERE active = TRUE
            ORDER BY sort_order, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}

/// Repository for product reads
#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    /// Create a new ProductRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a product by local id
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Product>, CatalogError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, provider_id, category_id, name, price, active, stock_qty,
                   sort_order, pickup, label1, label2, image_url, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Find a product by the provider's id
    pub async fn find_by_provider_id(
        &self,
        provider_id: &str,
    ) -> Result<Option<Product>, CatalogError> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, provider_id, category_id, name, price, active, stock_qty,
                   sort_order, pickup, label1, label2, image_url, updated_at
            FROM products
            WHERE provider_id = $1
            "#,
        )
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// List active products for a category in display order
    pub async fn list_active_by_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<Product>, CatalogError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, provider_id, category_id, name, price, active, stock_qty,
                   sort_order, pickup, label1, label2, image_url, updated_at
            FROM products
            WHERE category_id = $1 AND active = TRUE
            ORDER BY sort_order, id
            "#,
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// List active products that still have no image URL
    pub async fn list_missing_images(&self) -> Result<Vec<(i32, String)>, CatalogError> {
        let rows: Vec<(i32, String)> = sqlx::query_as(
            "SELECT id, provider_id FROM products WHERE image_url IS NULL AND active = TRUE",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Store a resolved image URL
    pub async fn set_image_url(&self, id: i32, image_url: &str) -> Result<(), CatalogError> {
        sqlx::query("UPDATE products SET image_url = $1, updated_at = NOW() WHERE id = $2")
            .bind(image_url)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Repository for the per-(provider, table) sync snapshot
#[derive(Clone)]
pub struct SyncStatsRepository {
    pool: PgPool,
}

impl SyncStatsRepository {
    /// Create a new SyncStatsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Overwrite the latest snapshot for a (provider, table) pair
    pub async fn upsert(
        &self,
        provider: &str,
        table_name: &str,
        stats: &SyncStats,
    ) -> Result<(), CatalogError> {
        sqlx::query(
            r#"
            INSERT INTO sync_stats (provider, table_name, added, updated, skipped, errors, ran_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            ON CONFLICT (provider, table_name)
            DO UPDATE SET
                added = $3,
                updated = $4,
                skipped = $5,
                errors = $6,
                ran_at = NOW()
            "#,
        )
        .bind(provider)
        .bind(table_name)
        .bind(stats.added)
        .bind(stats.updated)
        .bind(stats.skipped)
        .bind(stats.errors)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
