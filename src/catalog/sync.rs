// Catalog sync engine
//
// Pulls the provider's category/product snapshot and reconciles it into
// local storage. Each run is all-or-nothing: one transaction covers the
// whole reconcile loop, and any mid-loop failure rolls everything back.
// Records present locally but absent from the snapshot are left alone;
// deletion is not a sync concern. A best-effort image pass runs after the
// product transaction commits and never fails the run.

use std::collections::HashSet;
use std::sync::Arc;

use sqlx::PgPool;

use crate::catalog::models::{SyncOutcome, SyncStats};
use crate::catalog::repository::{ProductRepository, SyncStatsRepository};
use crate::provider::CatalogProvider;

/// Display order assigned to the first record inserted into an empty table
const DEFAULT_SORT_ORDER: i32 = 10;
/// Gap between display orders of newly inserted records
const SORT_ORDER_STEP: i32 = 10;

/// Classification of one provider record against local state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reconcile {
    Insert { sort_order: i32 },
    Update,
    Skip,
}

/// Plans insert/update/skip decisions for one reconcile run
///
/// Pure: tracks the set of locally known ids and the running display order
/// for inserts. Empty id or name means the provider record is not fully
/// published yet and is skipped (counted, not errored).
pub(crate) struct ReconcilePlanner {
    existing: HashSet<String>,
    next_sort: i32,
}

impl ReconcilePlanner {
    pub(crate) fn new(existing: HashSet<String>, max_sort: Option<i32>) -> Self {
        let next_sort = match max_sort {
            Some(max) => max + SORT_ORDER_STEP,
            None => DEFAULT_SORT_ORDER,
        };
        Self {
            existing,
            next_sort,
        }
    }

    pub(crate) fn classify(&mut self, id: &str, name: &str) -> Reconcile {
        if id.trim().is_empty() || name.trim().is_empty() {
            return Reconcile::Skip;
        }
        if self.existing.contains(id) {
            return Reconcile::Update;
        }

        let sort_order = self.next_sort;
        self.next_sort += SORT_ORDER_STEP;
        self.existing.insert(id.to_string());
        Reconcile::Insert { sort_order }
    }
}

/// Catalog sync engine
pub struct CatalogSyncEngine {
    pool: PgPool,
    provider: Arc<dyn CatalogProvider>,
    provider_name: String,
    products: ProductRepository,
    stats_repo: SyncStatsRepository,
}

impl CatalogSyncEngine {
    /// Create a new CatalogSyncEngine
    pub fn new(pool: PgPool, provider: Arc<dyn CatalogProvider>, provider_name: String) -> Self {
        let products = ProductRepository::new(pool.clone());
        let stats_repo = SyncStatsRepository::new(pool.clone());
        Self {
            pool,
            provider,
            provider_name,
            products,
            stats_repo,
        }
    }

    /// Reconcile the provider's category snapshot into local storage.
    pub async fn sync_categories(&self) -> SyncOutcome {
        let mut stats = SyncStats::default();

        let remote = match self.provider.fetch_categories().await {
            Ok(remote) => remote,
            Err(e) => {
                stats.errors += 1;
                tracing::error!("Category sync aborted, provider fetch failed: {}", e);
                self.store_stats("categories", &stats).await;
                return SyncOutcome::failed(stats, format!("Provider fetch failed: {}", e));
            }
        };

        match self.reconcile_categories(&remote, &mut stats).await {
            Ok(()) => {}
            Err(e) => {
                // The transaction already rolled back; only the counters of
                // the failed run survive as the latest snapshot
                stats.errors += 1;
                tracing::error!("Category sync rolled back: {}", e);
                self.store_stats("categories", &stats).await;
                return SyncOutcome::failed(stats, format!("Sync failed: {}", e));
            }
        }

        self.store_stats("categories", &stats).await;
        tracing::info!(
            "Category sync finished: {} added, {} updated, {} skipped",
            stats.added,
            stats.updated,
            stats.skipped
        );
        SyncOutcome::ok(stats, "Category sync completed")
    }

    /// Reconcile the provider's product snapshot into local storage, then
    /// run the best-effort image pass.
    pub async fn sync_products(&self) -> SyncOutcome {
        let mut stats = SyncStats::default();

        let remote = match self.provider.fetch_products().await {
            Ok(remote) => remote,
            Err(e) => {
                stats.errors += 1;
                tracing::error!("Product sync aborted, provider fetch failed: {}", e);
                self.store_stats("products", &stats).await;
                return SyncOutcome::failed(stats, format!("Provider fetch failed: {}", e));
            }
        };

        match self.reconcile_products(&remote, &mut stats).await {
            Ok(()) => {}
            Err(e) => {
                stats.errors += 1;
                tracing::error!("Product sync rolled back: {}", e);
                self.store_stats("products", &stats).await;
                return SyncOutcome::failed(stats, format!("Sync failed: {}", e));
            }
        }

        self.store_stats("products", &stats).await;

        // Non-critical: image resolution failures do not fail the sync
        self.resolve_missing_images().await;

        tracing::info!(
            "Product sync finished: {} added, {} updated, {} skipped",
            stats.added,
            stats.updated,
            stats.skipped
        );
        SyncOutcome::ok(stats, "Product sync completed")
    }

    /// Run the category reconcile loop inside one transaction.
    ///
    /// Returning Err drops the transaction, rolling back every statement
    /// issued in this run.
    async fn reconcile_categories(
        &self,
        remote: &[crate::provider::ProviderCategory],
        stats: &mut SyncStats,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let local: Vec<(String, i32)> = sqlx::query_as("SELECT id, sort_order FROM categories")
            .fetch_all(&mut *tx)
            .await?;

        let max_sort = local.iter().map(|(_, sort)| *sort).max();
        let existing: HashSet<String> = local.into_iter().map(|(id, _)| id).collect();
        let mut planner = ReconcilePlanner::new(existing, max_sort);

        for record in remote {
            match planner.classify(&record.id, &record.name) {
                Reconcile::Skip => {
                    stats.skipped += 1;
                    tracing::warn!("Skipping incomplete category record: {:?}", record.id);
                }
                Reconcile::Update => {
                    sqlx::query("UPDATE categories SET name = $1, updated_at = NOW() WHERE id = $2")
                        .bind(&record.name)
                        .bind(&record.id)
                        .execute(&mut *tx)
                        .await?;
                    stats.updated += 1;
                }
                Reconcile::Insert { sort_order } => {
                    sqlx::query(
                        r#"
                        INSERT INTO categories (id, name, sort_order, active)
                        VALUES ($1, $2, $3, TRUE)
                        "#,
                    )
                    .bind(&record.id)
                    .bind(&record.name)
                    .bind(sort_order)
                    .execute(&mut *tx)
                    .await?;
                    stats.added += 1;
                }
            }
        }

        tx.commit().await
    }

    /// Run the product reconcile loop inside one transaction.
    ///
    /// A product pointing at a category the local catalog does not know is
    /// treated as not fully published and skipped.
    async fn reconcile_products(
        &self,
        remote: &[crate::provider::ProviderProduct],
        stats: &mut SyncStats,
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let local: Vec<(String, i32)> =
            sqlx::query_as("SELECT provider_id, sort_order FROM products")
                .fetch_all(&mut *tx)
                .await?;
        let known_categories: Vec<(String,)> = sqlx::query_as("SELECT id FROM categories")
            .fetch_all(&mut *tx)
            .await?;
        let known_categories: HashSet<String> =
            known_categories.into_iter().map(|(id,)| id).collect();

        let max_sort = local.iter().map(|(_, sort)| *sort).max();
        let existing: HashSet<String> = local.into_iter().map(|(id, _)| id).collect();
        let mut planner = ReconcilePlanner::new(existing, max_sort);

        for record in remote {
            if !known_categories.contains(&record.category_id) {
                stats.skipped += 1;
                tracing::warn!(
                    "Skipping product {} with unknown category {}",
                    record.id,
                    record.category_id
                );
                continue;
            }

            match planner.classify(&record.id, &record.name) {
                Reconcile::Skip => {
                    stats.skipped += 1;
                    tracing::warn!("Skipping incomplete product record: {:?}", record.id);
                }
                Reconcile::Update => {
                    sqlx::query(
                        r#"
                        UPDATE products
                        SET name = $1, price = $2, active = $3, category_id = $4,
                            updated_at = NOW()
                        WHERE provider_id = $5
                        "#,
                    )
                    .bind(&record.name)
                    .bind(record.price)
                    .bind(record.active)
                    .bind(&record.category_id)
                    .bind(&record.id)
                    .execute(&mut *tx)
                    .await?;
                    stats.updated += 1;
                }
                Reconcile::Insert { sort_order } => {
                    sqlx::query(
                        r#"
                        INSERT INTO products
                            (provider_id, category_id, name, price, active, sort_order, image_url)
                        VALUES ($1, $2, $3, $4, $5, $6, $7)
                        "#,
                    )
                    .bind(&record.id)
                    .bind(&record.category_id)
                    .bind(&record.name)
                    .bind(record.price)
                    .bind(record.active)
                    .bind(sort_order)
                    .bind(&record.image_ref)
                    .execute(&mut *tx)
                    .await?;
                    stats.added += 1;
                }
            }
        }

        tx.commit().await
    }

    /// Resolve image URLs for products still missing one.
    ///
    /// Each product is attempted independently; a failure is logged and the
    /// pass moves on.
    async fn resolve_missing_images(&self) {
        let missing = match self.products.list_missing_images().await {
            Ok(missing) => missing,
            Err(e) => {
                tracing::warn!("Image pass skipped, could not list products: {}", e);
                return;
            }
        };

        for (product_id, provider_id) in missing {
            match self.provider.fetch_product_image(&provider_id).await {
                Ok(Some(url)) => {
                    if let Err(e) = self.products.set_image_url(product_id, &url).await {
                        tracing::warn!("Failed to store image for product {}: {}", product_id, e);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        "Image lookup failed for product {} ({}): {}",
                        product_id,
                        provider_id,
                        e
                    );
                }
            }
        }
    }

    /// Persist the latest snapshot for this run. The data already
    /// committed, so a stats failure is logged rather than propagated.
    async fn store_stats(&self, table_name: &str, stats: &SyncStats) {
        if let Err(e) = self
            .stats_repo
            .upsert(&self.provider_name, table_name, stats)
            .await
        {
            tracing::warn!("Failed to store sync stats for {}: {}", table_name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planner_with(ids: &[&str], max_sort: Option<i32>) -> ReconcilePlanner {
        let existing = ids.iter().map(|s| s.to_string()).collect();
        ReconcilePlanner::new(existing, max_sort)
    }

    #[test]
    fn test_insert_into_empty_table_uses_default_order() {
        let mut planner = planner_with(&[], None);
        assert_eq!(
            planner.classify("c1", "Drinks"),
            Reconcile::Insert { sort_order: 10 }
        );
        assert_eq!(
            planner.classify("c2", "Food"),
            Reconcile::Insert { sort_order: 20 }
        );
    }

    #[test]
    fn test_insert_continues_from_existing_max() {
        let mut planner = planner_with(&["c1"], Some(40));
        assert_eq!(
            planner.classify("c2", "Snacks"),
            Reconcile::Insert { sort_order: 50 }
        );
    }

    #[test]
    fn test_existing_records_are_updates() {
        let mut planner = planner_with(&["c1", "c2"], Some(20));
        assert_eq!(planner.classify("c1", "Drinks"), Reconcile::Update);
        assert_eq!(planner.classify("c2", "Food"), Reconcile::Update);
    }

    #[test]
    fn test_incomplete_records_are_skipped() {
        let mut planner = planner_with(&[], None);
        assert_eq!(planner.classify("", "No id"), Reconcile::Skip);
        assert_eq!(planner.classify("c9", ""), Reconcile::Skip);
        assert_eq!(planner.classify("  ", "  "), Reconcile::Skip);
        // A skip must not consume a display order slot
        assert_eq!(
            planner.classify("c1", "Drinks"),
            Reconcile::Insert { sort_order: 10 }
        );
    }

    #[test]
    fn test_duplicate_record_within_run_becomes_update() {
        let mut planner = planner_with(&[], None);
        assert_eq!(
            planner.classify("c1", "Drinks"),
            Reconcile::Insert { sort_order: 10 }
        );
        assert_eq!(planner.classify("c1", "Drinks"), Reconcile::Update);
    }

    /// Re-running an unchanged snapshot classifies everything as an update:
    /// zero inserts, zero skips, no new display orders.
    #[test]
    fn test_second_run_is_all_updates() {
        let snapshot = [("c1", "Drinks"), ("c2", "Food"), ("c3", "Desserts")];

        // First run against an empty table
        let mut first = planner_with(&[], None);
        let inserted: Vec<_> = snapshot
            .iter()
            .map(|(id, name)| first.classify(id, name))
            .collect();
        assert!(inserted
            .iter()
            .all(|r| matches!(r, Reconcile::Insert { .. })));

        // Second run against the now-populated table
        let mut second = planner_with(&["c1", "c2", "c3"], Some(30));
        for (id, name) in snapshot {
            assert_eq!(second.classify(id, name), Reconcile::Update);
        }
    }
}
