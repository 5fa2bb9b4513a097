use std::sync::Arc;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::catalog::{Product, ProductRepository};
use crate::hours::BusinessHoursGate;
use crate::orders::{
    CreateOrderRequest, OrderError, OrderItemRequest, OrderItemsRepository, OrderResponse,
    OrdersRepository, PriceCalculator,
};
use crate::stock::{ReserveOutcome, StockLedger};

/// Result of a catalog-mode order creation or append
#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub order_id: Uuid,
    pub session_id: Uuid,
    pub total: Decimal,
}

/// Service for catalog mode
///
/// Each checkout call creates (or extends) one locally priced order. The
/// whole call runs in a single transaction: every line reserves stock under
/// the product row lock, and any conflict rolls the entire call back so no
/// partial order is ever visible.
#[derive(Clone)]
pub struct CatalogOrderManager {
    pool: PgPool,
    orders: OrdersRepository,
    items: OrderItemsRepository,
    products: ProductRepository,
    hours: Arc<BusinessHoursGate>,
    stock: StockLedger,
}

impl CatalogOrderManager {
    /// Create a new CatalogOrderManager
    pub fn new(pool: PgPool, hours: Arc<BusinessHoursGate>, stock: StockLedger) -> Self {
        let orders = OrdersRepository::new(pool.clone());
        let items = OrderItemsRepository::new(pool.clone());
        let products = ProductRepository::new(pool.clone());
        Self {
            pool,
            orders,
            items,
            products,
            hours,
            stock,
        }
    }

    /// Create a new order, or append lines to the OPEN order the request's
    /// session identifier refers to.
    ///
    /// # Validation
    /// - Every item must resolve to an active product
    /// - Every product's category must currently accept orders
    /// - Stock is reserved per line; one conflict fails the whole call
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<CreatedOrder, OrderError> {
        if request.items.is_empty() {
            return Err(OrderError::ValidationError(
                "Order must contain at least one item".to_string(),
            ));
        }

        let room_number = request.room_number.trim();

        // Resolve products and gate on business hours before opening the
        // transaction; a rejected order must leave no side effects
        let mut lines = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let product = self.resolve_product(item).await?;

            if !self
                .hours
                .is_category_open(&product.category_id)
                .await
                .map_err(|e| OrderError::DatabaseError(e.to_string()))?
            {
                return Err(OrderError::CategoryClosed(product.category_id));
            }

            lines.push((product, item));
        }

        let mut tx = self.pool.begin().await?;

        let order = match request.session_id {
            Some(session_id) => {
                match self
                    .orders
                    .lock_by_session(&mut tx, room_number, session_id)
                    .await?
                {
                    Some(order) if order.status.is_terminal() => {
                        return Err(OrderError::ValidationError(
                            "Order session is already checked out".to_string(),
                        ));
                    }
                    Some(order) => order,
                    None => {
                        self.insert_order(&mut tx, request, room_number, session_id)
                            .await?
                    }
                }
            }
            None => {
                self.insert_order(&mut tx, request, room_number, Uuid::new_v4())
                    .await?
            }
        };

        for (product, item) in &lines {
            match self.stock.reserve(&mut tx, product.id, item.quantity).await? {
                ReserveOutcome::Reserved => {}
                ReserveOutcome::Conflict { product_id, .. } => {
                    // Dropping the transaction rolls back the order row and
                    // every reservation made earlier in this call
                    return Err(OrderError::StockConflict { product_id });
                }
            }

            let subtotal = PriceCalculator::line_subtotal(item.quantity, product.price);
            self.items
                .insert(
                    &mut tx,
                    order.id,
                    order.session_id,
                    &product.provider_id,
                    &product.name,
                    product.price,
                    item.quantity,
                    subtotal,
                    item.note.as_deref(),
                )
                .await?;
        }

        let total = self.orders.recompute_total(&mut tx, order.id).await?;

        tx.commit().await?;

        tracing::info!(
            "Order {} for room {}: {} line(s), total {}",
            order.id,
            room_number,
            lines.len(),
            total
        );

        Ok(CreatedOrder {
            order_id: order.id,
            session_id: order.session_id,
            total,
        })
    }

    /// Get an order with its lines
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderResponse, OrderError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        let items = self.items.find_by_order_id(order.id).await?;
        Ok(OrderResponse::from_order(order, items))
    }

    /// Get all orders for a room with their lines, newest first
    pub async fn get_orders_by_room(
        &self,
        room_number: &str,
    ) -> Result<Vec<OrderResponse>, OrderError> {
        let orders = self.orders.find_by_room(room_number).await?;

        let mut responses = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.items.find_by_order_id(order.id).await?;
            responses.push(OrderResponse::from_order(order, items));
        }

        Ok(responses)
    }

    /// Complete every OPEN order for the room. Idempotent.
    pub async fn complete_orders_on_checkout(&self, room_number: &str) -> Result<u64, OrderError> {
        let completed = self.orders.complete_open_for_room(room_number).await?;
        if completed > 0 {
            tracing::info!("Checked out {} order(s) for room {}", completed, room_number);
        }
        Ok(completed)
    }

    async fn resolve_product(&self, item: &OrderItemRequest) -> Result<Product, OrderError> {
        let product = if let Some(id) = item.product_id {
            self.products.find_by_id(id).await?
        } else if let Some(ref provider_id) = item.provider_item_id {
            self.products.find_by_provider_id(provider_id).await?
        } else {
            return Err(OrderError::ValidationError(
                "Item must name a product_id or provider_item_id".to_string(),
            ));
        };

        let reference = item
            .product_id
            .map(|id| id.to_string())
            .or_else(|| item.provider_item_id.clone())
            .unwrap_or_default();

        match product {
            Some(product) if product.active => Ok(product),
            _ => Err(OrderError::ProductNotFound(reference)),
        }
    }

    async fn insert_order(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        request: &CreateOrderRequest,
        room_number: &str,
        session_id: Uuid,
    ) -> Result<crate::orders::Order, OrderError> {
        self.orders
            .insert(
                tx,
                room_number,
                request.guest_name.as_deref().unwrap_or(""),
                request.messenger_user_id.as_deref(),
                request.note.as_deref(),
                session_id,
            )
            .await
    }
}
