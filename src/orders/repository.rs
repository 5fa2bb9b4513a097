use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::orders::error::OrderError;
use crate::orders::models::{LineStatus, Order, OrderItem, OrderStatus};

const ORDER_COLUMNS: &str = "id, room_number, guest_name, messenger_user_id, status, total, \
                             note, session_id, created_at, checkout_at";

/// Repository for catalog-mode order rows
#[derive(Clone)]
pub struct OrdersRepository {
    pool: PgPool,
}

impl OrdersRepository {
    /// Create a new OrdersRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an order by ID
    pub async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Order>, OrderError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM room_orders WHERE id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Find all orders for a room, newest first
    pub async fn find_by_room(&self, room_number: &str) -> Result<Vec<Order>, OrderError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM room_orders \
             WHERE room_number = $1 ORDER BY created_at DESC"
        ))
        .bind(room_number)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Lock the order a session refers to, if any.
    ///
    /// Runs inside the caller's transaction so concurrent appends to the
    /// same logical order serialize on the row lock.
    pub async fn lock_by_session(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        room_number: &str,
        session_id: Uuid,
    ) -> Result<Option<Order>, OrderError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM room_orders \
             WHERE room_number = $1 AND session_id = $2 FOR UPDATE"
        ))
        .bind(room_number)
        .bind(session_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(order)
    }

    /// Insert a new order row inside the caller's transaction
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        room_number: &str,
        guest_name: &str,
        messenger_user_id: Option<&str>,
        note: Option<&str>,
        session_id: Uuid,
    ) -> Result<Order, OrderError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO room_orders \
                 (room_number, guest_name, messenger_user_id, status, total, note, session_id) \
             VALUES ($1, $2, $3, $4, 0, $5, $6) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(room_number)
        .bind(guest_name)
        .bind(messenger_user_id)
        .bind(OrderStatus::Open)
        .bind(note)
        .bind(session_id)
        .fetch_one(&mut **tx)
        .await?;

        Ok(order)
    }

    /// Recompute and store the order total from its lines, inside the
    /// caller's transaction
    pub async fn recompute_total(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
    ) -> Result<Decimal, OrderError> {
        let total: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(subtotal), 0) FROM room_order_items WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_one(&mut **tx)
        .await?;

        sqlx::query("UPDATE room_orders SET total = $1 WHERE id = $2")
            .bind(total)
            .bind(order_id)
            .execute(&mut **tx)
            .await?;

        Ok(total)
    }

    /// Complete every OPEN order for a room in one statement.
    ///
    /// Idempotent: a second call matches zero rows and is a no-op.
    pub async fn complete_open_for_room(&self, room_number: &str) -> Result<u64, OrderError> {
        let result = sqlx::query(
            r#"
            UPDATE room_orders
            SET status = $1, checkout_at = NOW()
            WHERE room_number = $2 AND status = $3
            "#,
        )
        .bind(OrderStatus::Completed)
        .bind(room_number)
        .bind(OrderStatus::Open)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Repository for order lines
#[derive(Clone)]
pub struct OrderItemsRepository {
    pool: PgPool,
}

const ITEM_COLUMNS: &str = "id, order_id, session_id, provider_item_id, product_name, \
                            unit_price, quantity, subtotal, note, line_status";

impl OrderItemsRepository {
    /// Create a new OrderItemsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert one line inside the caller's transaction
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        session_id: Uuid,
        provider_item_id: &str,
        product_name: &str,
        unit_price: Decimal,
        quantity: i32,
        subtotal: Decimal,
        note: Option<&str>,
    ) -> Result<(), OrderError> {
        sqlx::query(
            r#"
            INSERT INTO room_order_items
                (order_id, session_id, provider_item_id, product_name,
                 unit_price, quantity, subtotal, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(order_id)
        .bind(session_id)
        .bind(provider_item_id)
        .bind(product_name)
        .bind(unit_price)
        .bind(quantity)
        .bind(subtotal)
        .bind(note)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Find all lines for a given order
    pub async fn find_by_order_id(&self, order_id: Uuid) -> Result<Vec<OrderItem>, OrderError> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM room_order_items WHERE order_id = $1 ORDER BY id"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Find one line by ID
    pub async fn find_by_id(&self, line_id: i32) -> Result<Option<OrderItem>, OrderError> {
        let item = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM room_order_items WHERE id = $1"
        ))
        .bind(line_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Store a new kitchen status for a line
    pub async fn update_line_status(
        &self,
        line_id: i32,
        new_status: LineStatus,
    ) -> Result<OrderItem, OrderError> {
        let item = sqlx::query_as::<_, OrderItem>(&format!(
            "UPDATE room_order_items SET line_status = $1 WHERE id = $2 \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(new_status)
        .bind(line_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(OrderError::NotFound)?;

        Ok(item)
    }
}
