// Order mode router
//
// Single entry point for the API layer. The operating mode is chosen once
// at construction from persisted configuration and never re-read: every
// request in a process lifetime sees the same mode, and flipping the flag
// requires a restart.

use serde::Serialize;
use uuid::Uuid;

use crate::catalog::ProductRepository;
use crate::orders::{
    CatalogOrderManager, CheckoutResponse, CreateOrderRequest, CreateOrderResponse, OrderError,
    OrderItemRequest, OrderResponse,
};
use crate::provider::TicketItem;
use crate::tickets::{RoomTicketManager, TicketResponse};

/// The two operating modes, selected at startup
pub enum OrderMode {
    /// Discrete, catalog-priced local orders
    Catalog(CatalogOrderManager),
    /// One provider-mirrored ticket per room
    OpenTicket(RoomTicketManager),
}

/// One order as seen through the uniform contract
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum OrderView {
    Catalog(OrderResponse),
    Ticket(TicketResponse),
}

/// Order history for a room
#[derive(Debug, Serialize)]
pub struct OrderHistoryResponse {
    pub mode: &'static str,
    pub orders: Vec<OrderView>,
}

/// Order mode router
pub struct OrderModeRouter {
    mode: OrderMode,
    products: ProductRepository,
}

impl OrderModeRouter {
    /// Create a router fixed to the given mode for the process lifetime
    pub fn new(mode: OrderMode, products: ProductRepository) -> Self {
        Self { mode, products }
    }

    /// Whether open-ticket mode is active
    pub fn is_open_ticket_mode_enabled(&self) -> bool {
        matches!(self.mode, OrderMode::OpenTicket(_))
    }

    fn mode_name(&self) -> &'static str {
        match self.mode {
            OrderMode::Catalog(_) => "catalog",
            OrderMode::OpenTicket(_) => "open_ticket",
        }
    }

    /// Place an order for a room
    pub async fn create_order(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<CreateOrderResponse, OrderError> {
        match &self.mode {
            OrderMode::Catalog(manager) => {
                let created = manager.create_order(request).await?;
                Ok(CreateOrderResponse {
                    success: true,
                    mode: "catalog",
                    order_id: Some(created.order_id),
                    ticket_id: None,
                    session_id: Some(created.session_id),
                    total: Some(created.total),
                })
            }
            OrderMode::OpenTicket(manager) => {
                let lines = self.resolve_ticket_items(&request.items).await?;
                let ticket = manager
                    .add_item_to_room_ticket(request.room_number.trim(), &lines)
                    .await?;
                Ok(CreateOrderResponse {
                    success: true,
                    mode: "open_ticket",
                    order_id: None,
                    ticket_id: Some(ticket.id),
                    session_id: None,
                    total: None,
                })
            }
        }
    }

    /// Fetch one order (or ticket) by its identifier
    pub async fn get_order(&self, id: &str) -> Result<OrderView, OrderError> {
        match &self.mode {
            OrderMode::Catalog(manager) => {
                let order_id = Uuid::parse_str(id)
                    .map_err(|_| OrderError::ValidationError("Invalid order id".to_string()))?;
                Ok(OrderView::Catalog(manager.get_order(order_id).await?))
            }
            OrderMode::OpenTicket(manager) => {
                let ticket_id: i32 = id
                    .parse()
                    .map_err(|_| OrderError::ValidationError("Invalid ticket id".to_string()))?;
                let ticket = manager
                    .get_ticket(ticket_id)
                    .await?
                    .ok_or(OrderError::NotFound)?;
                Ok(OrderView::Ticket(ticket.into()))
            }
        }
    }

    /// Order history for a room under the uniform contract
    pub async fn get_orders_by_room(
        &self,
        room_number: &str,
    ) -> Result<OrderHistoryResponse, OrderError> {
        let orders = match &self.mode {
            OrderMode::Catalog(manager) => manager
                .get_orders_by_room(room_number)
                .await?
                .into_iter()
                .map(OrderView::Catalog)
                .collect(),
            OrderMode::OpenTicket(manager) => manager
                .list_by_room(room_number)
                .await?
                .into_iter()
                .map(|ticket| OrderView::Ticket(ticket.into()))
                .collect(),
        };

        Ok(OrderHistoryResponse {
            mode: self.mode_name(),
            orders,
        })
    }

    /// Move everything open for the room to a terminal state. Idempotent in
    /// both modes: a second call completes nothing and still succeeds.
    pub async fn complete_orders_on_checkout(
        &self,
        room_number: &str,
    ) -> Result<CheckoutResponse, OrderError> {
        let completed = match &self.mode {
            OrderMode::Catalog(manager) => {
                manager.complete_orders_on_checkout(room_number).await?
            }
            OrderMode::OpenTicket(manager) => {
                if manager.checkout_room_ticket(room_number).await? {
                    1
                } else {
                    0
                }
            }
        };

        Ok(CheckoutResponse {
            success: true,
            completed,
        })
    }

    /// Open a ticket for a room without ordering anything yet (guest links
    /// their account to the room). Only meaningful in open-ticket mode.
    pub async fn open_room_ticket(
        &self,
        room_number: &str,
        guest_name: Option<&str>,
        messenger_user_id: Option<&str>,
    ) -> Result<TicketResponse, OrderError> {
        match &self.mode {
            OrderMode::Catalog(_) => Err(OrderError::ValidationError(
                "Open-ticket mode is not enabled".to_string(),
            )),
            OrderMode::OpenTicket(manager) => {
                let ticket = manager
                    .create_room_ticket(room_number, guest_name, messenger_user_id)
                    .await?;
                Ok(ticket.into())
            }
        }
    }

    /// The active ticket for a room, if open-ticket mode is enabled
    pub async fn get_active_ticket(
        &self,
        room_number: &str,
    ) -> Result<Option<TicketResponse>, OrderError> {
        match &self.mode {
            OrderMode::Catalog(_) => Err(OrderError::ValidationError(
                "Open-ticket mode is not enabled".to_string(),
            )),
            OrderMode::OpenTicket(manager) => Ok(manager
                .get_room_ticket_by_room_number(room_number)
                .await?
                .map(|ticket| ticket.into())),
        }
    }

    /// Resolve requested items into provider ticket lines using the local
    /// catalog mirror for names and prices
    async fn resolve_ticket_items(
        &self,
        items: &[OrderItemRequest],
    ) -> Result<Vec<TicketItem>, OrderError> {
        let mut lines = Vec::with_capacity(items.len());
        for item in items {
            let product = if let Some(id) = item.product_id {
                self.products.find_by_id(id).await?
            } else if let Some(ref provider_id) = item.provider_item_id {
                self.products.find_by_provider_id(provider_id).await?
            } else {
                return Err(OrderError::ValidationError(
                    "Item must name a product_id or provider_item_id".to_string(),
                ));
            };

            let product = match product {
                Some(product) if product.active => product,
                _ => {
                    let reference = item
                        .product_id
                        .map(|id| id.to_string())
                        .or_else(|| item.provider_item_id.clone())
                        .unwrap_or_default();
                    return Err(OrderError::ProductNotFound(reference));
                }
            };

            lines.push(TicketItem {
                item_id: product.provider_id,
                name: product.name,
                unit_price: product.price,
                quantity: item.quantity,
                note: item.note.clone(),
            });
        }

        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hours::{BusinessHours, BusinessHoursGate};
    use crate::provider::{ProviderCategory, ProviderError, ProviderProduct};
    use crate::stock::StockLedger;
    use crate::tickets::RoomTicketManager;
    use async_trait::async_trait;
    use sqlx::postgres::PgPoolOptions;
    use std::sync::Arc;

    struct UnreachablePos;

    #[async_trait]
    impl crate::provider::CatalogProvider for UnreachablePos {
        async fn fetch_categories(&self) -> Result<Vec<ProviderCategory>, ProviderError> {
            Err(ProviderError::Timeout)
        }
        async fn fetch_products(&self) -> Result<Vec<ProviderProduct>, ProviderError> {
            Err(ProviderError::Timeout)
        }
        async fn fetch_product_image(
            &self,
            _provider_id: &str,
        ) -> Result<Option<String>, ProviderError> {
            Err(ProviderError::Timeout)
        }
        async fn create_ticket(&self, _room_number: &str) -> Result<String, ProviderError> {
            Err(ProviderError::Timeout)
        }
        async fn append_ticket_items(
            &self,
            _external_ticket_id: &str,
            _items: &[TicketItem],
        ) -> Result<(), ProviderError> {
            Err(ProviderError::Timeout)
        }
        async fn close_ticket(&self, _external_ticket_id: &str) -> Result<(), ProviderError> {
            Err(ProviderError::Timeout)
        }
    }

    fn lazy_pool() -> sqlx::PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgresql://localhost/unused")
            .unwrap()
    }

    /// The mode is fixed when the router is constructed and reported
    /// consistently afterwards
    #[tokio::test]
    async fn test_mode_is_fixed_at_construction() {
        let pool = lazy_pool();

        let hours = Arc::new(BusinessHoursGate::new(
            pool.clone(),
            BusinessHours::default(),
        ));
        let catalog = OrderModeRouter::new(
            OrderMode::Catalog(CatalogOrderManager::new(
                pool.clone(),
                hours,
                StockLedger::new(true),
            )),
            ProductRepository::new(pool.clone()),
        );
        assert!(!catalog.is_open_ticket_mode_enabled());
        assert_eq!(catalog.mode_name(), "catalog");

        let open_ticket = OrderModeRouter::new(
            OrderMode::OpenTicket(RoomTicketManager::new(
                pool.clone(),
                Arc::new(UnreachablePos),
            )),
            ProductRepository::new(pool),
        );
        assert!(open_ticket.is_open_ticket_mode_enabled());
        assert_eq!(open_ticket.mode_name(), "open_ticket");
    }
}
