use std::sync::Arc;

use sqlx::PgPool;

use crate::provider::{CatalogProvider, TicketItem};
use crate::tickets::error::TicketError;
use crate::tickets::models::RoomTicket;
use crate::tickets::repository::RoomTicketsRepository;

/// Service for open-ticket mode
///
/// Maintains the single mutable ticket per room: NONE → OPEN → CLOSED. The
/// provider owns the ticket's running total; this service mirrors the
/// ticket reference and status locally and guards the one-active-ticket
/// invariant.
#[derive(Clone)]
pub struct RoomTicketManager {
    pool: PgPool,
    tickets: RoomTicketsRepository,
    provider: Arc<dyn CatalogProvider>,
}

impl RoomTicketManager {
    /// Create a new RoomTicketManager
    pub fn new(pool: PgPool, provider: Arc<dyn CatalogProvider>) -> Self {
        let tickets = RoomTicketsRepository::new(pool.clone());
        Self {
            pool,
            tickets,
            provider,
        }
    }

    /// Get the active ticket for a room, if any
    pub async fn get_room_ticket_by_room_number(
        &self,
        room_number: &str,
    ) -> Result<Option<RoomTicket>, TicketError> {
        self.tickets.find_active_by_room(room_number).await
    }

    /// Get a ticket by its local id
    pub async fn get_ticket(&self, ticket_id: i32) -> Result<Option<RoomTicket>, TicketError> {
        self.tickets.find_by_id(ticket_id).await
    }

    /// List all tickets for a room, newest first
    pub async fn list_by_room(&self, room_number: &str) -> Result<Vec<RoomTicket>, TicketError> {
        self.tickets.find_by_room(room_number).await
    }

    /// Create a ticket for a room, or return the one already open.
    ///
    /// The row lock taken before the existence check serializes concurrent
    /// creations for the same room; two concurrent calls yield one ticket.
    pub async fn create_room_ticket(
        &self,
        room_number: &str,
        guest_name: Option<&str>,
        messenger_user_id: Option<&str>,
    ) -> Result<RoomTicket, TicketError> {
        let mut tx = self.pool.begin().await?;

        if let Some(existing) = self.tickets.lock_active_by_room(&mut tx, room_number).await? {
            return Ok(existing);
        }

        tracing::info!(
            "Opening ticket for room {} (guest: {}, messenger: {})",
            room_number,
            guest_name.unwrap_or("-"),
            messenger_user_id.unwrap_or("-")
        );

        let external_id = self.provider.create_ticket(room_number).await?;
        let ticket = self.tickets.insert(&mut tx, room_number, &external_id).await?;

        tx.commit().await?;
        Ok(ticket)
    }

    /// Append items to the room's ticket, creating the ticket first if the
    /// room has none.
    ///
    /// Lines go to the provider-side ticket; locally only the reference is
    /// stored. A provider failure fails the whole call and rolls back a
    /// ticket created within it.
    pub async fn add_item_to_room_ticket(
        &self,
        room_number: &str,
        items: &[TicketItem],
    ) -> Result<RoomTicket, TicketError> {
        let mut tx = self.pool.begin().await?;

        let ticket = match self.tickets.lock_active_by_room(&mut tx, room_number).await? {
            Some(ticket) => ticket,
            None => {
                let external_id = self.provider.create_ticket(room_number).await?;
                self.tickets.insert(&mut tx, room_number, &external_id).await?
            }
        };

        self.provider
            .append_ticket_items(&ticket.external_ticket_id, items)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Appended {} line(s) to ticket {} for room {}",
            items.len(),
            ticket.id,
            room_number
        );
        Ok(ticket)
    }

    /// Close the room's active ticket and free the room for a new one.
    ///
    /// Idempotent: a room with no active ticket is a successful no-op and
    /// returns false.
    pub async fn checkout_room_ticket(&self, room_number: &str) -> Result<bool, TicketError> {
        let mut tx = self.pool.begin().await?;

        let Some(ticket) = self.tickets.lock_active_by_room(&mut tx, room_number).await? else {
            tracing::debug!("Checkout for room {} with no active ticket", room_number);
            return Ok(false);
        };

        self.provider
            .close_ticket(&ticket.external_ticket_id)
            .await?;
        self.tickets.close(&mut tx, ticket.id).await?;

        tx.commit().await?;

        tracing::info!("Closed ticket {} for room {}", ticket.id, room_number);
        Ok(true)
    }
}
