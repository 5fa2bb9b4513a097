use sqlx::{PgPool, Postgres, Transaction};

use crate::tickets::error::TicketError;
use crate::tickets::models::{RoomTicket, TicketStatus};

const TICKET_COLUMNS: &str = "id, room_number, external_ticket_id, status, created_at";

/// Repository for room ticket rows
#[derive(Clone)]
pub struct RoomTicketsRepository {
    pool: PgPool,
}

impl RoomTicketsRepository {
    /// Create a new RoomTicketsRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the active ticket for a room, if any
    pub async fn find_active_by_room(
        &self,
        room_number: &str,
    ) -> Result<Option<RoomTicket>, TicketError> {
        let ticket = sqlx::query_as::<_, RoomTicket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM room_tickets \
             WHERE room_number = $1 AND status = $2"
        ))
        .bind(room_number)
        .bind(TicketStatus::Open)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ticket)
    }

    /// Find a ticket by its local id
    pub async fn find_by_id(&self, ticket_id: i32) -> Result<Option<RoomTicket>, TicketError> {
        let ticket = sqlx::query_as::<_, RoomTicket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM room_tickets WHERE id = $1"
        ))
        .bind(ticket_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ticket)
    }

    /// Find all tickets for a room, newest first
    pub async fn find_by_room(&self, room_number: &str) -> Result<Vec<RoomTicket>, TicketError> {
        let tickets = sqlx::query_as::<_, RoomTicket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM room_tickets \
             WHERE room_number = $1 ORDER BY created_at DESC"
        ))
        .bind(room_number)
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }

    /// Lock the active ticket for a room inside the caller's transaction.
    ///
    /// The lock serializes concurrent check-then-create sequences for the
    /// same room; the partial unique index on (room_number) WHERE open is
    /// the structural backstop.
    pub async fn lock_active_by_room(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        room_number: &str,
    ) -> Result<Option<RoomTicket>, TicketError> {
        let ticket = sqlx::query_as::<_, RoomTicket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM room_tickets \
             WHERE room_number = $1 AND status = $2 FOR UPDATE"
        ))
        .bind(room_number)
        .bind(TicketStatus::Open)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(ticket)
    }

    /// Insert a new open ticket inside the caller's transaction
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        room_number: &str,
        external_ticket_id: &str,
    ) -> Result<RoomTicket, TicketError> {
        let ticket = sqlx::query_as::<_, RoomTicket>(&format!(
            "INSERT INTO room_tickets (room_number, external_ticket_id, status) \
             VALUES ($1, $2, $3) \
             RETURNING {TICKET_COLUMNS}"
        ))
        .bind(room_number)
        .bind(external_ticket_id)
        .bind(TicketStatus::Open)
        .fetch_one(&mut **tx)
        .await?;

        Ok(ticket)
    }

    /// Close a ticket inside the caller's transaction
    pub async fn close(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ticket_id: i32,
    ) -> Result<(), TicketError> {
        sqlx::query("UPDATE room_tickets SET status = $1 WHERE id = $2")
            .bind(TicketStatus::Closed)
            .bind(ticket_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}
