use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Ticket status enum, a mirror of the provider-side ticket state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Closed,
}

impl TicketStatus {
    /// Convert status to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::Closed => "closed",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Domain model for a room ticket
///
/// At most one OPEN ticket exists per room at any time; the running total
/// lives with the provider, the local row mirrors status only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoomTicket {
    pub id: i32,
    pub room_number: String,
    pub external_ticket_id: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
}

/// Response DTO for a ticket
#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub ticket_id: i32,
    pub room_number: String,
    pub external_ticket_id: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
}

impl From<RoomTicket> for TicketResponse {
    fn from(ticket: RoomTicket) -> Self {
        Self {
            ticket_id: ticket.id,
            room_number: ticket.room_number,
            external_ticket_id: ticket.external_ticket_id,
            status: ticket.status,
            created_at: ticket.created_at,
        }
    }
}
