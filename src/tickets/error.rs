/// Error types for room ticket operations
#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Ticket not found")]
    NotFound,

    #[error("Provider error: {0}")]
    Provider(String),
}

impl From<sqlx::Error> for TicketError {
    fn from(err: sqlx::Error) -> Self {
        TicketError::DatabaseError(err.to_string())
    }
}

impl From<crate::provider::ProviderError> for TicketError {
    fn from(err: crate::provider::ProviderError) -> Self {
        TicketError::Provider(err.to_string())
    }
}
