// Catalog provider interface
//
// The point-of-sale system owns authoritative category/product/pricing data
// and, in open-ticket mode, the running room ticket. Everything the core
// needs from it goes through the CatalogProvider trait so managers can be
// exercised against an in-process fake.

pub mod error;
pub mod http;
pub mod models;

pub use error::ProviderError;
pub use http::{PosClient, PosClientConfig};
pub use models::{ProviderCategory, ProviderProduct, TicketItem};

use async_trait::async_trait;

/// Capabilities consumed from the external point-of-sale system.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch the full category snapshot.
    async fn fetch_categories(&self) -> Result<Vec<ProviderCategory>, ProviderError>;

    /// Fetch the full product snapshot.
    async fn fetch_products(&self) -> Result<Vec<ProviderProduct>, ProviderError>;

    /// Resolve an image URL for a single product. Best-effort secondary
    /// lookup; callers treat failures as non-critical.
    async fn fetch_product_image(&self, provider_id: &str)
        -> Result<Option<String>, ProviderError>;

    /// Open a ticket for a room and return the provider's ticket reference.
    async fn create_ticket(&self, room_number: &str) -> Result<String, ProviderError>;

    /// Append lines to an existing ticket. The provider owns the running
    /// total in open-ticket mode.
    async fn append_ticket_items(
        &self,
        external_ticket_id: &str,
        items: &[TicketItem],
    ) -> Result<(), ProviderError>;

    /// Close a ticket at checkout.
    async fn close_ticket(&self, external_ticket_id: &str) -> Result<(), ProviderError>;
}
