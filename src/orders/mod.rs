pub mod catalog_mode;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pricing;
pub mod repository;
pub mod router;
pub mod status_machine;

pub use catalog_mode::*;
pub use error::*;
pub use handlers::*;
pub use models::*;
pub use pricing::*;
pub use repository::*;
pub use router::*;
pub use status_machine::*;
