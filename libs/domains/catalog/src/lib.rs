//! Catalog Domain
//!
//! Plain CRUD over catalog events backed by MongoDB - the "Events API"
//! surface. Unlike the registration domain there is no state machine here;
//! events are freely created, partially updated, and deleted.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{CatalogService, MongoCatalogEventRepository, handlers};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("events");
//!
//! let repository = MongoCatalogEventRepository::new(&db);
//! let router = handlers::router(CatalogService::new(repository));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use error::{CatalogError, CatalogResult};
pub use handlers::ApiDoc;
pub use models::{
    CatalogEvent, CreateCatalogEvent, EventStatus, ListEventsQuery, UpdateCatalogEvent,
};
pub use mongodb::{MongoCatalogEventRepository, init_indexes};
pub use repository::CatalogEventRepository;
pub use service::CatalogService;
