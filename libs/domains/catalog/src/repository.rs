use async_trait::async_trait;

use crate::error::CatalogResult;
use crate::models::{CatalogEvent, EventStatus};

/// Repository trait for CatalogEvent persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogEventRepository: Send + Sync {
    /// Insert a new event; DuplicateError when the eventId is already taken
    async fn insert(&self, event: CatalogEvent) -> CatalogResult<CatalogEvent>;

    /// Get an event by ID
    async fn find_by_id(&self, event_id: &str) -> CatalogResult<Option<CatalogEvent>>;

    /// List events, newest first, with an optional status filter
    async fn list(
        &self,
        limit: i64,
        status: Option<EventStatus>,
    ) -> CatalogResult<Vec<CatalogEvent>>;

    /// Replace the stored document; false when the event is absent
    async fn replace(&self, event: &CatalogEvent) -> CatalogResult<bool>;

    /// Delete an event, returning the removed document if it existed
    async fn delete_by_id(&self, event_id: &str) -> CatalogResult<Option<CatalogEvent>>;
}
