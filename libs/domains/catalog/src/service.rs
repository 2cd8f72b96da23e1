//! Catalog business logic - plain CRUD over catalog events

use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{CatalogEvent, CreateCatalogEvent, ListEventsQuery, UpdateCatalogEvent};
use crate::repository::CatalogEventRepository;

const DEFAULT_LIST_LIMIT: i64 = 100;

/// Catalog service providing CRUD operations over catalog events
pub struct CatalogService<R: CatalogEventRepository> {
    repository: Arc<R>,
}

impl<R: CatalogEventRepository> CatalogService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new event, generating an eventId when none is supplied
    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create_event(&self, input: CreateCatalogEvent) -> CatalogResult<CatalogEvent> {
        input
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        self.repository.insert(CatalogEvent::new(input)).await
    }

    /// List events, newest first. The limit is clamped to 1..=100 and
    /// defaults to 100.
    #[instrument(skip(self))]
    pub async fn list_events(&self, query: ListEventsQuery) -> CatalogResult<Vec<CatalogEvent>> {
        let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, 100);
        self.repository.list(limit, query.status).await
    }

    /// Get an event by ID
    #[instrument(skip(self))]
    pub async fn get_event(&self, event_id: &str) -> CatalogResult<CatalogEvent> {
        self.repository
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(event_id.to_string()))
    }

    /// Apply a partial update. An empty patch returns the stored document
    /// unchanged.
    #[instrument(skip(self, patch))]
    pub async fn update_event(
        &self,
        event_id: &str,
        patch: UpdateCatalogEvent,
    ) -> CatalogResult<CatalogEvent> {
        patch
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        let mut event = self
            .repository
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(event_id.to_string()))?;

        if patch.is_empty() {
            tracing::warn!(event_id, "no fields to update");
            return Ok(event);
        }

        event.apply_update(patch);
        if !self.repository.replace(&event).await? {
            // Deleted between the read and the write
            return Err(CatalogError::NotFound(event_id.to_string()));
        }

        tracing::info!(event_id, "catalog event updated");
        Ok(event)
    }

    /// Delete an event
    #[instrument(skip(self))]
    pub async fn delete_event(&self, event_id: &str) -> CatalogResult<()> {
        self.repository
            .delete_by_id(event_id)
            .await?
            .ok_or_else(|| CatalogError::NotFound(event_id.to_string()))?;

        tracing::info!(event_id, "catalog event deleted");
        Ok(())
    }
}

impl<R: CatalogEventRepository> Clone for CatalogService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
