//! MongoDB implementation of CatalogEventRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::doc,
    options::{FindOptions, IndexOptions},
};
use tracing::instrument;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{CatalogEvent, EventStatus};
use crate::repository::CatalogEventRepository;

/// E11000 duplicate key, surfaced either as a write error or a command error
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        ErrorKind::Command(command_error) => command_error.code == 11000,
        _ => false,
    }
}

/// Create the catalog collection indexes. Called once at startup.
pub async fn init_indexes(db: &Database) -> CatalogResult<()> {
    MongoCatalogEventRepository::new(db).create_indexes().await?;
    tracing::info!("catalog collection indexes created");
    Ok(())
}

/// MongoDB implementation of the CatalogEventRepository
#[derive(Clone)]
pub struct MongoCatalogEventRepository {
    collection: Collection<CatalogEvent>,
}

impl MongoCatalogEventRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("events"),
        }
    }

    pub async fn create_indexes(&self) -> CatalogResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "eventId": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }

    /// Build the list filter document from an optional status
    fn build_list_filter(status: Option<EventStatus>) -> mongodb::bson::Document {
        let mut filter = doc! {};
        if let Some(status) = status {
            filter.insert("status", status.to_string());
        }
        filter
    }
}

#[async_trait]
impl CatalogEventRepository for MongoCatalogEventRepository {
    #[instrument(skip(self, event), fields(event_id = %event.event_id))]
    async fn insert(&self, event: CatalogEvent) -> CatalogResult<CatalogEvent> {
        match self.collection.insert_one(&event).await {
            Ok(_) => {
                tracing::info!(event_id = %event.event_id, "catalog event created");
                Ok(event)
            }
            Err(err) if is_duplicate_key(&err) => {
                Err(CatalogError::Duplicate(event.event_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, event_id: &str) -> CatalogResult<Option<CatalogEvent>> {
        let event = self
            .collection
            .find_one(doc! { "eventId": event_id })
            .await?;
        Ok(event)
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        limit: i64,
        status: Option<EventStatus>,
    ) -> CatalogResult<Vec<CatalogEvent>> {
        let filter = Self::build_list_filter(status);
        let options = FindOptions::builder()
            .limit(limit)
            .sort(doc! { "createdAt": -1 })
            .build();

        let cursor = self.collection.find(filter).with_options(options).await?;
        let events: Vec<CatalogEvent> = cursor.try_collect().await?;

        Ok(events)
    }

    #[instrument(skip(self, event), fields(event_id = %event.event_id))]
    async fn replace(&self, event: &CatalogEvent) -> CatalogResult<bool> {
        let result = self
            .collection
            .replace_one(doc! { "eventId": &event.event_id }, event)
            .await?;
        Ok(result.matched_count > 0)
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, event_id: &str) -> CatalogResult<Option<CatalogEvent>> {
        let removed = self
            .collection
            .find_one_and_delete(doc! { "eventId": event_id })
            .await?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_list_filter_empty() {
        let filter = MongoCatalogEventRepository::build_list_filter(None);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_build_list_filter_with_status() {
        let filter = MongoCatalogEventRepository::build_list_filter(Some(EventStatus::Published));
        assert_eq!(filter.get_str("status").unwrap(), "published");
    }
}
