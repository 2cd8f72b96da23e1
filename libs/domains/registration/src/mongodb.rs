//! MongoDB implementations of the registration repositories.
//!
//! Documents keep their natural camelCase keys (`userId`, `eventId`, ...).
//! The event document additionally carries two engine-internal counters,
//! `activeCount` and `waitlistSeq`, that back the atomic seat-claim and
//! position-assignment operations and never appear in the wire model.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, from_document, to_document},
    options::{
        FindOneAndDeleteOptions, FindOneAndUpdateOptions, FindOneOptions, IndexOptions,
        ReturnDocument,
    },
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{RegistrationError, Result};
use crate::models::{Registration, RegistrationEvent, RegistrationStatus, User, WaitlistEntry};
use crate::repository::{
    RegistrationEventRepository, RegistrationRepository, UserRepository, WaitlistRepository,
};

/// E11000 duplicate key, surfaced either as a write error or a command error
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        ErrorKind::Command(command_error) => command_error.code == 11000,
        _ => false,
    }
}

/// Create all registration collection indexes. Called once at startup; the
/// unique indexes back every DuplicateError this module reports.
pub async fn init_indexes(db: &Database) -> Result<()> {
    MongoUserRepository::new(db).create_indexes().await?;
    MongoRegistrationEventRepository::new(db)
        .create_indexes()
        .await?;
    MongoRegistrationRepository::new(db).create_indexes().await?;
    MongoWaitlistRepository::new(db).create_indexes().await?;
    tracing::info!("registration collection indexes created");
    Ok(())
}

/// MongoDB implementation of UserRepository
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("users"),
        }
    }

    pub async fn create_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "userId": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.user_id))]
    async fn insert(&self, user: User) -> Result<User> {
        match self.collection.insert_one(&user).await {
            Ok(_) => {
                tracing::info!(user_id = %user.user_id, "user created");
                Ok(user)
            }
            Err(err) if is_duplicate_key(&err) => Err(RegistrationError::Duplicate(format!(
                "User with ID {} already exists",
                user.user_id
            ))),
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>> {
        let user = self.collection.find_one(doc! { "userId": user_id }).await?;
        Ok(user)
    }
}

/// Engine-internal seat accounting stored alongside the event fields
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventCounters {
    #[serde(default)]
    active_count: i64,
    #[serde(default)]
    waitlist_seq: i64,
}

/// MongoDB implementation of RegistrationEventRepository.
///
/// Seat claims, releases and position assignment are each one conditional
/// `find_one_and_update` on the event document, so they stay atomic without
/// transactions.
#[derive(Clone)]
pub struct MongoRegistrationEventRepository {
    collection: Collection<RegistrationEvent>,
}

impl MongoRegistrationEventRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("registration_events"),
        }
    }

    /// Untyped view of the collection for counter manipulation
    fn raw(&self) -> Collection<Document> {
        self.collection.clone_with_type()
    }

    pub async fn create_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "eventId": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }
}

#[async_trait]
impl RegistrationEventRepository for MongoRegistrationEventRepository {
    #[instrument(skip(self, event), fields(event_id = %event.event_id))]
    async fn insert(&self, event: RegistrationEvent) -> Result<RegistrationEvent> {
        let mut document = to_document(&event).map_err(mongodb::error::Error::from)?;
        // Conditional updates like { activeCount: { $lt: capacity } } never
        // match a missing field, so both counters must exist from the start.
        document.insert("activeCount", 0_i64);
        document.insert("waitlistSeq", 0_i64);

        match self.raw().insert_one(document).await {
            Ok(_) => {
                tracing::info!(event_id = %event.event_id, "event created");
                Ok(event)
            }
            Err(err) if is_duplicate_key(&err) => Err(RegistrationError::Duplicate(format!(
                "Event with ID {} already exists",
                event.event_id
            ))),
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, event_id: &str) -> Result<Option<RegistrationEvent>> {
        let event = self
            .collection
            .find_one(doc! { "eventId": event_id })
            .await?;
        Ok(event)
    }

    #[instrument(skip(self))]
    async fn claim_seat(&self, event_id: &str, capacity: i64) -> Result<bool> {
        // The capacity literal is safe in the filter because capacity is
        // immutable after creation.
        let claimed = self
            .raw()
            .find_one_and_update(
                doc! { "eventId": event_id, "activeCount": { "$lt": capacity } },
                doc! { "$inc": { "activeCount": 1_i64 } },
            )
            .await?;
        Ok(claimed.is_some())
    }

    #[instrument(skip(self))]
    async fn release_seat(&self, event_id: &str) -> Result<()> {
        // The guard keeps the counter non-negative even under a double release
        self.raw()
            .find_one_and_update(
                doc! { "eventId": event_id, "activeCount": { "$gt": 0_i64 } },
                doc! { "$inc": { "activeCount": -1_i64 } },
            )
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn next_waitlist_position(&self, event_id: &str) -> Result<i64> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        let updated = self
            .raw()
            .find_one_and_update(
                doc! { "eventId": event_id },
                doc! { "$inc": { "waitlistSeq": 1_i64 } },
            )
            .with_options(options)
            .await?
            .ok_or_else(|| {
                RegistrationError::NotFound(format!("Event {} not found", event_id))
            })?;

        let counters: EventCounters =
            from_document(updated).map_err(mongodb::error::Error::from)?;
        Ok(counters.waitlist_seq)
    }

    #[instrument(skip(self))]
    async fn active_count(&self, event_id: &str) -> Result<Option<i64>> {
        match self.raw().find_one(doc! { "eventId": event_id }).await? {
            Some(document) => {
                let counters: EventCounters =
                    from_document(document).map_err(mongodb::error::Error::from)?;
                Ok(Some(counters.active_count))
            }
            None => Ok(None),
        }
    }
}

/// MongoDB implementation of RegistrationRepository
#[derive(Clone)]
pub struct MongoRegistrationRepository {
    collection: Collection<Registration>,
}

impl MongoRegistrationRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("registrations"),
        }
    }

    pub async fn create_indexes(&self) -> Result<()> {
        let indexes = vec![
            // Storage backstop for the one-registration-per-pair rule
            IndexModel::builder()
                .keys(doc! { "userId": 1, "eventId": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "eventId": 1, "status": 1 })
                .build(),
        ];
        self.collection.create_indexes(indexes).await?;
        Ok(())
    }
}

#[async_trait]
impl RegistrationRepository for MongoRegistrationRepository {
    #[instrument(
        skip(self, registration),
        fields(user_id = %registration.user_id, event_id = %registration.event_id)
    )]
    async fn insert(&self, registration: Registration) -> Result<Registration> {
        match self.collection.insert_one(&registration).await {
            Ok(_) => Ok(registration),
            Err(err) if is_duplicate_key(&err) => Err(RegistrationError::Duplicate(format!(
                "User {} is already registered for event {}",
                registration.user_id, registration.event_id
            ))),
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_user_and_event(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> Result<Option<Registration>> {
        let registration = self
            .collection
            .find_one(doc! { "userId": user_id, "eventId": event_id })
            .await?;
        Ok(registration)
    }

    #[instrument(skip(self))]
    async fn find_active_by_user(&self, user_id: &str) -> Result<Vec<Registration>> {
        let cursor = self
            .collection
            .find(doc! {
                "userId": user_id,
                "status": RegistrationStatus::Active.to_string(),
            })
            .await?;
        let registrations = cursor.try_collect().await?;
        Ok(registrations)
    }

    #[instrument(skip(self))]
    async fn count_active_by_event(&self, event_id: &str) -> Result<u64> {
        let count = self
            .collection
            .count_documents(doc! {
                "eventId": event_id,
                "status": RegistrationStatus::Active.to_string(),
            })
            .await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn delete_by_user_and_event(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> Result<Option<Registration>> {
        let removed = self
            .collection
            .find_one_and_delete(doc! { "userId": user_id, "eventId": event_id })
            .await?;
        Ok(removed)
    }
}

/// MongoDB implementation of WaitlistRepository
#[derive(Clone)]
pub struct MongoWaitlistRepository {
    collection: Collection<WaitlistEntry>,
}

impl MongoWaitlistRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("waitlist_entries"),
        }
    }

    pub async fn create_indexes(&self) -> Result<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "userId": 1, "eventId": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
            // Also serves the ordered pops
            IndexModel::builder()
                .keys(doc! { "eventId": 1, "position": 1 })
                .options(IndexOptions::builder().unique(true).build())
                .build(),
        ];
        self.collection.create_indexes(indexes).await?;
        Ok(())
    }
}

#[async_trait]
impl WaitlistRepository for MongoWaitlistRepository {
    #[instrument(
        skip(self, entry),
        fields(user_id = %entry.user_id, event_id = %entry.event_id, position = entry.position)
    )]
    async fn insert(&self, entry: WaitlistEntry) -> Result<WaitlistEntry> {
        match self.collection.insert_one(&entry).await {
            Ok(_) => Ok(entry),
            Err(err) if is_duplicate_key(&err) => Err(RegistrationError::Duplicate(format!(
                "User {} is already on the waitlist for event {}",
                entry.user_id, entry.event_id
            ))),
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_user_and_event(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> Result<Option<WaitlistEntry>> {
        let entry = self
            .collection
            .find_one(doc! { "userId": user_id, "eventId": event_id })
            .await?;
        Ok(entry)
    }

    #[instrument(skip(self))]
    async fn pop_first_by_event(&self, event_id: &str) -> Result<Option<WaitlistEntry>> {
        let options = FindOneAndDeleteOptions::builder()
            .sort(doc! { "position": 1 })
            .build();
        let head = self
            .collection
            .find_one_and_delete(doc! { "eventId": event_id })
            .with_options(options)
            .await?;
        Ok(head)
    }

    #[instrument(skip(self))]
    async fn remove_by_user_and_event(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> Result<Option<WaitlistEntry>> {
        let removed = self
            .collection
            .find_one_and_delete(doc! { "userId": user_id, "eventId": event_id })
            .await?;
        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn max_position(&self, event_id: &str) -> Result<Option<i64>> {
        let options = FindOneOptions::builder()
            .sort(doc! { "position": -1 })
            .build();
        let last = self
            .collection
            .find_one(doc! { "eventId": event_id })
            .with_options(options)
            .await?;
        Ok(last.map(|entry| entry.position))
    }
}
