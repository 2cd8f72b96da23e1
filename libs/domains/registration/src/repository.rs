use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{RegistrationError, Result};
use crate::models::{Registration, RegistrationEvent, RegistrationStatus, User, WaitlistEntry};

/// Repository trait for User persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; DuplicateError when the userId is already taken
    async fn insert(&self, user: User) -> Result<User>;

    /// Get a user by ID
    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>>;
}

/// Repository trait for RegistrationEvent persistence and seat accounting.
///
/// Admission is decided entirely by `claim_seat`: one conditional update per
/// call, so concurrent registrations can never admit more users than the
/// event's capacity.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationEventRepository: Send + Sync {
    /// Insert a new event with both counters at zero; DuplicateError when the
    /// eventId is already taken
    async fn insert(&self, event: RegistrationEvent) -> Result<RegistrationEvent>;

    /// Get an event by ID
    async fn find_by_id(&self, event_id: &str) -> Result<Option<RegistrationEvent>>;

    /// Atomically claim one seat while the active count is below `capacity`.
    /// Returns false when the event is full or absent.
    async fn claim_seat(&self, event_id: &str, capacity: i64) -> Result<bool>;

    /// Atomically release one seat; guarded so the count never goes negative
    async fn release_seat(&self, event_id: &str) -> Result<()>;

    /// Atomically advance the event's waitlist sequence and return the new
    /// value. Positions are strictly increasing and never reused.
    async fn next_waitlist_position(&self, event_id: &str) -> Result<i64>;

    /// Number of currently claimed seats; None when the event is absent
    async fn active_count(&self, event_id: &str) -> Result<Option<i64>>;
}

/// Repository trait for Registration persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Insert a new registration; DuplicateError when the (userId, eventId)
    /// pair already has one
    async fn insert(&self, registration: Registration) -> Result<Registration>;

    /// Get the pair's registration, if any
    async fn find_by_user_and_event(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> Result<Option<Registration>>;

    /// All ACTIVE registrations held by a user
    async fn find_active_by_user(&self, user_id: &str) -> Result<Vec<Registration>>;

    /// Number of ACTIVE registrations for an event
    async fn count_active_by_event(&self, event_id: &str) -> Result<u64>;

    /// Delete the pair's registration, returning the removed row if it existed
    async fn delete_by_user_and_event(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> Result<Option<Registration>>;
}

/// Repository trait for WaitlistEntry persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WaitlistRepository: Send + Sync {
    /// Insert a new entry; DuplicateError when the pair is already waitlisted
    async fn insert(&self, entry: WaitlistEntry) -> Result<WaitlistEntry>;

    /// Get the pair's entry, if any
    async fn find_by_user_and_event(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> Result<Option<WaitlistEntry>>;

    /// Atomically remove and return the minimum-position entry for the event
    async fn pop_first_by_event(&self, event_id: &str) -> Result<Option<WaitlistEntry>>;

    /// Remove the pair's entry, returning it if it existed
    async fn remove_by_user_and_event(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> Result<Option<WaitlistEntry>>;

    /// Highest position among the event's remaining entries (diagnostics)
    async fn max_position(&self, event_id: &str) -> Result<Option<i64>>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: User) -> Result<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.user_id) {
            return Err(RegistrationError::Duplicate(format!(
                "User with ID {} already exists",
                user.user_id
            )));
        }
        users.insert(user.user_id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }
}

/// Event record plus the seat accounting that backs the atomic operations
#[derive(Debug, Clone)]
struct EventSlot {
    event: RegistrationEvent,
    active_count: i64,
    waitlist_seq: i64,
}

/// In-memory implementation of RegistrationEventRepository.
///
/// The write lock makes claim/release/next-position atomic, mirroring the
/// conditional single-document updates of the MongoDB implementation.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRegistrationEventRepository {
    events: Arc<RwLock<HashMap<String, EventSlot>>>,
}

impl InMemoryRegistrationEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegistrationEventRepository for InMemoryRegistrationEventRepository {
    async fn insert(&self, event: RegistrationEvent) -> Result<RegistrationEvent> {
        let mut events = self.events.write().await;
        if events.contains_key(&event.event_id) {
            return Err(RegistrationError::Duplicate(format!(
                "Event with ID {} already exists",
                event.event_id
            )));
        }
        events.insert(
            event.event_id.clone(),
            EventSlot {
                event: event.clone(),
                active_count: 0,
                waitlist_seq: 0,
            },
        );
        Ok(event)
    }

    async fn find_by_id(&self, event_id: &str) -> Result<Option<RegistrationEvent>> {
        let events = self.events.read().await;
        Ok(events.get(event_id).map(|slot| slot.event.clone()))
    }

    async fn claim_seat(&self, event_id: &str, capacity: i64) -> Result<bool> {
        let mut events = self.events.write().await;
        match events.get_mut(event_id) {
            Some(slot) if slot.active_count < capacity => {
                slot.active_count += 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_seat(&self, event_id: &str) -> Result<()> {
        let mut events = self.events.write().await;
        if let Some(slot) = events.get_mut(event_id) {
            if slot.active_count > 0 {
                slot.active_count -= 1;
            }
        }
        Ok(())
    }

    async fn next_waitlist_position(&self, event_id: &str) -> Result<i64> {
        let mut events = self.events.write().await;
        let slot = events.get_mut(event_id).ok_or_else(|| {
            RegistrationError::NotFound(format!("Event {} not found", event_id))
        })?;
        slot.waitlist_seq += 1;
        Ok(slot.waitlist_seq)
    }

    async fn active_count(&self, event_id: &str) -> Result<Option<i64>> {
        let events = self.events.read().await;
        Ok(events.get(event_id).map(|slot| slot.active_count))
    }
}

/// In-memory implementation of RegistrationRepository, keyed by (userId, eventId)
#[derive(Debug, Default, Clone)]
pub struct InMemoryRegistrationRepository {
    registrations: Arc<RwLock<HashMap<(String, String), Registration>>>,
}

impl InMemoryRegistrationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RegistrationRepository for InMemoryRegistrationRepository {
    async fn insert(&self, registration: Registration) -> Result<Registration> {
        let key = (registration.user_id.clone(), registration.event_id.clone());
        let mut registrations = self.registrations.write().await;
        if registrations.contains_key(&key) {
            return Err(RegistrationError::Duplicate(format!(
                "User {} is already registered for event {}",
                registration.user_id, registration.event_id
            )));
        }
        registrations.insert(key, registration.clone());
        Ok(registration)
    }

    async fn find_by_user_and_event(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> Result<Option<Registration>> {
        let registrations = self.registrations.read().await;
        Ok(registrations
            .get(&(user_id.to_string(), event_id.to_string()))
            .cloned())
    }

    async fn find_active_by_user(&self, user_id: &str) -> Result<Vec<Registration>> {
        let registrations = self.registrations.read().await;
        Ok(registrations
            .values()
            .filter(|r| r.user_id == user_id && r.status == RegistrationStatus::Active)
            .cloned()
            .collect())
    }

    async fn count_active_by_event(&self, event_id: &str) -> Result<u64> {
        let registrations = self.registrations.read().await;
        let count = registrations
            .values()
            .filter(|r| r.event_id == event_id && r.status == RegistrationStatus::Active)
            .count();
        Ok(count as u64)
    }

    async fn delete_by_user_and_event(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> Result<Option<Registration>> {
        let mut registrations = self.registrations.write().await;
        Ok(registrations.remove(&(user_id.to_string(), event_id.to_string())))
    }
}

/// In-memory implementation of WaitlistRepository, keyed by (userId, eventId)
#[derive(Debug, Default, Clone)]
pub struct InMemoryWaitlistRepository {
    entries: Arc<RwLock<HashMap<(String, String), WaitlistEntry>>>,
}

impl InMemoryWaitlistRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WaitlistRepository for InMemoryWaitlistRepository {
    async fn insert(&self, entry: WaitlistEntry) -> Result<WaitlistEntry> {
        let key = (entry.user_id.clone(), entry.event_id.clone());
        let mut entries = self.entries.write().await;
        if entries.contains_key(&key) {
            return Err(RegistrationError::Duplicate(format!(
                "User {} is already on the waitlist for event {}",
                entry.user_id, entry.event_id
            )));
        }
        entries.insert(key, entry.clone());
        Ok(entry)
    }

    async fn find_by_user_and_event(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> Result<Option<WaitlistEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&(user_id.to_string(), event_id.to_string()))
            .cloned())
    }

    async fn pop_first_by_event(&self, event_id: &str) -> Result<Option<WaitlistEntry>> {
        let mut entries = self.entries.write().await;
        let head = entries
            .iter()
            .filter(|(_, entry)| entry.event_id == event_id)
            .min_by_key(|(_, entry)| entry.position)
            .map(|(key, _)| key.clone());
        Ok(head.and_then(|key| entries.remove(&key)))
    }

    async fn remove_by_user_and_event(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> Result<Option<WaitlistEntry>> {
        let mut entries = self.entries.write().await;
        Ok(entries.remove(&(user_id.to_string(), event_id.to_string())))
    }

    async fn max_position(&self, event_id: &str) -> Result<Option<i64>> {
        let entries = self.entries.read().await;
        Ok(entries
            .values()
            .filter(|entry| entry.event_id == event_id)
            .map(|entry| entry.position)
            .max())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_claim_seat_stops_at_capacity() {
        let repo = InMemoryRegistrationEventRepository::new();
        repo.insert(RegistrationEvent::new("e1", "RustConf", 2, false))
            .await
            .unwrap();

        assert!(repo.claim_seat("e1", 2).await.unwrap());
        assert!(repo.claim_seat("e1", 2).await.unwrap());
        assert!(!repo.claim_seat("e1", 2).await.unwrap());
        assert_eq!(repo.active_count("e1").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_claim_seat_on_missing_event_is_not_an_error() {
        let repo = InMemoryRegistrationEventRepository::new();
        assert!(!repo.claim_seat("ghost", 5).await.unwrap());
    }

    #[tokio::test]
    async fn test_release_seat_never_goes_negative() {
        let repo = InMemoryRegistrationEventRepository::new();
        repo.insert(RegistrationEvent::new("e1", "RustConf", 2, false))
            .await
            .unwrap();

        repo.release_seat("e1").await.unwrap();
        assert_eq!(repo.active_count("e1").await.unwrap(), Some(0));

        assert!(repo.claim_seat("e1", 2).await.unwrap());
        repo.release_seat("e1").await.unwrap();
        repo.release_seat("e1").await.unwrap();
        assert_eq!(repo.active_count("e1").await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_next_waitlist_position_strictly_increases() {
        let repo = InMemoryRegistrationEventRepository::new();
        repo.insert(RegistrationEvent::new("e1", "RustConf", 1, true))
            .await
            .unwrap();

        assert_eq!(repo.next_waitlist_position("e1").await.unwrap(), 1);
        assert_eq!(repo.next_waitlist_position("e1").await.unwrap(), 2);
        assert_eq!(repo.next_waitlist_position("e1").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_user_insert_rejected() {
        let repo = InMemoryUserRepository::new();
        repo.insert(User::new("u1", "Alice")).await.unwrap();

        let result = repo.insert(User::new("u1", "Imposter")).await;
        assert!(matches!(result, Err(RegistrationError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_pop_first_returns_minimum_position() {
        let repo = InMemoryWaitlistRepository::new();
        repo.insert(WaitlistEntry::new("u3", "e1", 3)).await.unwrap();
        repo.insert(WaitlistEntry::new("u1", "e1", 1)).await.unwrap();
        repo.insert(WaitlistEntry::new("u2", "e1", 2)).await.unwrap();

        let head = repo.pop_first_by_event("e1").await.unwrap().unwrap();
        assert_eq!(head.user_id, "u1");

        // Gaps left by removals do not disturb the ordering
        repo.remove_by_user_and_event("u2", "e1").await.unwrap();
        let head = repo.pop_first_by_event("e1").await.unwrap().unwrap();
        assert_eq!(head.user_id, "u3");

        assert!(repo.pop_first_by_event("e1").await.unwrap().is_none());
        assert_eq!(repo.max_position("e1").await.unwrap(), None);
    }
}
