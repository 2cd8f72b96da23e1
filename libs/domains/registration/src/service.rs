//! Registration business logic.
//!
//! Three services share the repository layer: [`UserService`] and
//! [`EventService`] cover the simple records, [`RegistrationService`] owns the
//! pair state machine (NONE → ACTIVE, NONE → WAITLISTED, ACTIVE → NONE with
//! possible promotion, WAITLISTED → NONE, nothing else).

use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{RegistrationError, Result};
use crate::models::{
    CreateRegistrationEvent, CreateUser, Registration, RegistrationEvent, RegistrationResult,
    RegistrationStatus, UnregistrationResult, User, WaitlistEntry,
};
use crate::repository::{
    RegistrationEventRepository, RegistrationRepository, UserRepository, WaitlistRepository,
};

/// User management operations
pub struct UserService<U: UserRepository> {
    repository: Arc<U>,
}

impl<U: UserRepository> UserService<U> {
    pub fn new(repository: U) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new user with an externally supplied ID
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn create_user(&self, input: CreateUser) -> Result<User> {
        let user_id = input.user_id.trim();
        if user_id.is_empty() {
            return Err(RegistrationError::Validation(
                "UserId cannot be empty".to_string(),
            ));
        }
        let name = input.name.trim();
        if name.is_empty() {
            return Err(RegistrationError::Validation(
                "Name cannot be empty".to_string(),
            ));
        }

        if self.repository.find_by_id(user_id).await?.is_some() {
            return Err(RegistrationError::Duplicate(format!(
                "User with ID {} already exists",
                user_id
            )));
        }

        self.repository.insert(User::new(user_id, name)).await
    }

    /// Get a user by ID; absence is a value, not an error
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        self.repository.find_by_id(user_id).await
    }
}

impl<U: UserRepository> Clone for UserService<U> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

/// Registration-side event operations
pub struct EventService<E: RegistrationEventRepository> {
    repository: Arc<E>,
}

impl<E: RegistrationEventRepository> EventService<E> {
    pub fn new(repository: E) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new event, generating an eventId when none is supplied
    #[instrument(skip(self, input))]
    pub async fn create_event(&self, input: CreateRegistrationEvent) -> Result<RegistrationEvent> {
        let name = input.event_name().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(RegistrationError::Validation(
                "Event name cannot be empty".to_string(),
            ));
        }
        if input.capacity <= 0 {
            return Err(RegistrationError::Validation(
                "Capacity must be a positive integer".to_string(),
            ));
        }

        let event_id = input
            .event_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let event = RegistrationEvent::new(event_id, name, input.capacity, input.waitlist());
        self.repository.insert(event).await
    }

    /// Get an event by ID; absence is a value, not an error
    #[instrument(skip(self))]
    pub async fn get_event(&self, event_id: &str) -> Result<Option<RegistrationEvent>> {
        self.repository.find_by_id(event_id).await
    }

    /// Remaining capacity: `capacity - activeCount`.
    ///
    /// A negative value means the capacity invariant was breached; it is
    /// logged and surfaced as-is rather than clamped, so the breach stays
    /// visible.
    #[instrument(skip(self))]
    pub async fn get_available_capacity(&self, event_id: &str) -> Result<i64> {
        let event = self.repository.find_by_id(event_id).await?.ok_or_else(|| {
            RegistrationError::NotFound(format!("Event {} not found", event_id))
        })?;
        let active = self.repository.active_count(event_id).await?.unwrap_or(0);

        let available = event.capacity - active;
        if available < 0 {
            tracing::error!(
                event_id,
                active,
                capacity = event.capacity,
                "active registrations exceed capacity"
            );
        }
        Ok(available)
    }
}

impl<E: RegistrationEventRepository> Clone for EventService<E> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

/// The registration state machine
pub struct RegistrationService<U, E, R, W>
where
    U: UserRepository,
    E: RegistrationEventRepository,
    R: RegistrationRepository,
    W: WaitlistRepository,
{
    users: Arc<U>,
    events: Arc<E>,
    registrations: Arc<R>,
    waitlist: Arc<W>,
}

impl<U, E, R, W> RegistrationService<U, E, R, W>
where
    U: UserRepository,
    E: RegistrationEventRepository,
    R: RegistrationRepository,
    W: WaitlistRepository,
{
    pub fn new(users: U, events: E, registrations: R, waitlist: W) -> Self {
        Self {
            users: Arc::new(users),
            events: Arc::new(events),
            registrations: Arc::new(registrations),
            waitlist: Arc::new(waitlist),
        }
    }

    /// Register a user for an event: an active seat when one is free, a
    /// waitlist placement when the event is full and waitlisting is enabled.
    #[instrument(skip(self))]
    pub async fn register(&self, user_id: &str, event_id: &str) -> Result<RegistrationResult> {
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(RegistrationError::NotFound(format!(
                "User {} not found",
                user_id
            )));
        }
        let event = self.events.find_by_id(event_id).await?.ok_or_else(|| {
            RegistrationError::NotFound(format!("Event {} not found", event_id))
        })?;

        if self.is_user_registered(user_id, event_id).await? {
            return Err(RegistrationError::Duplicate(format!(
                "User {} is already registered for event {}",
                user_id, event_id
            )));
        }
        if self.is_user_waitlisted(user_id, event_id).await? {
            return Err(RegistrationError::Duplicate(format!(
                "User {} is already on the waitlist for event {}",
                user_id, event_id
            )));
        }

        // Admission: one conditional update decides active vs waitlisted
        if self.events.claim_seat(event_id, event.capacity).await? {
            let registration = Registration::new(user_id, event_id, RegistrationStatus::Active);
            let registration = match self.registrations.insert(registration).await {
                Ok(registration) => registration,
                Err(err) => {
                    // Give the claimed seat back before surfacing the failure
                    if let Err(release_err) = self.events.release_seat(event_id).await {
                        tracing::error!(
                            user_id,
                            event_id,
                            error = %release_err,
                            "failed to release seat after registration insert error"
                        );
                    }
                    return Err(err);
                }
            };
            info!(user_id, event_id, "registration confirmed");
            return Ok(RegistrationResult {
                success: true,
                message: "Successfully registered for event".to_string(),
                registration: Some(registration),
                waitlist_entry: None,
            });
        }

        if !event.has_waitlist {
            return Err(RegistrationError::Capacity(format!(
                "Event {} is full and has no waitlist",
                event_id
            )));
        }

        let position = self.events.next_waitlist_position(event_id).await?;
        let entry = self
            .waitlist
            .insert(WaitlistEntry::new(user_id, event_id, position))
            .await?;
        info!(user_id, event_id, position, "user waitlisted");
        Ok(RegistrationResult {
            success: true,
            message: format!("Event is full. Added to waitlist at position {}", position),
            registration: None,
            waitlist_entry: Some(entry),
        })
    }

    /// Remove a user's active registration (promoting the waitlist head into
    /// the freed seat) or waitlist entry.
    #[instrument(skip(self))]
    pub async fn unregister(&self, user_id: &str, event_id: &str) -> Result<UnregistrationResult> {
        let active = self
            .registrations
            .find_by_user_and_event(user_id, event_id)
            .await?
            .filter(|registration| registration.status == RegistrationStatus::Active);

        if active.is_some() {
            self.registrations
                .delete_by_user_and_event(user_id, event_id)
                .await?;
            let promoted = self.promote_or_release(event_id).await?;
            info!(user_id, event_id, promoted = promoted.is_some(), "unregistered");
            return Ok(UnregistrationResult {
                success: true,
                message: "Successfully unregistered from event".to_string(),
                promoted,
            });
        }

        if self
            .waitlist
            .remove_by_user_and_event(user_id, event_id)
            .await?
            .is_some()
        {
            info!(user_id, event_id, "left waitlist");
            return Ok(UnregistrationResult {
                success: true,
                message: "Successfully removed from waitlist".to_string(),
                promoted: None,
            });
        }

        Err(RegistrationError::NotFound(format!(
            "User {} is not registered for event {}",
            user_id, event_id
        )))
    }

    /// Hand the freed seat to the waitlist head, or release it when no one
    /// is waiting.
    async fn promote_or_release(&self, event_id: &str) -> Result<Option<Registration>> {
        // Refetched after the delete: if the event vanished meanwhile there is
        // no counter left to maintain.
        let Some(event) = self.events.find_by_id(event_id).await? else {
            return Ok(None);
        };

        if event.has_waitlist {
            if let Some(head) = self.waitlist.pop_first_by_event(event_id).await? {
                // The seat transfers to the promoted user; the claimed count
                // stays untouched.
                let registration = self
                    .registrations
                    .insert(Registration::new(
                        head.user_id.as_str(),
                        event_id,
                        RegistrationStatus::Active,
                    ))
                    .await?;
                info!(
                    user_id = %registration.user_id,
                    event_id,
                    position = head.position,
                    "promoted from waitlist"
                );
                return Ok(Some(registration));
            }
        }

        self.events.release_seat(event_id).await?;
        Ok(None)
    }

    /// Events the user holds an ACTIVE registration for. Registrations whose
    /// event no longer resolves are skipped rather than failing the listing.
    #[instrument(skip(self))]
    pub async fn get_user_registrations(&self, user_id: &str) -> Result<Vec<RegistrationEvent>> {
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(RegistrationError::NotFound(format!(
                "User {} not found",
                user_id
            )));
        }

        let registrations = self.registrations.find_active_by_user(user_id).await?;
        let mut events = Vec::with_capacity(registrations.len());
        for registration in registrations {
            match self.events.find_by_id(&registration.event_id).await? {
                Some(event) => events.push(event),
                None => tracing::debug!(
                    user_id,
                    event_id = %registration.event_id,
                    "skipping registration for missing event"
                ),
            }
        }
        Ok(events)
    }

    /// Whether the pair holds an ACTIVE registration
    pub async fn is_user_registered(&self, user_id: &str, event_id: &str) -> Result<bool> {
        let registration = self
            .registrations
            .find_by_user_and_event(user_id, event_id)
            .await?;
        Ok(registration.is_some_and(|r| r.status == RegistrationStatus::Active))
    }

    /// Whether the pair holds a waitlist entry
    pub async fn is_user_waitlisted(&self, user_id: &str, event_id: &str) -> Result<bool> {
        let entry = self
            .waitlist
            .find_by_user_and_event(user_id, event_id)
            .await?;
        Ok(entry.is_some())
    }
}

impl<U, E, R, W> Clone for RegistrationService<U, E, R, W>
where
    U: UserRepository,
    E: RegistrationEventRepository,
    R: RegistrationRepository,
    W: WaitlistRepository,
{
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            events: Arc::clone(&self.events),
            registrations: Arc::clone(&self.registrations),
            waitlist: Arc::clone(&self.waitlist),
        }
    }
}
