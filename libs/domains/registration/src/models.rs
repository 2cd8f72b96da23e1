use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Registration status
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    /// Holds a confirmed, capacity-counted seat
    Active,
    /// Waiting for a seat to free up
    Waitlisted,
}

/// A user who can register for events
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Externally supplied unique identifier
    pub user_id: String,
    /// Display name
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}

/// An event users register for.
///
/// The stored document additionally carries two engine-internal counters
/// (`activeCount`, `waitlistSeq`) that never appear on the wire; see the
/// repository layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationEvent {
    /// Unique identifier (generated when not supplied at creation)
    pub event_id: String,
    /// Event name
    pub name: String,
    /// Maximum number of active registrations
    pub capacity: i64,
    /// Whether a waitlist opens once the event is full
    pub has_waitlist: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl RegistrationEvent {
    pub fn new(
        event_id: impl Into<String>,
        name: impl Into<String>,
        capacity: i64,
        has_waitlist: bool,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            name: name.into(),
            capacity,
            has_waitlist,
            created_at: Utc::now(),
        }
    }
}

/// A user's registration for an event
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Unique identifier
    pub registration_id: String,
    pub user_id: String,
    pub event_id: String,
    pub status: RegistrationStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Registration {
    pub fn new(
        user_id: impl Into<String>,
        event_id: impl Into<String>,
        status: RegistrationStatus,
    ) -> Self {
        Self {
            registration_id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            event_id: event_id.into(),
            status,
            created_at: Utc::now(),
        }
    }
}

/// A position-ordered waitlist entry for a full event
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    /// Unique identifier
    pub entry_id: String,
    pub user_id: String,
    pub event_id: String,
    /// Strictly increasing per event; gaps are expected and harmless
    pub position: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl WaitlistEntry {
    pub fn new(user_id: impl Into<String>, event_id: impl Into<String>, position: i64) -> Self {
        Self {
            entry_id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            event_id: event_id.into(),
            position,
            created_at: Utc::now(),
        }
    }
}

/// DTO for creating a new user
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(length(min = 1, max = 100))]
    pub user_id: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

/// DTO for creating a new registration event.
///
/// `title` and `waitlistEnabled` are accepted as aliases for `name` and
/// `hasWaitlist`; the aliases are resolved here, before the values reach the
/// core models.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRegistrationEvent {
    /// Optional client-supplied identifier; generated when absent
    pub event_id: Option<String>,
    #[validate(length(max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(range(min = 1, max = 100_000))]
    pub capacity: i64,
    pub has_waitlist: Option<bool>,
    pub waitlist_enabled: Option<bool>,
}

impl CreateRegistrationEvent {
    /// Resolved event name; `title` wins over `name` when both are provided.
    pub fn event_name(&self) -> Option<&str> {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .or(self.name.as_deref())
    }

    /// Resolved waitlist flag; `waitlistEnabled` wins over `hasWaitlist`.
    pub fn waitlist(&self) -> bool {
        self.waitlist_enabled.or(self.has_waitlist).unwrap_or(false)
    }
}

/// DTO for registering a user for an event
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1))]
    pub user_id: String,
    #[validate(length(min = 1))]
    pub event_id: String,
}

/// Query parameters identifying the registration to remove
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UnregisterParams {
    pub user_id: String,
    pub event_id: String,
}

/// Outcome of a register call: either an active registration or a waitlist
/// placement, never both
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResult {
    pub success: bool,
    pub message: String,
    pub registration: Option<Registration>,
    pub waitlist_entry: Option<WaitlistEntry>,
}

/// Outcome of an unregister call, including any promotion it triggered
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnregistrationResult {
    pub success: bool,
    pub message: String,
    /// Registration created for the promoted waitlist head, if any
    pub promoted: Option<Registration>,
}

/// Remaining capacity for an event
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CapacityInfo {
    pub event_id: String,
    pub total_capacity: i64,
    pub available_capacity: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_wins_over_name() {
        let input = CreateRegistrationEvent {
            name: Some("plain name".to_string()),
            title: Some("fancy title".to_string()),
            capacity: 10,
            ..Default::default()
        };
        assert_eq!(input.event_name(), Some("fancy title"));
    }

    #[test]
    fn test_empty_title_falls_back_to_name() {
        let input = CreateRegistrationEvent {
            name: Some("plain name".to_string()),
            title: Some(String::new()),
            capacity: 10,
            ..Default::default()
        };
        assert_eq!(input.event_name(), Some("plain name"));
    }

    #[test]
    fn test_waitlist_enabled_wins_over_has_waitlist() {
        let input = CreateRegistrationEvent {
            capacity: 10,
            has_waitlist: Some(false),
            waitlist_enabled: Some(true),
            ..Default::default()
        };
        assert!(input.waitlist());

        let input = CreateRegistrationEvent {
            capacity: 10,
            ..Default::default()
        };
        assert!(!input.waitlist());
    }

    #[test]
    fn test_status_serializes_screaming() {
        let json = serde_json::to_string(&RegistrationStatus::Active).unwrap();
        assert_eq!(json, "\"ACTIVE\"");
        assert_eq!(RegistrationStatus::Waitlisted.to_string(), "WAITLISTED");
    }

    #[test]
    fn test_wire_fields_are_camel_case() {
        let user = User::new("u1", "Alice");
        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("userId").is_some());
        assert!(value.get("createdAt").is_some());

        let event = RegistrationEvent::new("e1", "RustConf", 2, true);
        let value = serde_json::to_value(&event).unwrap();
        assert!(value.get("eventId").is_some());
        assert!(value.get("hasWaitlist").is_some());
        // Seat accounting stays out of the wire model
        assert!(value.get("activeCount").is_none());
    }
}
