use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Lifecycle status of a catalog event
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
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventStatus {
    /// Not yet announced
    #[default]
    Draft,
    /// Announced and visible
    Published,
    /// Currently running
    Active,
    /// Called off
    Cancelled,
    /// Finished
    Completed,
}

/// Catalog event entity - a plain CRUD document, fully mutable via partial
/// update. The `date` stays a string on purpose: callers send either an ISO
/// datetime or a plain YYYY-MM-DD and get the same value back.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEvent {
    /// Unique identifier (generated when not supplied at creation)
    pub event_id: String,
    /// Event title
    pub title: String,
    /// Event description
    pub description: String,
    /// Event date, ISO datetime or YYYY-MM-DD
    pub date: String,
    /// Event location
    pub location: String,
    /// Maximum number of attendees
    pub capacity: i64,
    /// Organizer name
    pub organizer: String,
    /// Current lifecycle status
    pub status: EventStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a catalog event
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCatalogEvent {
    /// Optional custom event ID (auto-generated if not provided)
    pub event_id: Option<String>,
    #[validate(length(min = 1, max = 200), custom(function = "validate_not_blank"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000), custom(function = "validate_not_blank"))]
    pub description: String,
    #[validate(custom(function = "validate_event_date"))]
    pub date: String,
    #[validate(length(min = 1, max = 500), custom(function = "validate_not_blank"))]
    pub location: String,
    #[validate(range(min = 1, max = 100_000))]
    pub capacity: i64,
    #[validate(length(min = 1, max = 200), custom(function = "validate_not_blank"))]
    pub organizer: String,
    #[serde(default)]
    pub status: EventStatus,
}

/// DTO for partially updating a catalog event.
///
/// All fields are optional; only provided fields are applied.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCatalogEvent {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub date: Option<String>,
    #[validate(length(min = 1, max = 500))]
    pub location: Option<String>,
    #[validate(range(min = 1))]
    pub capacity: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub organizer: Option<String>,
    pub status: Option<EventStatus>,
}

impl UpdateCatalogEvent {
    /// True when no field is set; such a patch is a no-op.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.location.is_none()
            && self.capacity.is_none()
            && self.organizer.is_none()
            && self.status.is_none()
    }
}

/// Query parameters for listing catalog events
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct ListEventsQuery {
    /// Maximum number of events to return (1-100, defaults to 100)
    pub limit: Option<i64>,
    /// Filter events by status
    pub status: Option<EventStatus>,
}

impl CatalogEvent {
    /// Create a new catalog event from the create DTO.
    ///
    /// Uses the supplied event ID when present, otherwise generates one.
    /// String fields are stored trimmed.
    pub fn new(input: CreateCatalogEvent) -> Self {
        let now = Utc::now();
        Self {
            event_id: input
                .event_id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: input.title.trim().to_string(),
            description: input.description.trim().to_string(),
            date: input.date,
            location: input.location.trim().to_string(),
            capacity: input.capacity,
            organizer: input.organizer.trim().to_string(),
            status: input.status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update and bump `updated_at`
    pub fn apply_update(&mut self, update: UpdateCatalogEvent) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(date) = update.date {
            self.date = date;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(capacity) = update.capacity {
            self.capacity = capacity;
        }
        if let Some(organizer) = update.organizer {
            self.organizer = organizer;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
    }
}

fn validate_not_blank(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        let mut error = validator::ValidationError::new("not_blank");
        error.message = Some(std::borrow::Cow::from(
            "Field cannot be empty or contain only whitespace",
        ));
        return Err(error);
    }
    Ok(())
}

/// Accepts an ISO datetime (with or without offset) or a plain date
fn validate_event_date(value: &str) -> Result<(), validator::ValidationError> {
    let is_valid = DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok();

    if is_valid {
        Ok(())
    } else {
        let mut error = validator::ValidationError::new("invalid_date");
        error.message = Some(std::borrow::Cow::from(
            "Date must be in ISO format (YYYY-MM-DDTHH:MM:SS) or simple date format (YYYY-MM-DD)",
        ));
        Err(error)
    }
}
