//! Registration Domain
//!
//! Users, registration events, and the registration/waitlist state machine
//! backed by MongoDB. Admission near the capacity boundary is decided by an
//! atomic conditional update on the event document, so concurrent
//! registrations can never oversell an event (see [`repository`] and
//! [`mongodb`]).
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_registration::{
//!     EventService, MongoRegistrationEventRepository, MongoRegistrationRepository,
//!     MongoUserRepository, MongoWaitlistRepository, RegistrationService, UserService, handlers,
//! };
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let db = client.database("events");
//!
//! let users = MongoUserRepository::new(&db);
//! let events = MongoRegistrationEventRepository::new(&db);
//! let registrations = MongoRegistrationRepository::new(&db);
//! let waitlist = MongoWaitlistRepository::new(&db);
//!
//! let router = handlers::router(
//!     UserService::new(users.clone()),
//!     EventService::new(events.clone()),
//!     RegistrationService::new(users, events, registrations, waitlist),
//! );
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
pub use error::RegistrationError;
pub use handlers::ApiDoc;
pub use models::{
    CapacityInfo, CreateRegistrationEvent, CreateUser, RegisterRequest, Registration,
    RegistrationEvent, RegistrationResult, RegistrationStatus, UnregisterParams,
    UnregistrationResult, User, WaitlistEntry,
};
pub use mongodb::{
    MongoRegistrationEventRepository, MongoRegistrationRepository, MongoUserRepository,
    MongoWaitlistRepository, init_indexes,
};
pub use repository::{
    InMemoryRegistrationEventRepository, InMemoryRegistrationRepository, InMemoryUserRepository,
    InMemoryWaitlistRepository, RegistrationEventRepository, RegistrationRepository,
    UserRepository, WaitlistRepository,
};
pub use service::{EventService, RegistrationService, UserService};
