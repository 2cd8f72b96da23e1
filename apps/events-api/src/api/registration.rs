//! Registration and waitlist routes

use axum::Router;
use domain_registration::{
    EventService, MongoRegistrationEventRepository, MongoRegistrationRepository,
    MongoUserRepository, MongoWaitlistRepository, RegistrationService, UserService, handlers,
};

use crate::state::AppState;

/// Create the registration router backed by MongoDB.
///
/// The registration service shares the user and event repositories with the
/// dedicated user/event services, so all three see the same collections.
pub fn router(state: &AppState) -> Router {
    let users = MongoUserRepository::new(&state.db);
    let events = MongoRegistrationEventRepository::new(&state.db);
    let registrations = MongoRegistrationRepository::new(&state.db);
    let waitlist = MongoWaitlistRepository::new(&state.db);

    handlers::router(
        UserService::new(users.clone()),
        EventService::new(events.clone()),
        RegistrationService::new(users, events, registrations, waitlist),
    )
}
