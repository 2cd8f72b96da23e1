use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, ConflictResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{RegistrationError, Result};
use crate::models::{
    CapacityInfo, CreateRegistrationEvent, CreateUser, RegisterRequest, Registration,
    RegistrationEvent, RegistrationResult, RegistrationStatus, UnregisterParams,
    UnregistrationResult, User, WaitlistEntry,
};
use crate::repository::{
    RegistrationEventRepository, RegistrationRepository, UserRepository, WaitlistRepository,
};
use crate::service::{EventService, RegistrationService, UserService};

/// OpenAPI documentation for the Registration API
#[derive(OpenApi)]
#[openapi(
    paths(
        create_user,
        get_user,
        get_user_events,
        create_event,
        get_event,
        get_event_capacity,
        create_registration,
        delete_registration,
    ),
    components(
        schemas(
            User,
            RegistrationEvent,
            Registration,
            RegistrationStatus,
            WaitlistEntry,
            CreateUser,
            CreateRegistrationEvent,
            RegisterRequest,
            RegistrationResult,
            UnregistrationResult,
            CapacityInfo,
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Registration", description = "Event registration and waitlist management")
    )
)]
pub struct ApiDoc;

/// Create the registration router with all HTTP endpoints
pub fn router<U, E, R, W>(
    users: UserService<U>,
    events: EventService<E>,
    registrations: RegistrationService<U, E, R, W>,
) -> Router
where
    U: UserRepository + 'static,
    E: RegistrationEventRepository + 'static,
    R: RegistrationRepository + 'static,
    W: WaitlistRepository + 'static,
{
    let user_routes = Router::new()
        .route("/users", post(create_user))
        .route("/users/{user_id}", get(get_user))
        .with_state(Arc::new(users));

    let event_routes = Router::new()
        .route("/events", post(create_event))
        .route("/events/{event_id}", get(get_event))
        .route("/events/{event_id}/capacity", get(get_event_capacity))
        .with_state(Arc::new(events));

    let registration_routes = Router::new()
        .route(
            "/registrations",
            post(create_registration).delete(delete_registration),
        )
        .route("/users/{user_id}/events", get(get_user_events))
        .with_state(Arc::new(registrations));

    user_routes.merge(event_routes).merge(registration_routes)
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "Registration",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created successfully", body = User),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<U: UserRepository>(
    State(service): State<Arc<UserService<U>>>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> Result<impl IntoResponse> {
    let user = service.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/users/{user_id}",
    tag = "Registration",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<U: UserRepository>(
    State(service): State<Arc<UserService<U>>>,
    Path(user_id): Path<String>,
) -> Result<Json<User>> {
    let user = service
        .get_user(&user_id)
        .await?
        .ok_or_else(|| RegistrationError::NotFound(format!("User {} not found", user_id)))?;
    Ok(Json(user))
}

/// Create a new registration event
#[utoipa::path(
    post,
    path = "/events",
    tag = "Registration",
    request_body = CreateRegistrationEvent,
    responses(
        (status = 201, description = "Event created successfully", body = RegistrationEvent),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_event<E: RegistrationEventRepository>(
    State(service): State<Arc<EventService<E>>>,
    ValidatedJson(input): ValidatedJson<CreateRegistrationEvent>,
) -> Result<impl IntoResponse> {
    let event = service.create_event(input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Get a registration event by ID
#[utoipa::path(
    get,
    path = "/events/{event_id}",
    tag = "Registration",
    params(
        ("event_id" = String, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event found", body = RegistrationEvent),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_event<E: RegistrationEventRepository>(
    State(service): State<Arc<EventService<E>>>,
    Path(event_id): Path<String>,
) -> Result<Json<RegistrationEvent>> {
    let event = service
        .get_event(&event_id)
        .await?
        .ok_or_else(|| RegistrationError::NotFound(format!("Event {} not found", event_id)))?;
    Ok(Json(event))
}

/// Get the remaining capacity for an event
#[utoipa::path(
    get,
    path = "/events/{event_id}/capacity",
    tag = "Registration",
    params(
        ("event_id" = String, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Capacity information", body = CapacityInfo),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_event_capacity<E: RegistrationEventRepository>(
    State(service): State<Arc<EventService<E>>>,
    Path(event_id): Path<String>,
) -> Result<Json<CapacityInfo>> {
    let event = service
        .get_event(&event_id)
        .await?
        .ok_or_else(|| RegistrationError::NotFound(format!("Event {} not found", event_id)))?;
    let available = service.get_available_capacity(&event_id).await?;

    Ok(Json(CapacityInfo {
        event_id: event.event_id,
        total_capacity: event.capacity,
        available_capacity: available,
    }))
}

/// Register a user for an event
#[utoipa::path(
    post,
    path = "/registrations",
    tag = "Registration",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered or waitlisted", body = RegistrationResult),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_registration<U, E, R, W>(
    State(service): State<Arc<RegistrationService<U, E, R, W>>>,
    ValidatedJson(input): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse>
where
    U: UserRepository,
    E: RegistrationEventRepository,
    R: RegistrationRepository,
    W: WaitlistRepository,
{
    let result = service.register(&input.user_id, &input.event_id).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// Unregister a user from an event
#[utoipa::path(
    delete,
    path = "/registrations",
    tag = "Registration",
    params(UnregisterParams),
    responses(
        (status = 200, description = "Unregistered", body = UnregistrationResult),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_registration<U, E, R, W>(
    State(service): State<Arc<RegistrationService<U, E, R, W>>>,
    Query(params): Query<UnregisterParams>,
) -> Result<Json<UnregistrationResult>>
where
    U: UserRepository,
    E: RegistrationEventRepository,
    R: RegistrationRepository,
    W: WaitlistRepository,
{
    let result = service.unregister(&params.user_id, &params.event_id).await?;
    Ok(Json(result))
}

/// List the events a user is actively registered for
#[utoipa::path(
    get,
    path = "/users/{user_id}/events",
    tag = "Registration",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Events the user is registered for", body = Vec<RegistrationEvent>),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user_events<U, E, R, W>(
    State(service): State<Arc<RegistrationService<U, E, R, W>>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<RegistrationEvent>>>
where
    U: UserRepository,
    E: RegistrationEventRepository,
    R: RegistrationRepository,
    W: WaitlistRepository,
{
    let events = service.get_user_registrations(&user_id).await?;
    Ok(Json(events))
}
