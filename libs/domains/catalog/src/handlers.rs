use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
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

use crate::error::CatalogResult;
use crate::models::{
    CatalogEvent, CreateCatalogEvent, EventStatus, ListEventsQuery, UpdateCatalogEvent,
};
use crate::repository::CatalogEventRepository;
use crate::service::CatalogService;

/// OpenAPI documentation for the Events API
#[derive(OpenApi)]
#[openapi(
    paths(list_events, create_event, get_event, update_event, delete_event),
    components(
        schemas(
            CatalogEvent,
            CreateCatalogEvent,
            UpdateCatalogEvent,
            EventStatus,
            ListEventsQuery,
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Events", description = "Event catalog management endpoints")
    )
)]
pub struct ApiDoc;

/// Create the catalog router with all HTTP endpoints
pub fn router<R: CatalogEventRepository + 'static>(service: CatalogService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_events).post(create_event))
        .route(
            "/{event_id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .with_state(shared_service)
}

/// List events with an optional limit and status filter
#[utoipa::path(
    get,
    path = "",
    tag = "Events",
    params(ListEventsQuery),
    responses(
        (status = 200, description = "List of events", body = Vec<CatalogEvent>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_events<R: CatalogEventRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Query(query): Query<ListEventsQuery>,
) -> CatalogResult<Json<Vec<CatalogEvent>>> {
    let events = service.list_events(query).await?;
    Ok(Json(events))
}

/// Create a new event
#[utoipa::path(
    post,
    path = "",
    tag = "Events",
    request_body = CreateCatalogEvent,
    responses(
        (status = 201, description = "Event created successfully", body = CatalogEvent),
        (status = 400, response = BadRequestValidationResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_event<R: CatalogEventRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateCatalogEvent>,
) -> CatalogResult<impl IntoResponse> {
    let event = service.create_event(input).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// Get an event by ID
#[utoipa::path(
    get,
    path = "/{event_id}",
    tag = "Events",
    params(
        ("event_id" = String, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event found", body = CatalogEvent),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_event<R: CatalogEventRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(event_id): Path<String>,
) -> CatalogResult<Json<CatalogEvent>> {
    let event = service.get_event(&event_id).await?;
    Ok(Json(event))
}

/// Partially update an event; only provided fields are applied
#[utoipa::path(
    put,
    path = "/{event_id}",
    tag = "Events",
    params(
        ("event_id" = String, Path, description = "Event ID")
    ),
    request_body = UpdateCatalogEvent,
    responses(
        (status = 200, description = "Event updated successfully", body = CatalogEvent),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_event<R: CatalogEventRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(event_id): Path<String>,
    ValidatedJson(patch): ValidatedJson<UpdateCatalogEvent>,
) -> CatalogResult<Json<CatalogEvent>> {
    let event = service.update_event(&event_id, patch).await?;
    Ok(Json(event))
}

/// Delete an event
#[utoipa::path(
    delete,
    path = "/{event_id}",
    tag = "Events",
    params(
        ("event_id" = String, Path, description = "Event ID")
    ),
    responses(
        (status = 204, description = "Event deleted successfully"),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_event<R: CatalogEventRepository>(
    State(service): State<Arc<CatalogService<R>>>,
    Path(event_id): Path<String>,
) -> CatalogResult<impl IntoResponse> {
    service.delete_event(&event_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
