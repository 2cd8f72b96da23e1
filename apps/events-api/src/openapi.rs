//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation for all APIs
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Events API",
        version = "0.1.0",
        description = "Event management REST API with registration and waitlist handling",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/events", api = domain_catalog::ApiDoc),
        (path = "/api/registration", api = domain_registration::ApiDoc)
    ),
    tags(
        (name = "Events", description = "Event catalog management endpoints"),
        (name = "Registration", description = "User, registration, and waitlist endpoints")
    )
)]
pub struct ApiDoc;
