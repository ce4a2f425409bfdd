use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse, axum_helpers::HealthResponse)
    ),
    info(
        title = "ShareIt API",
        version = "0.1.0",
        description = "Peer-to-peer item rental: users, items, bookings, item requests and comments"
    ),
    nest(
        (path = "/users", api = domain_shareit::users::handlers::ApiDoc),
        (path = "/items", api = domain_shareit::items::handlers::ApiDoc),
        (path = "/bookings", api = domain_shareit::bookings::handlers::ApiDoc),
        (path = "/requests", api = domain_shareit::requests::handlers::ApiDoc)
    )
)]
pub struct ApiDoc;
