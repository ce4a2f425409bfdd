use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AuditEvent, AuditOutcome, IdPath, SharerUserId, ValidatedJson, ValidatedQuery,
    errors::responses::{BadRequestResponse, InternalServerErrorResponse, NotFoundResponse},
    extract_ip_from_headers, extract_user_agent,
};
use std::sync::Arc;
use utoipa::OpenApi;

use super::models::{CreateItemRequest, ItemRequestResponse};
use super::service::ItemRequestService;
use crate::error::ShareItResult;
use crate::pagination::PageParams;

const TAG: &str = "requests";

/// OpenAPI documentation for the request board
#[derive(OpenApi)]
#[openapi(
    paths(create_request, list_own, list_all, get_request),
    components(
        schemas(CreateItemRequest, ItemRequestResponse),
        responses(NotFoundResponse, BadRequestResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = TAG, description = "Requests for items nobody lists yet")
    )
)]
pub struct ApiDoc;

pub fn router(service: ItemRequestService) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_own).post(create_request))
        .route("/all", get(list_all))
        .route("/{id}", get(get_request))
        .with_state(shared_service)
}

/// Post a request for an item
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    params(("X-Sharer-User-Id" = i64, Header, description = "Requestor")),
    request_body = CreateItemRequest,
    responses(
        (status = 201, description = "Request posted", body = ItemRequestResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_request(
    State(service): State<Arc<ItemRequestService>>,
    headers: HeaderMap,
    SharerUserId(user_id): SharerUserId,
    ValidatedJson(input): ValidatedJson<CreateItemRequest>,
) -> ShareItResult<impl IntoResponse> {
    let request = service.create_request(user_id, input).await?;

    AuditEvent::new(
        Some(user_id),
        "request.create",
        Some(format!("request:{}", request.id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    Ok((StatusCode::CREATED, Json(request)))
}

/// The caller's own requests, oldest first
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(("X-Sharer-User-Id" = i64, Header, description = "Requestor")),
    responses(
        (status = 200, description = "Own requests with answering items", body = Vec<ItemRequestResponse>),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn list_own(
    State(service): State<Arc<ItemRequestService>>,
    SharerUserId(user_id): SharerUserId,
) -> ShareItResult<Json<Vec<ItemRequestResponse>>> {
    let requests = service.list_own(user_id).await?;
    Ok(Json(requests))
}

/// Everyone else's requests, oldest first
#[utoipa::path(
    get,
    path = "/all",
    tag = TAG,
    params(("X-Sharer-User-Id" = i64, Header, description = "Caller"), PageParams),
    responses(
        (status = 200, description = "Other users' requests", body = Vec<ItemRequestResponse>),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn list_all(
    State(service): State<Arc<ItemRequestService>>,
    SharerUserId(user_id): SharerUserId,
    ValidatedQuery(page): ValidatedQuery<PageParams>,
) -> ShareItResult<Json<Vec<ItemRequestResponse>>> {
    let requests = service.list_all(user_id, page).await?;
    Ok(Json(requests))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Request ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Caller")
    ),
    responses(
        (status = 200, description = "Request found", body = ItemRequestResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_request(
    State(service): State<Arc<ItemRequestService>>,
    SharerUserId(user_id): SharerUserId,
    IdPath(id): IdPath,
) -> ShareItResult<Json<ItemRequestResponse>> {
    let request = service.get_request(user_id, id).await?;
    Ok(Json(request))
}
