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
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use super::models::{
    ApprovalParams, BookingResponse, BookingShort, BookingState, BookingStatus, CreateBooking,
    StateParams,
};
use super::service::BookingService;
use crate::error::ShareItResult;
use crate::pagination::PageParams;

const TAG: &str = "bookings";

/// OpenAPI documentation for bookings
#[derive(OpenApi)]
#[openapi(
    paths(create_booking, respond, get_booking, list_own, list_owner),
    components(
        schemas(BookingResponse, BookingShort, BookingStatus, CreateBooking),
        responses(NotFoundResponse, BadRequestResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = TAG, description = "Booking lifecycle: request, approve or reject, list by state")
    )
)]
pub struct ApiDoc;

pub fn router(service: BookingService) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_own).post(create_booking))
        .route("/owner", get(list_owner))
        .route("/{id}", get(get_booking).patch(respond))
        .with_state(shared_service)
}

/// Request a booking
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    params(("X-Sharer-User-Id" = i64, Header, description = "Booker")),
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Booking created and waiting for the owner", body = BookingResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_booking(
    State(service): State<Arc<BookingService>>,
    headers: HeaderMap,
    SharerUserId(user_id): SharerUserId,
    ValidatedJson(input): ValidatedJson<CreateBooking>,
) -> ShareItResult<impl IntoResponse> {
    let booking = service.create_booking(user_id, input).await?;

    AuditEvent::new(
        Some(user_id),
        "booking.create",
        Some(format!("booking:{}", booking.id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .with_details(json!({ "item_id": booking.item.id }))
    .log();

    Ok((StatusCode::CREATED, Json(booking)))
}

/// Approve or reject a waiting booking
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Booking ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Owner of the booked item"),
        ApprovalParams
    ),
    responses(
        (status = 200, description = "Decision recorded", body = BookingResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn respond(
    State(service): State<Arc<BookingService>>,
    headers: HeaderMap,
    SharerUserId(user_id): SharerUserId,
    IdPath(id): IdPath,
    ValidatedQuery(params): ValidatedQuery<ApprovalParams>,
) -> ShareItResult<Json<BookingResponse>> {
    let booking = service.respond(user_id, id, params.approved).await?;

    AuditEvent::new(
        Some(user_id),
        if params.approved {
            "booking.approve"
        } else {
            "booking.reject"
        },
        Some(format!("booking:{}", id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .with_details(json!({ "status": booking.status }))
    .log();

    Ok(Json(booking))
}

/// Get a booking as its booker or the item owner
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Booking ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Booker or item owner")
    ),
    responses(
        (status = 200, description = "Booking found", body = BookingResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_booking(
    State(service): State<Arc<BookingService>>,
    SharerUserId(user_id): SharerUserId,
    IdPath(id): IdPath,
) -> ShareItResult<Json<BookingResponse>> {
    let booking = service.get_booking(user_id, id).await?;
    Ok(Json(booking))
}

/// List the caller's own bookings, newest start first
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Booker"),
        StateParams,
        PageParams
    ),
    responses(
        (status = 200, description = "Matching bookings", body = Vec<BookingResponse>),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn list_own(
    State(service): State<Arc<BookingService>>,
    SharerUserId(user_id): SharerUserId,
    ValidatedQuery(filter): ValidatedQuery<StateParams>,
    ValidatedQuery(page): ValidatedQuery<PageParams>,
) -> ShareItResult<Json<Vec<BookingResponse>>> {
    let state = BookingState::from_query(filter.state.as_deref())?;
    let bookings = service.list_for_booker(user_id, state, page).await?;
    Ok(Json(bookings))
}

/// List bookings of the caller's items, newest start first
#[utoipa::path(
    get,
    path = "/owner",
    tag = TAG,
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Item owner"),
        StateParams,
        PageParams
    ),
    responses(
        (status = 200, description = "Matching bookings", body = Vec<BookingResponse>),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn list_owner(
    State(service): State<Arc<BookingService>>,
    SharerUserId(user_id): SharerUserId,
    ValidatedQuery(filter): ValidatedQuery<StateParams>,
    ValidatedQuery(page): ValidatedQuery<PageParams>,
) -> ShareItResult<Json<Vec<BookingResponse>>> {
    let state = BookingState::from_query(filter.state.as_deref())?;
    let bookings = service.list_for_owner(user_id, state, page).await?;
    Ok(Json(bookings))
}
