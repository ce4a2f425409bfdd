use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, IdPath, SharerUserId, ValidatedJson, ValidatedQuery,
    errors::responses::{BadRequestResponse, InternalServerErrorResponse, NotFoundResponse},
    extract_ip_from_headers, extract_user_agent,
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use super::models::{CreateItem, Item, ItemResponse, SearchParams, UpdateItem};
use super::service::ItemService;
use crate::comments::{CommentResponse, CreateComment};
use crate::error::ShareItResult;
use crate::pagination::PageParams;

const TAG: &str = "items";

/// OpenAPI documentation for the item catalog
#[derive(OpenApi)]
#[openapi(
    paths(
        list_owner_items,
        create_item,
        search_items,
        get_item,
        update_item,
        delete_item,
        add_comment
    ),
    components(
        schemas(Item, ItemResponse, CreateItem, UpdateItem, CreateComment, CommentResponse),
        responses(NotFoundResponse, BadRequestResponse, InternalServerErrorResponse)
    ),
    tags(
        (name = TAG, description = "Item catalog, search and comments")
    )
)]
pub struct ApiDoc;

pub fn router(service: ItemService) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_owner_items).post(create_item))
        .route("/search", get(search_items))
        .route(
            "/{id}",
            get(get_item).patch(update_item).delete(delete_item),
        )
        .route("/{id}/comment", post(add_comment))
        .with_state(shared_service)
}

/// List the caller's items with booking context
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(("X-Sharer-User-Id" = i64, Header, description = "Owner"), PageParams),
    responses(
        (status = 200, description = "Owner's items ordered by id", body = Vec<ItemResponse>),
        (status = 400, response = BadRequestResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_owner_items(
    State(service): State<Arc<ItemService>>,
    SharerUserId(user_id): SharerUserId,
    ValidatedQuery(page): ValidatedQuery<PageParams>,
) -> ShareItResult<Json<Vec<ItemResponse>>> {
    let items = service.list_owner_items(user_id, page).await?;
    Ok(Json(items))
}

/// List an item for rent
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    params(("X-Sharer-User-Id" = i64, Header, description = "Owner")),
    request_body = CreateItem,
    responses(
        (status = 201, description = "Item created", body = ItemResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_item(
    State(service): State<Arc<ItemService>>,
    headers: HeaderMap,
    SharerUserId(user_id): SharerUserId,
    ValidatedJson(input): ValidatedJson<CreateItem>,
) -> ShareItResult<impl IntoResponse> {
    let item = service.create_item(user_id, input).await?;

    AuditEvent::new(
        Some(user_id),
        "item.create",
        Some(format!("item:{}", item.id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .with_details(json!({ "name": item.name, "request_id": item.request_id }))
    .log();

    Ok((StatusCode::CREATED, Json(item)))
}

/// Search available items by name or description
#[utoipa::path(
    get,
    path = "/search",
    tag = TAG,
    params(SearchParams, PageParams),
    responses(
        (status = 200, description = "Available items containing the text", body = Vec<ItemResponse>),
        (status = 400, response = BadRequestResponse)
    )
)]
async fn search_items(
    State(service): State<Arc<ItemService>>,
    ValidatedQuery(params): ValidatedQuery<SearchParams>,
    ValidatedQuery(page): ValidatedQuery<PageParams>,
) -> ShareItResult<Json<Vec<ItemResponse>>> {
    let items = service.search(&params.text, page).await?;
    Ok(Json(items))
}

/// Get an item; its owner also sees last and next bookings
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Caller")
    ),
    responses(
        (status = 200, description = "Item found", body = ItemResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_item(
    State(service): State<Arc<ItemService>>,
    SharerUserId(user_id): SharerUserId,
    IdPath(id): IdPath,
) -> ShareItResult<Json<ItemResponse>> {
    let item = service.get_item(user_id, id).await?;
    Ok(Json(item))
}

/// Partially update an item
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Owner")
    ),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated", body = ItemResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_item(
    State(service): State<Arc<ItemService>>,
    headers: HeaderMap,
    SharerUserId(user_id): SharerUserId,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateItem>,
) -> ShareItResult<Json<ItemResponse>> {
    let changed: Vec<&str> = [
        input.name.as_ref().map(|_| "name"),
        input.description.as_ref().map(|_| "description"),
        input.available.as_ref().map(|_| "available"),
    ]
    .into_iter()
    .flatten()
    .collect();

    let item = service.update_item(user_id, id, input).await?;

    AuditEvent::new(
        Some(user_id),
        "item.update",
        Some(format!("item:{}", id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .with_details(json!({ "fields": changed }))
    .log();

    Ok(Json(item))
}

/// Remove an item from the catalog
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Owner")
    ),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_item(
    State(service): State<Arc<ItemService>>,
    headers: HeaderMap,
    SharerUserId(user_id): SharerUserId,
    IdPath(id): IdPath,
) -> ShareItResult<StatusCode> {
    service.delete_item(user_id, id).await?;

    AuditEvent::new(
        Some(user_id),
        "item.delete",
        Some(format!("item:{}", id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    Ok(StatusCode::NO_CONTENT)
}

/// Comment on an item after renting it
#[utoipa::path(
    post,
    path = "/{id}/comment",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Item ID"),
        ("X-Sharer-User-Id" = i64, Header, description = "Author, a past booker of the item")
    ),
    request_body = CreateComment,
    responses(
        (status = 201, description = "Comment added", body = CommentResponse),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn add_comment(
    State(service): State<Arc<ItemService>>,
    headers: HeaderMap,
    SharerUserId(user_id): SharerUserId,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<CreateComment>,
) -> ShareItResult<impl IntoResponse> {
    let comment = service.add_comment(user_id, id, input).await?;

    AuditEvent::new(
        Some(user_id),
        "item.comment",
        Some(format!("item:{}", id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .with_details(json!({ "comment_id": comment.id }))
    .log();

    Ok((StatusCode::CREATED, Json(comment)))
}
