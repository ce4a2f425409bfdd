use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    AuditEvent, AuditOutcome, IdPath, ValidatedJson,
    errors::responses::{
        BadRequestResponse, ConflictResponse, InternalServerErrorResponse, NotFoundResponse,
    },
    extract_ip_from_headers, extract_user_agent,
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use super::models::{CreateUser, UpdateUser, User};
use super::service::UserService;
use crate::error::ShareItResult;

const TAG: &str = "users";

/// OpenAPI documentation for the user registry
#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, get_user, update_user, delete_user),
    components(
        schemas(User, CreateUser, UpdateUser),
        responses(
            NotFoundResponse,
            BadRequestResponse,
            ConflictResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "User registry. A duplicate e-mail is rejected with 409 Conflict")
    )
)]
pub struct ApiDoc;

pub fn router(service: UserService) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
        .with_state(shared_service)
}

/// List all users
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "All users ordered by id", body = Vec<User>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users(State(service): State<Arc<UserService>>) -> ShareItResult<Json<Vec<User>>> {
    let users = service.list_users().await?;
    Ok(Json(users))
}

/// Register a user
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, response = BadRequestResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user(
    State(service): State<Arc<UserService>>,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> ShareItResult<impl IntoResponse> {
    let user = service.create_user(input).await?;

    AuditEvent::new(
        Some(user.id),
        "user.create",
        Some(format!("user:{}", user.id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_user(
    State(service): State<Arc<UserService>>,
    IdPath(id): IdPath,
) -> ShareItResult<Json<User>> {
    let user = service.get_user(id).await?;
    Ok(Json(user))
}

/// Partially update a user
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse)
    )
)]
async fn update_user(
    State(service): State<Arc<UserService>>,
    headers: HeaderMap,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> ShareItResult<Json<User>> {
    let changed: Vec<&str> = [
        input.name.as_ref().map(|_| "name"),
        input.email.as_ref().map(|_| "email"),
    ]
    .into_iter()
    .flatten()
    .collect();

    let user = service.update_user(id, input).await?;

    AuditEvent::new(
        Some(id),
        "user.update",
        Some(format!("user:{}", id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .with_details(json!({ "fields": changed }))
    .log();

    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_user(
    State(service): State<Arc<UserService>>,
    headers: HeaderMap,
    IdPath(id): IdPath,
) -> ShareItResult<StatusCode> {
    service.delete_user(id).await?;

    AuditEvent::new(
        Some(id),
        "user.delete",
        Some(format!("user:{}", id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .log();

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_documents_conflict_on_duplicate_email() {
        let doc = ApiDoc::openapi();
        let tag = doc
            .tags
            .unwrap_or_default()
            .into_iter()
            .find(|t| t.name == TAG)
            .unwrap();
        assert!(tag.description.unwrap_or_default().contains("409 Conflict"));
    }
}
