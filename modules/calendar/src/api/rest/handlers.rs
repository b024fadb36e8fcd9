use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query,
    },
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use tracing::{error, info};

use crate::api::rest::dto::{
    CreateEventReq, CreateUserReq, EventDto, EventFiltersQuery, UpdateEventReq, UpdateUserReq,
    UserDto,
};
use crate::api::rest::error::ApiError;
use crate::contract::context::RequestCtx;
use crate::domain::error::DomainError;
use crate::domain::events_service::EventsService;
use crate::domain::identity::require_login;
use crate::domain::users_service::UsersService;

fn bad_input(rejection: impl std::fmt::Display, uri: &Uri) -> ApiError {
    ApiError::bad_request(rejection.to_string(), uri.path())
}

fn failed(e: DomainError, uri: &Uri) -> ApiError {
    error!("Request to {} failed: {}", uri.path(), e);
    ApiError::from_domain(&e, uri.path())
}

/// List events, optionally filtered by day/month/year
#[utoipa::path(
    get,
    path = "/api/events",
    params(EventFiltersQuery),
    responses(
        (status = 200, description = "Events in the caller's timezone", body = [EventDto]),
        (status = 400, description = "Invalid filter", body = modkit::api::problem::Problem),
        (status = 401, description = "Missing or incorrect credentials", body = modkit::api::problem::Problem)
    ),
    security(("basic" = [])),
    tag = "events"
)]
pub async fn list_events(
    uri: Uri,
    Extension(svc): Extension<Arc<EventsService>>,
    Extension(ctx): Extension<RequestCtx>,
    query: Result<Query<EventFiltersQuery>, QueryRejection>,
) -> Result<Json<Vec<EventDto>>, ApiError> {
    let Query(query) = query.map_err(|e| bad_input(e, &uri))?;
    info!("Listing events with query: {:?}", query);

    let events = svc
        .get_events(&ctx, query.into())
        .await
        .map_err(|e| failed(e, &uri))?;
    Ok(Json(events.into_iter().map(EventDto::from).collect()))
}

/// Get a specific event by ID
#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(("id" = i64, Path, description = "Event id")),
    responses(
        (status = 200, body = EventDto),
        (status = 404, body = modkit::api::problem::Problem)
    ),
    security(("basic" = [])),
    tag = "events"
)]
pub async fn get_event(
    uri: Uri,
    Extension(svc): Extension<Arc<EventsService>>,
    Extension(ctx): Extension<RequestCtx>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<EventDto>, ApiError> {
    let Path(id) = id.map_err(|e| bad_input(e, &uri))?;
    info!("Getting event with id: {}", id);

    let event = svc.get_event(&ctx, id).await.map_err(|e| failed(e, &uri))?;
    Ok(Json(EventDto::from(event)))
}

/// Create a new event
#[utoipa::path(
    post,
    path = "/api/events",
    request_body = CreateEventReq,
    responses(
        (status = 201, body = EventDto),
        (status = 400, body = modkit::api::problem::Problem)
    ),
    security(("basic" = [])),
    tag = "events"
)]
pub async fn create_event(
    uri: Uri,
    Extension(svc): Extension<Arc<EventsService>>,
    Extension(ctx): Extension<RequestCtx>,
    body: Result<Json<CreateEventReq>, JsonRejection>,
) -> Result<(StatusCode, Json<EventDto>), ApiError> {
    let Json(req_body) = body.map_err(|e| bad_input(e, &uri))?;
    info!("Creating event: {:?}", req_body);

    let event = svc
        .add_event(&ctx, req_body.into())
        .await
        .map_err(|e| failed(e, &uri))?;
    Ok((StatusCode::CREATED, Json(EventDto::from(event))))
}

/// Update an existing event
#[utoipa::path(
    put,
    path = "/api/events/{id}",
    params(("id" = i64, Path, description = "Event id")),
    request_body = UpdateEventReq,
    responses(
        (status = 200, body = EventDto),
        (status = 404, body = modkit::api::problem::Problem)
    ),
    security(("basic" = [])),
    tag = "events"
)]
pub async fn update_event(
    uri: Uri,
    Extension(svc): Extension<Arc<EventsService>>,
    Extension(ctx): Extension<RequestCtx>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateEventReq>, JsonRejection>,
) -> Result<Json<EventDto>, ApiError> {
    let Path(id) = id.map_err(|e| bad_input(e, &uri))?;
    let Json(req_body) = body.map_err(|e| bad_input(e, &uri))?;
    info!("Updating event {} with: {:?}", id, req_body);

    let event = svc
        .update_event(&ctx, id, req_body.into())
        .await
        .map_err(|e| failed(e, &uri))?;
    Ok(Json(EventDto::from(event)))
}

/// Delete an event by ID
#[utoipa::path(
    delete,
    path = "/api/events/{id}",
    params(("id" = i64, Path, description = "Event id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, body = modkit::api::problem::Problem)
    ),
    security(("basic" = [])),
    tag = "events"
)]
pub async fn delete_event(
    uri: Uri,
    Extension(svc): Extension<Arc<EventsService>>,
    Extension(ctx): Extension<RequestCtx>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id.map_err(|e| bad_input(e, &uri))?;
    info!("Deleting event: {}", id);

    svc.delete_event(&ctx, id).await.map_err(|e| failed(e, &uri))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Register a new user. Does not require credentials.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserReq,
    responses(
        (status = 201, body = UserDto),
        (status = 400, body = modkit::api::problem::Problem)
    ),
    tag = "users"
)]
pub async fn create_user(
    uri: Uri,
    Extension(svc): Extension<Arc<UsersService>>,
    body: Result<Json<CreateUserReq>, JsonRejection>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    let Json(req_body) = body.map_err(|e| bad_input(e, &uri))?;
    info!("Creating user: {:?}", req_body);

    let user = svc
        .add_user(&RequestCtx::anonymous(), req_body.into())
        .await
        .map_err(|e| failed(e, &uri))?;
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// Update the caller's own account
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    request_body = UpdateUserReq,
    responses(
        (status = 200, body = UserDto),
        (status = 403, body = modkit::api::problem::Problem)
    ),
    security(("basic" = [])),
    tag = "users"
)]
pub async fn update_user(
    uri: Uri,
    Extension(svc): Extension<Arc<UsersService>>,
    Extension(ctx): Extension<RequestCtx>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateUserReq>, JsonRejection>,
) -> Result<Json<UserDto>, ApiError> {
    let Path(id) = id.map_err(|e| bad_input(e, &uri))?;
    let Json(req_body) = body.map_err(|e| bad_input(e, &uri))?;
    info!("Updating user {} with: {:?}", id, req_body);

    let user = svc
        .update_user(&ctx, id, req_body.into())
        .await
        .map_err(|e| failed(e, &uri))?;
    Ok(Json(UserDto::from(user)))
}

/// Delete the caller's own account
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, body = modkit::api::problem::Problem)
    ),
    security(("basic" = [])),
    tag = "users"
)]
pub async fn delete_user(
    uri: Uri,
    Extension(svc): Extension<Arc<UsersService>>,
    Extension(ctx): Extension<RequestCtx>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id.map_err(|e| bad_input(e, &uri))?;
    info!("Deleting user: {}", id);

    svc.delete_user(&ctx, id).await.map_err(|e| failed(e, &uri))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Check Basic credentials and return the matching account
#[utoipa::path(
    post,
    path = "/api/users/login",
    responses(
        (status = 200, body = UserDto),
        (status = 401, body = modkit::api::problem::Problem)
    ),
    security(("basic" = [])),
    tag = "users"
)]
pub async fn login(
    uri: Uri,
    Extension(svc): Extension<Arc<UsersService>>,
    Extension(ctx): Extension<RequestCtx>,
) -> Result<Json<UserDto>, ApiError> {
    let login = require_login(&ctx).map_err(|e| failed(e, &uri))?;
    info!("User logged in: {}", login);

    let user = svc
        .get_user_by_login(&ctx, login)
        .await
        .map_err(|e| failed(e, &uri))?;
    Ok(Json(UserDto::from(user)))
}
