use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use utoipa::OpenApi;

use crate::api::rest::{auth, handlers, openapi::ApiDoc};
use crate::domain::events_service::EventsService;
use crate::domain::users_service::UsersService;

/// Mount the calendar API under `/api`.
///
/// Everything except registration and the OpenAPI document sits behind
/// HTTP Basic authentication.
pub fn register_routes(
    router: Router,
    events: Arc<EventsService>,
    users: Arc<UsersService>,
) -> Router {
    // GET/POST /api/events, GET/PUT/DELETE /api/events/{id},
    // POST /api/users/login, PUT/DELETE /api/users/{id}
    let protected = Router::new()
        .route(
            "/api/events",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route(
            "/api/events/{id}",
            get(handlers::get_event)
                .put(handlers::update_event)
                .delete(handlers::delete_event),
        )
        .route("/api/users/login", post(handlers::login))
        .route(
            "/api/users/{id}",
            put(handlers::update_user).delete(handlers::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(
            users.clone(),
            auth::require_basic_auth,
        ));

    // POST /api/users, GET /api/openapi.json
    let public = Router::new()
        .route("/api/users", post(handlers::create_user))
        .route("/api/openapi.json", get(|| async { Json(ApiDoc::openapi()) }));

    router
        .merge(protected)
        .merge(public)
        .layer(Extension(events))
        .layer(Extension(users))
}
