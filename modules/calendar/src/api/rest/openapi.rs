use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::rest::{dto, handlers};

/// OpenAPI document for every calendar route.
#[derive(OpenApi)]
#[openapi(
    info(title = "Calendar API", description = "Calendar events and user accounts"),
    paths(
        handlers::list_events,
        handlers::get_event,
        handlers::create_event,
        handlers::update_event,
        handlers::delete_event,
        handlers::create_user,
        handlers::update_user,
        handlers::delete_user,
        handlers::login,
    ),
    components(schemas(
        dto::EventDto,
        dto::CreateEventReq,
        dto::UpdateEventReq,
        dto::UserDto,
        dto::CreateUserReq,
        dto::UpdateUserReq,
        modkit::api::problem::Problem,
        modkit::api::problem::ValidationError,
    )),
    modifiers(&BasicAuthScheme),
    tags(
        (name = "events", description = "Calendar events"),
        (name = "users", description = "User accounts")
    )
)]
pub struct ApiDoc;

struct BasicAuthScheme;

impl Modify for BasicAuthScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "basic",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
        );
    }
}
