use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use modkit::api::problem::{Problem, ProblemResponse};

use crate::domain::error::DomainError;

/// Challenge sent with every 401 so clients know to retry with Basic credentials.
pub const BASIC_CHALLENGE: &str = r#"Basic realm="calendar", charset="UTF-8""#;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.calendar.local/{}", code))
        .with_code(code)
        .with_instance(instance);

    ProblemResponse(problem)
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::BadRequest { message } => from_parts(
            StatusCode::BAD_REQUEST,
            "CALENDAR_BAD_REQUEST",
            "Bad request",
            message.clone(),
            instance,
        ),
        DomainError::NotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "CALENDAR_NOT_FOUND",
            "Not found",
            e.to_string(),
            instance,
        ),
        DomainError::Unauthenticated => from_parts(
            StatusCode::UNAUTHORIZED,
            "CALENDAR_UNAUTHENTICATED",
            "Unauthenticated",
            e.to_string(),
            instance,
        ),
        DomainError::Unauthorized { message } => from_parts(
            StatusCode::FORBIDDEN,
            "CALENDAR_FORBIDDEN",
            "Forbidden",
            message.clone(),
            instance,
        ),
        DomainError::Unexpected { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Unexpected error");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "CALENDAR_INTERNAL",
                "Internal error",
                "An internal error occurred",
                instance,
            )
        }
    }
}

/// REST-layer error: a problem document, plus a Basic challenge header on 401.
#[derive(Debug)]
pub struct ApiError(pub ProblemResponse);

impl ApiError {
    pub fn from_domain(e: &DomainError, instance: &str) -> Self {
        Self(map_domain_error(e, instance))
    }

    pub fn bad_request(detail: impl Into<String>, instance: &str) -> Self {
        Self(from_parts(
            StatusCode::BAD_REQUEST,
            "CALENDAR_BAD_REQUEST",
            "Bad request",
            detail,
            instance,
        ))
    }

    pub fn status(&self) -> u16 {
        self.0 .0.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let unauthenticated = self.status() == StatusCode::UNAUTHORIZED.as_u16();
        let mut resp = self.0.into_response();
        if unauthenticated {
            resp.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(BASIC_CHALLENGE),
            );
        }
        resp
    }
}
