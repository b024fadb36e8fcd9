//! HTTP Basic authentication: resolves the caller once per request and stores
//! the resulting [`RequestCtx`] in the request extensions.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

use crate::api::rest::error::ApiError;
use crate::domain::error::DomainError;
use crate::domain::users_service::UsersService;

/// Decoded `Authorization: Basic` credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub login: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}

/// Extract Basic credentials; `None` if the header is absent or malformed.
pub fn basic_credentials(headers: &HeaderMap) -> Option<BasicCredentials> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (login, password) = decoded.split_once(':')?;
    Some(BasicCredentials {
        login: login.to_string(),
        password: password.to_string(),
    })
}

/// Middleware guarding every route that needs an identity.
pub async fn require_basic_auth(
    State(users): State<Arc<UsersService>>,
    mut req: Request,
    next: Next,
) -> Response {
    let instance = req.uri().path().to_string();

    let Some(creds) = basic_credentials(req.headers()) else {
        debug!("Request without usable Basic credentials");
        return ApiError::from_domain(&DomainError::incorrect_credentials(), &instance)
            .into_response();
    };

    match users.authenticate(&creds.login, &creds.password).await {
        Ok(ctx) => {
            req.extensions_mut().insert(ctx);
            next.run(req).await
        }
        Err(e) => ApiError::from_domain(&e, &instance).into_response(),
    }
}
